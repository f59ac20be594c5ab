//! # Symbol Table
//!
//! A process-wide name → symbol mapping with two address allocators: one
//! for the data area (starting at 500) and one for temporaries (starting
//! at 1000). Grounded in `original_source/compiler/symbol.py`: the
//! `Singleton`-via-metaclass trick there becomes an explicit owned
//! collaborator here (`Rc<RefCell<SymbolTable>>`), shared between the
//! scanner (which inserts identifiers as they're tokenized) and the code
//! generator (which looks addresses back up) — per spec §9's design note
//! that the table should be "passed explicitly as an owned collaborator
//! rather than as ambient state."

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Default size, in address units, of a scalar `int`/`void` variable and of
/// a temporary. Arrays widen their own recorded size to `count * INT_SIZE`
/// (see [`SymbolTable::resize_as_array`]).
pub const INT_SIZE: u32 = 4;

pub const DATA_BASE: u32 = 500;
pub const TEMP_BASE: u32 = 1000;

pub type SharedSymbolTable = Rc<RefCell<SymbolTable>>;

/// The declared type of a symbol. Only `int`/`void` exist in the source
/// language (spec's Non-goals explicitly exclude a richer type system).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclType {
    Int,
    Void,
}

/// A mutable record ⟨name, kind, scope, size, address, params⟩ (spec §3).
/// `scope_level` and `arguments` are carried for completeness with the
/// Python original's `Symbol` record but are never populated by the
/// current (scope-free, parameter-count-free) semantic analysis — see
/// SPEC_FULL.md's "Restored from original_source" section.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub decl_type: Option<DeclType>,
    pub scope_level: Option<u32>,
    pub size: u32,
    pub address: Option<u32>,
    pub arguments: Option<Vec<Symbol>>,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            decl_type: None,
            scope_level: None,
            size: INT_SIZE,
            address: None,
            arguments: None,
        }
    }
}

#[derive(Debug)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    var_count: u32,
    base_addr: u32,
    temp_base_addr: u32,
    temp_var_count: u32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: HashMap::new(),
            var_count: 0,
            base_addr: DATA_BASE,
            temp_base_addr: TEMP_BASE,
            temp_var_count: 0,
        }
    }

    pub fn shared() -> SharedSymbolTable {
        Rc::new(RefCell::new(SymbolTable::new()))
    }

    /// Resets all counters and the mapping, as if constructed fresh.
    pub fn clear(&mut self) {
        *self = SymbolTable::new();
    }

    /// Inserts `symbol` if no symbol of that name exists yet, allocating a
    /// fresh data address for it (`base + count * size`); otherwise leaves
    /// the existing record untouched and returns its address. Returns the
    /// (possibly pre-existing) address either way.
    pub fn insert(&mut self, mut symbol: Symbol) -> u32 {
        if let Some(existing) = self.symbols.get(&symbol.name) {
            return existing
                .address
                .expect("every stored symbol has an allocated address");
        }
        let address = self.allocate(symbol.size);
        symbol.address = Some(address);
        self.symbols.insert(symbol.name.clone(), symbol);
        address
    }

    /// Widens an already-declared scalar symbol to the footprint of an
    /// array of `element_count` ints (spec §9's `PROCESS_ARRAY` open
    /// question: "reserve `size x INT_SIZE` consecutive addresses"). The
    /// symbol was inserted at its default scalar size when the scanner
    /// first tokenized its name as an `ID`; its address was already fixed
    /// at that point (the address formula in `allocate` depends only on
    /// insertion order, not on any symbol's declared size), so this only
    /// corrects the recorded size, not the address.
    ///
    /// Addressed by data address rather than by name: by the time
    /// `PROCESS_ARRAY` fires, the generator only has the declaring
    /// symbol's address on the semantic stack (pushed earlier by
    /// `PROCESS_ID`), mirroring `original_source/compiler/symbol.py`'s
    /// `lookup_with_address` reverse lookup.
    pub fn resize_as_array(&mut self, address: u32, element_count: u32) {
        if let Some(symbol) = self.find_by_address_mut(address) {
            symbol.size = element_count * INT_SIZE;
        }
    }

    fn find_by_address_mut(&mut self, address: u32) -> Option<&mut Symbol> {
        self.symbols.values_mut().find(|s| s.address == Some(address))
    }

    fn allocate(&mut self, size: u32) -> u32 {
        let address = self.base_addr + self.var_count * size;
        self.var_count += 1;
        address
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Returns the address of an already-known name. Calling this on a
    /// name the scanner never inserted is a logic error in the caller: the
    /// scanner inserts every `ID` lexeme as it tokenizes it, so by the time
    /// the parser fires `PROCESS_ID` the symbol is always present.
    pub fn find_address(&self, name: &str) -> u32 {
        self.lookup(name)
            .and_then(|s| s.address)
            .unwrap_or_else(|| panic!("symbol `{name}` was never inserted before lookup"))
    }

    pub fn get_temporary_address(&mut self) -> u32 {
        let address = self.temp_base_addr + self.temp_var_count * INT_SIZE;
        self.temp_var_count += 1;
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_allocates_base_address() {
        let mut table = SymbolTable::new();
        assert_eq!(table.insert(Symbol::new("a")), 500);
        assert_eq!(table.insert(Symbol::new("b")), 504);
    }

    #[test]
    fn repeated_insert_returns_existing_address() {
        let mut table = SymbolTable::new();
        let first = table.insert(Symbol::new("a"));
        let second = table.insert(Symbol::new("a"));
        assert_eq!(first, second);
        assert_eq!(table.symbols.len(), 1);
    }

    #[test]
    fn temporaries_allocate_above_the_data_region() {
        let mut table = SymbolTable::new();
        assert_eq!(table.get_temporary_address(), 1000);
        assert_eq!(table.get_temporary_address(), 1004);
    }

    #[test]
    fn array_resize_corrects_size_but_not_address() {
        let mut table = SymbolTable::new();
        table.insert(Symbol::new("a"));
        let arr_addr = table.insert(Symbol::new("arr"));
        table.resize_as_array(arr_addr, 10);
        assert_eq!(arr_addr, 504);
        assert_eq!(table.lookup("arr").unwrap().size, 40);
        // Address allocation is insertion-order-based, not a running byte
        // offset, so a later symbol is unaffected by the array's true size.
        let next = table.insert(Symbol::new("b"));
        assert_eq!(next, 508);
    }

    #[test]
    fn clear_resets_counters_and_contents() {
        let mut table = SymbolTable::new();
        table.insert(Symbol::new("a"));
        table.get_temporary_address();
        table.clear();
        assert_eq!(table.insert(Symbol::new("a")), 500);
        assert_eq!(table.get_temporary_address(), 1000);
    }
}
