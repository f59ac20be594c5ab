//! Grammar definitions, recursive-descent parser, parse tree, and
//! backpatching code generator for the three-address-code compiler
//! front-end. Depends on `tac_lexer` for tokens and the shared symbol
//! table; knows nothing about file I/O (see [`compile`] and `src/main.rs`).

pub mod compile;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod semantic;
pub mod tree;

pub use compile::{compile, CompileOutput};
pub use error::{SemanticError, SemanticErrorKind, SyntaxError};
pub use grammar::{ActionSymbol, NonTerminal};
pub use parser::Parser;
pub use semantic::{Generator, Opcode, Operand};
pub use tree::ParseTree;
