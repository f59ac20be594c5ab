//! Token vocabulary, symbol table, and on-demand scanner.
//!
//! This crate knows nothing about grammar or code generation; it turns a
//! byte buffer into a lazy stream of [`token::Token`]s and maintains the
//! process-wide [`symbol::SymbolTable`] that both the scanner (for
//! identifiers) and the semantic analyser (for addresses) need to share.

pub mod error;
pub mod scanner;
pub mod symbol;
pub mod token;

pub use error::{LexicalError, LexicalErrorKind};
pub use scanner::Scanner;
pub use symbol::{Symbol, SymbolTable};
pub use token::{Token, TokenKind};
