//! # Scanner
//!
//! Produces a lazy stream of tokens from a raw byte buffer, skipping
//! whitespace and comments, and recording lexical errors without aborting.
//! Grounded in `original_source/compiler/scanner.py`'s `Scanner` class,
//! restructured from its `os.mkdir`/file-writing side effects (left to the
//! binary, see `src/main.rs`) into a pure in-memory component that exposes
//! its tokens and errors as sequences.

use log::{debug, trace};

use crate::error::{LexicalError, LexicalErrorKind};
use crate::symbol::{Symbol, SharedSymbolTable};
use crate::token::{is_reserved_keyword, OPERATOR_CHARS, Token, TokenKind};

pub struct Scanner<'a> {
    input: &'a [u8],
    index: usize,
    row: usize,
    column: usize,
    token_column: usize,
    lexical_errors: Vec<LexicalError>,
    symbol_table: SharedSymbolTable,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8], symbol_table: SharedSymbolTable) -> Self {
        Scanner {
            input,
            index: 0,
            row: 1,
            column: 0,
            token_column: 0,
            lexical_errors: Vec::new(),
            symbol_table,
        }
    }

    pub fn lexical_errors(&self) -> &[LexicalError] {
        &self.lexical_errors
    }

    /// Returns the next token, or the single `EOF` token once the buffer is
    /// exhausted. Calling this again after `EOF` has been returned is
    /// unspecified.
    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(c) = self.get_next_char() else {
                return self.make_token(TokenKind::Eof, "$");
            };

            if let Some(token) = self.dispatch(c) {
                return token;
            }
            // dispatch() recorded a lexical error and consumed whatever it
            // needed to resynchronize; try again from the new position.
        }
    }

    fn dispatch(&mut self, c: u8) -> Option<Token> {
        if self.is_symbol_start(c) {
            Some(self.scan_symbol(c))
        } else if c.is_ascii_alphabetic() {
            self.scan_identifier_or_keyword(c)
        } else if c.is_ascii_digit() {
            self.scan_number(c)
        } else {
            self.scan_invalid(c);
            None
        }
    }

    // ---- character classification -----------------------------------

    fn is_symbol_start(&self, c: u8) -> bool {
        OPERATOR_CHARS.contains(&c)
    }

    fn is_whitespace(&self, c: u8) -> bool {
        c != b'\n' && (c as char).is_ascii_whitespace()
    }

    fn is_boundary(&self, c: Option<u8>) -> bool {
        match c {
            None => true,
            Some(b) => {
                self.is_whitespace(b)
                    || b == b'\n'
                    || self.is_symbol_start(b)
                    || b.is_ascii_digit()
                    || b.is_ascii_alphabetic()
                    || b == b'/'
            }
        }
    }

    // ---- low-level cursor ---------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.input.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.index + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.index += 1;
        self.column += 1;
        Some(c)
    }

    fn next_row(&mut self) {
        self.row += 1;
        self.column = 0;
    }

    /// Skips whitespace and comments, returning the first byte of the next
    /// real token, or `None` at end of input.
    fn get_next_char(&mut self) -> Option<u8> {
        loop {
            self.token_column = self.column;
            let c = self.advance()?;

            if c == b'\n' {
                self.next_row();
                continue;
            }
            if self.is_whitespace(c) {
                continue;
            }
            if c == b'/' && self.peek() == Some(b'/') {
                self.skip_line_comment();
                continue;
            }
            if c == b'/' && self.peek() == Some(b'*') {
                self.skip_block_comment();
                continue;
            }
            return Some(c);
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == b'\n' {
                return;
            }
            self.advance();
        }
    }

    /// Supports nesting: each nested `/*` increments a depth counter, each
    /// `*/` decrements it; the comment ends when depth returns to zero.
    fn skip_block_comment(&mut self) {
        let opening_row = self.row;
        self.advance(); // the opening '*'
        let mut depth = 0u32;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (None, _) => {
                    self.write_lexical_error(opening_row, "/*", LexicalErrorKind::UnclosedComment);
                    return;
                }
                (Some(b'/'), Some(b'*')) => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                (Some(b'*'), Some(b'/')) => {
                    self.advance();
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                (Some(b'\n'), _) => {
                    self.advance();
                    self.next_row();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ---- token scanners -------------------------------------------------

    fn scan_symbol(&mut self, c: u8) -> Token {
        if c == b'=' && self.peek() == Some(b'=') {
            self.advance();
            return self.make_token(TokenKind::Symbol, "==");
        }
        if c == b'*' && self.peek() == Some(b'/') {
            // Unmatched close comment at top level.
            self.advance();
            self.write_lexical_error(self.row, "*/", LexicalErrorKind::UnmatchedComment);
            return self.next_token_inline();
        }
        self.make_token(TokenKind::Symbol, (c as char).to_string())
    }

    /// Helper used only when `scan_symbol` needs to recover from an
    /// unmatched `*/` by producing the *next* real token instead of one for
    /// the offending text.
    fn next_token_inline(&mut self) -> Token {
        self.next_token()
    }

    fn scan_number(&mut self, first: u8) -> Option<Token> {
        let mut lexeme = String::new();
        lexeme.push(first as char);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c as char);
                self.advance();
            } else {
                break;
            }
        }
        if let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                lexeme.push(c as char);
                self.advance();
                self.write_lexical_error(self.row, lexeme, LexicalErrorKind::InvalidNumber);
                return None;
            }
        }
        Some(self.make_token(TokenKind::Num, lexeme))
    }

    fn scan_identifier_or_keyword(&mut self, first: u8) -> Option<Token> {
        let mut lexeme = String::new();
        lexeme.push(first as char);
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_alphanumeric() => {
                    lexeme.push(c as char);
                    self.advance();
                }
                next => {
                    if !self.is_boundary(next) {
                        let bad = next.unwrap();
                        lexeme.push(bad as char);
                        self.advance();
                        self.write_lexical_error(self.row, lexeme, LexicalErrorKind::InvalidInput);
                        return None;
                    }
                    break;
                }
            }
        }
        if is_reserved_keyword(&lexeme) {
            Some(self.make_token(TokenKind::Keyword, lexeme))
        } else {
            Some(self.make_token(TokenKind::Id, lexeme))
        }
    }

    fn scan_invalid(&mut self, first: u8) {
        let mut invalid = String::new();
        invalid.push(first as char);
        loop {
            let next = self.peek();
            if self.is_boundary(next) {
                break;
            }
            invalid.push(next.unwrap() as char);
            self.advance();
        }
        self.write_lexical_error(self.row, invalid, LexicalErrorKind::InvalidInput);
    }

    // ---- bookkeeping ----------------------------------------------------

    fn make_token(&mut self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        let lexeme = lexeme.into();
        if kind == TokenKind::Id {
            self.symbol_table.borrow_mut().insert(Symbol::new(lexeme.clone()));
        }
        trace!("token at row {}: ({}, {})", self.row, kind.name(), lexeme);
        Token::new(self.row, self.token_column, kind, lexeme)
    }

    fn write_lexical_error(&mut self, row: usize, text: impl Into<String>, kind: LexicalErrorKind) {
        let text = text.into();
        debug!("lexical error at row {row}: ({text}, {kind})");
        self.lexical_errors.push(LexicalError::new(row, text, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    fn scan_all(src: &str) -> (Vec<Token>, Vec<LexicalError>) {
        let table = SymbolTable::shared();
        let mut scanner = Scanner::new(src.as_bytes(), table);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, scanner.lexical_errors().to_vec())
    }

    #[test]
    fn scenario_1_token_shapes() {
        let src = "int a = 0;\na = 2 + 2;\n//b = a < cde;\nif a == 0;\n";
        let (tokens, errors) = scan_all(src);
        assert!(errors.is_empty());

        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![
                Keyword, Id, Symbol, Num, Symbol, Id, Symbol, Num, Symbol, Num, Symbol, Keyword,
                Id, Symbol, Num, Symbol, Eof,
            ]
        );

        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(
            lexemes,
            vec![
                "int", "a", "=", "0", ";", "a", "=", "2", "+", "2", ";", "if", "a", "==", "0", ";",
                "$",
            ]
        );

        let rows: Vec<usize> = tokens.iter().map(|t| t.row).collect();
        assert_eq!(
            rows,
            vec![1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 4, 4, 4, 4, 4, 4]
        );

        let columns: Vec<usize> = tokens[..tokens.len() - 1].iter().map(|t| t.column).collect();
        assert_eq!(columns, vec![0, 4, 6, 8, 9, 0, 2, 4, 6, 8, 9, 0, 3, 5, 8, 9]);
    }

    #[test]
    fn scenario_2_lexical_recovery() {
        let src = "if (b /* comment2 */ == 3d) {\na = 3;\ncd!e = 7;\n}\nelse */\n";
        let (tokens, errors) = scan_all(src);

        let lexemes: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(
            lexemes,
            vec![
                "if", "(", "b", "==", ")", "{", "a", "=", "3", ";", "e", "=", "7", ";", "}", "else",
            ]
        );

        assert!(errors
            .iter()
            .any(|e| e.kind == LexicalErrorKind::InvalidNumber && e.text == "3d"));
        assert!(errors
            .iter()
            .any(|e| e.kind == LexicalErrorKind::InvalidInput && e.text == "cd!"));
        assert!(errors
            .iter()
            .any(|e| e.kind == LexicalErrorKind::UnmatchedComment && e.text == "*/"));
    }

    #[test]
    fn nested_block_comments_close_at_matching_depth() {
        let src = "/* outer /* inner */ still outer */ int x;";
        let (tokens, errors) = scan_all(src);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].lexeme, "int");
    }

    #[test]
    fn unclosed_comment_reports_opening_row() {
        let src = "int a;\n/* never closed";
        let (_tokens, errors) = scan_all(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexicalErrorKind::UnclosedComment);
        assert_eq!(errors[0].row, 2);
    }

    #[test]
    fn identifiers_are_inserted_into_the_symbol_table() {
        let table = SymbolTable::shared();
        let mut scanner = Scanner::new(b"int a; int b;", table.clone());
        loop {
            if scanner.next_token().kind == TokenKind::Eof {
                break;
            }
        }
        assert!(table.borrow().lookup("a").is_some());
        assert!(table.borrow().lookup("b").is_some());
    }
}
