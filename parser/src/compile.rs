//! # Compiler Façade
//!
//! Runs scanner → parser → generator over one source buffer and collects
//! every in-memory artifact the six output files (spec §6) are rendered
//! from, so `src/main.rs` stays pure glue: open a file, call [`compile`],
//! write the results out.

use tac_lexer::symbol::SymbolTable;
use tac_lexer::token::Token;
use tac_lexer::LexicalError;

use crate::error::SyntaxError;
use crate::parser::Parser;

pub struct CompileOutput {
    pub tokens: Vec<Token>,
    pub lexical_errors: Vec<LexicalError>,
    pub parse_tree: String,
    pub syntax_errors: Vec<SyntaxError>,
    pub semantic_errors_rendered: String,
    pub output_rendered: String,
}

impl CompileOutput {
    /// `tokens.txt`: one line per distinct source row, each
    /// `"<row>. (KIND, lexeme) (…)\n"`.
    pub fn render_tokens(&self) -> String {
        let mut out = String::new();
        let mut current_row = None;
        for token in &self.tokens {
            if token.kind == tac_lexer::token::TokenKind::Eof {
                continue;
            }
            if current_row != Some(token.row) {
                if current_row.is_some() {
                    out.push('\n');
                }
                out.push_str(&format!("{}.", token.row));
                current_row = Some(token.row);
            }
            out.push_str(&format!(" ({}, {})", token.kind.name(), token.lexeme));
        }
        if current_row.is_some() {
            out.push('\n');
        }
        out
    }

    pub fn render_lexical_errors(&self) -> String {
        if self.lexical_errors.is_empty() {
            "There is no lexical error.".to_string()
        } else {
            self.lexical_errors
                .iter()
                .map(|e| format!("{}. ({}, {})\n", e.row, e.text, e.kind))
                .collect()
        }
    }

    pub fn render_syntax_errors(&self) -> String {
        if self.syntax_errors.is_empty() {
            "There is no syntax error.".to_string()
        } else {
            self.syntax_errors.iter().map(|e| format!("{e}\n")).collect()
        }
    }
}

/// Compiles one source buffer end to end. Each call starts from a fresh
/// symbol table (spec §5's shared-resource policy: "a second concurrent
/// compilation in the same process must start from a fresh symbol table").
pub fn compile(source: &[u8]) -> CompileOutput {
    let symbol_table = SymbolTable::shared();
    let parser = Parser::parse(source, symbol_table);
    CompileOutput {
        tokens: parser.tokens().to_vec(),
        lexical_errors: parser.lexical_errors().to_vec(),
        parse_tree: parser.parse_tree(),
        syntax_errors: parser.syntax_errors().to_vec(),
        semantic_errors_rendered: parser.generator().render_semantic_errors(),
        output_rendered: parser.generator().render_output(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_program_yields_three_address_code_and_no_diagnostics() {
        let out = compile(b"void main(void){ int a; a = 1 + 2; output(a); }");
        assert_eq!(out.render_lexical_errors(), "There is no lexical error.");
        assert_eq!(out.render_syntax_errors(), "There is no syntax error.");
        assert_eq!(out.semantic_errors_rendered, "The input program is semantically correct.");
        assert!(out.output_rendered.contains("(PRINT,"));
    }

    #[test]
    fn tokens_are_grouped_by_source_row() {
        let out = compile(b"int a;\nint b;");
        let rendered = out.render_tokens();
        assert_eq!(
            rendered,
            "1. (KEYWORD, int) (ID, a) (SYMBOL, ;)\n2. (KEYWORD, int) (ID, b) (SYMBOL, ;)\n"
        );
    }
}
