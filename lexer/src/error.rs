//! Lexical error taxonomy (spec §4.C / §7).

/// Non-fatal: scanning always continues after one of these is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexicalErrorKind {
    #[error("Invalid input")]
    InvalidInput,
    #[error("Unclosed comment")]
    UnclosedComment,
    #[error("Unmatched */")]
    UnmatchedComment,
    #[error("Invalid number")]
    InvalidNumber,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{row}. ({text}, {kind})")]
pub struct LexicalError {
    pub row: usize,
    pub text: String,
    pub kind: LexicalErrorKind,
}

impl LexicalError {
    pub fn new(row: usize, text: impl Into<String>, kind: LexicalErrorKind) -> Self {
        LexicalError {
            row,
            text: text.into(),
            kind,
        }
    }
}
