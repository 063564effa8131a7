//! Lexer errors

use p4_error::{Diagnostic, ErrorCode, IntoDiagnostic, Position, Span};
use thiserror::Error;

/// Tokenization failure. Lexing stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid character '{ch}' at {position}")]
    InvalidCharacter { ch: char, position: Position },

    #[error("malformed number `{text}` at {position}")]
    MalformedNumber { text: String, position: Position },
}

impl LexError {
    /// Where the offending lexeme starts
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString { position }
            | LexError::InvalidCharacter { position, .. }
            | LexError::MalformedNumber { position, .. } => *position,
        }
    }

    fn span(&self) -> Span {
        let start = self.position();
        let (columns, bytes) = match self {
            LexError::UnterminatedString { .. } => (1, 1),
            LexError::InvalidCharacter { ch, .. } => (1, ch.len_utf8()),
            LexError::MalformedNumber { text, .. } => (text.chars().count() as u32, text.len()),
        };
        let end = Position::new(start.line, start.column + columns, start.offset + bytes);
        Span::new(start, end)
    }
}

impl IntoDiagnostic for LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LexError::UnterminatedString { .. } => Diagnostic::error("unterminated string")
                .with_code(ErrorCode::UNTERMINATED_STRING)
                .with_label(self.span(), "string starts here but is not closed on this line")
                .with_help("add a closing `\"`"),
            LexError::InvalidCharacter { ch, .. } => {
                let diagnostic = Diagnostic::error(format!("invalid character '{}'", ch))
                    .with_code(ErrorCode::INVALID_CHARACTER)
                    .with_label(self.span(), "not valid here");
                if ch.is_uppercase() {
                    diagnostic.with_help("identifiers must start with a lowercase letter")
                } else {
                    diagnostic
                }
            }
            LexError::MalformedNumber { text, .. } => {
                Diagnostic::error(format!("malformed number `{}`", text))
                    .with_code(ErrorCode::MALFORMED_NUMBER)
                    .with_label(self.span(), "not a valid integer or decimal literal")
            }
        }
    }
}
