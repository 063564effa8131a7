//! Parser errors and the combined front-end error

use p4_error::{Diagnostic, ErrorCode, IntoDiagnostic, Position, Span};
use p4_lexer::{Language, LexError};
use std::fmt;
use thiserror::Error;

/// Grammar-level failure. Parsing stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("expected {expected}, found end of input at {position}")]
    UnexpectedEof { expected: String, position: Position },

    #[error("malformed header: expected {expected}, found {found} at {position}")]
    MalformedHeader {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("operator `{operator}` cannot be chained with `{previous}` at {position}")]
    NonAssociative {
        operator: String,
        previous: String,
        position: Position,
        previous_position: Position,
    },

    #[error("keyword `{found}` is not {language} vocabulary, expected `{expected}` at {position}")]
    ForeignKeyword {
        found: String,
        expected: &'static str,
        language: Language,
        position: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::MalformedHeader { position, .. }
            | ParseError::NonAssociative { position, .. }
            | ParseError::ForeignKeyword { position, .. } => *position,
        }
    }
}

impl IntoDiagnostic for ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let span = Span::point(self.position());
        match self {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => Diagnostic::error(format!("unexpected {}", found))
                .with_code(ErrorCode::UNEXPECTED_TOKEN)
                .with_label(span, format!("expected {}", expected)),
            ParseError::UnexpectedEof { expected, .. } => {
                Diagnostic::error("unexpected end of input")
                    .with_code(ErrorCode::UNEXPECTED_EOF)
                    .with_label(span, format!("expected {}", expected))
            }
            ParseError::MalformedHeader {
                expected, found, ..
            } => Diagnostic::error("malformed program header")
                .with_code(ErrorCode::MALFORMED_HEADER)
                .with_label(span, format!("expected {}, found {}", expected, found))
                .with_note("every program starts with `Language EN|DK` and `Case camelCase|snake_case` on their own lines"),
            ParseError::NonAssociative {
                operator,
                previous,
                previous_position,
                ..
            } => Diagnostic::error("comparison operators cannot be chained")
                .with_code(ErrorCode::NON_ASSOCIATIVE)
                .with_label(span, format!("`{}` follows another comparison", operator))
                .with_secondary_label(Span::point(*previous_position), format!("`{}` is here", previous))
                .with_help("use parentheses or combine the comparisons with `&&`"),
            ParseError::ForeignKeyword {
                found,
                expected,
                language,
                ..
            } => Diagnostic::error(format!("`{}` is not part of the {} vocabulary", found, language))
                .with_code(ErrorCode::FOREIGN_KEYWORD)
                .with_label(span, format!("write `{}` instead", expected))
                .with_note(format!("the program header declares `Language {}`", language)),
        }
    }
}

/// Which front-end stage rejected the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lex => write!(f, "lex"),
            Stage::Parse => write!(f, "parse"),
        }
    }
}

/// Error returned by the source-to-AST pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontendError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl FrontendError {
    pub fn stage(&self) -> Stage {
        match self {
            FrontendError::Lex(_) => Stage::Lex,
            FrontendError::Parse(_) => Stage::Parse,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            FrontendError::Lex(err) => err.position(),
            FrontendError::Parse(err) => err.position(),
        }
    }
}

impl IntoDiagnostic for FrontendError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FrontendError::Lex(err) => err.to_diagnostic(),
            FrontendError::Parse(err) => err.to_diagnostic(),
        }
    }
}
