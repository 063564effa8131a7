//! p4-lexer - Lexer/Tokenizer for the P4 teaching language
//!
//! This crate converts P4 source text into a sequence of tokens.
//!
//! # Features
//!
//! - English and Danish keyword spellings, both always reserved
//! - Significant newlines (statement separators)
//! - `#` comments; a comment-only line produces no tokens at all
//! - Literals: integers, decimals, strings, booleans
//!
//! # Example
//!
//! ```rust
//! use p4_lexer::{tokenize, Keyword, TokenKind};
//!
//! let tokens = tokenize("mens x < 10 gør {\n}\n").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::While));
//! assert_eq!(tokens[0].text, "mens");
//! ```

pub mod error;
pub mod lexer;
pub mod token;

pub use error::LexError;
pub use lexer::{tokenize, Lexer};
pub use token::{Keyword, Language, Token, TokenKind, TypeName};
