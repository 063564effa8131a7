//! p4-parser - Parser for the P4 teaching language
//!
//! Converts a sequence of tokens into an AST (Abstract Syntax Tree), and
//! renders an AST back into source.
//!
//! # Example
//!
//! ```rust
//! use p4_lexer::tokenize;
//! use p4_parser::{parse, Language};
//!
//! let source = "Language DK\nCase camelCase\nfunktion heltal main() {\n    returner 0\n}\n";
//! let tokens = tokenize(source).unwrap();
//!
//! let program = parse(tokens).unwrap();
//! assert_eq!(program.language, Language::Dk);
//! println!("Functions: {}", program.functions.len());
//! ```

pub mod ast;
pub mod error;
mod expr;
pub mod options;
pub mod parser;
pub mod printer;

pub use ast::*;
pub use error::{FrontendError, ParseError, Stage};
pub use options::{KeywordPolicy, ParseOptions};
pub use parser::{parse, parse_with, Parser, MAX_NESTING};
pub use printer::{render, render_expr};

/// Lexes and parses source text with default options
pub fn parse_source(source: &str) -> Result<Program, FrontendError> {
    parse_source_with(source, ParseOptions::default())
}

/// Lexes and parses source text
pub fn parse_source_with(source: &str, options: ParseOptions) -> Result<Program, FrontendError> {
    let tokens = p4_lexer::tokenize(source)?;
    Ok(parse_with(tokens, options)?)
}
