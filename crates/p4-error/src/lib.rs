//! p4-error - Positions, spans and diagnostics for the P4 front end
//!
//! The lexer and parser report failures as structured error values. This
//! crate provides the location types those values carry and a rustc-style
//! renderer used to show them to a user.
//!
//! # Example
//!
//! ```rust
//! use p4_error::{Diagnostic, DiagnosticRenderer, ErrorCode, SourceFile};
//! use p4_error::span::{Position, Span};
//!
//! let file = SourceFile::new("example.p4", "Language XX\n");
//!
//! let span = Span::new(Position::new(1, 10, 9), Position::new(1, 12, 11));
//!
//! let diagnostic = Diagnostic::error("malformed header")
//!     .with_code(ErrorCode::MALFORMED_HEADER)
//!     .with_label(span, "expected `EN` or `DK`");
//!
//! let renderer = DiagnosticRenderer::new(&file).without_colors();
//! assert!(renderer.render(&diagnostic).contains("example.p4:1:10"));
//! ```

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticRenderer, ErrorCode, Label, LabelStyle, SourceFile};
pub use span::{Position, Span, Spanned};

/// Errors that can be presented to a user as a [`Diagnostic`]
pub trait IntoDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}
