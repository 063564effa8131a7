//! Diagnostics for lexer and parser failures
//!
//! Errors from the front end are turned into a [`Diagnostic`] (code, message,
//! labelled spans, notes) and printed against the offending [`SourceFile`]
//! in a rustc-like layout.

use crate::span::Span;
use std::fmt;

/// How a label is drawn under its span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// `^^^`, the failing construct
    Primary,
    /// `---`, related context such as an earlier operator
    Secondary,
}

/// Message attached to a span of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, message, LabelStyle::Primary)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, message, LabelStyle::Secondary)
    }

    fn new(span: Span, message: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            span,
            message: message.into(),
            style,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.style == LabelStyle::Primary
    }
}

/// Stable identifier of an error kind, shown as `EL001`, `EP004`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    /// `L` for lexer errors, `P` for parser errors
    pub category: char,
    pub number: u16,
}

impl ErrorCode {
    pub const fn new(category: char, number: u16) -> Self {
        Self { category, number }
    }

    const fn lexer(number: u16) -> Self {
        Self::new('L', number)
    }

    const fn parser(number: u16) -> Self {
        Self::new('P', number)
    }

    pub const INVALID_CHARACTER: Self = Self::lexer(1);
    pub const UNTERMINATED_STRING: Self = Self::lexer(2);
    pub const MALFORMED_NUMBER: Self = Self::lexer(3);

    pub const UNEXPECTED_TOKEN: Self = Self::parser(1);
    pub const UNEXPECTED_EOF: Self = Self::parser(2);
    pub const MALFORMED_HEADER: Self = Self::parser(3);
    pub const NON_ASSOCIATIVE: Self = Self::parser(4);
    pub const FOREIGN_KEYWORD: Self = Self::parser(5);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}{:03}", self.category, self.number)
    }
}

/// A user-facing error report. Built with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    /// Points at the failing construct
    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labelled(Label::primary(span, message))
    }

    /// Points at related context
    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labelled(Label::secondary(span, message))
    }

    fn labelled(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

/// One P4 source text, indexed by line
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Byte offset where each line begins
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Text of a 1-based line, without `\n` or `\r\n`
    pub fn get_line(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let rest = &self.source[*self.line_starts.get(index)?..];
        let text = rest.split('\n').next().unwrap_or(rest);
        Some(text.strip_suffix('\r').unwrap_or(text))
    }
}

/// ANSI escapes used by the renderer; all empty when colors are off
struct Palette {
    error: &'static str,
    accent: &'static str,
    help: &'static str,
    strong: &'static str,
    reset: &'static str,
}

impl Palette {
    const ANSI: Palette = Palette {
        error: "\x1b[1;31m",
        accent: "\x1b[1;34m",
        help: "\x1b[1;32m",
        strong: "\x1b[1m",
        reset: "\x1b[0m",
    };

    const PLAIN: Palette = Palette {
        error: "",
        accent: "",
        help: "",
        strong: "",
        reset: "",
    };
}

/// Formats diagnostics against one source file
pub struct DiagnosticRenderer<'a> {
    file: &'a SourceFile,
    palette: &'static Palette,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Self {
            file,
            palette: &Palette::ANSI,
        }
    }

    pub fn without_colors(self) -> Self {
        Self {
            palette: &Palette::PLAIN,
            ..self
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = self.heading(diagnostic);

        for label in &diagnostic.labels {
            self.write_label(label, &mut out);
        }

        let p = self.palette;
        for note in &diagnostic.notes {
            out.push_str(&format!("  = {}note{}: {}\n", p.strong, p.reset, note));
        }
        for help in &diagnostic.help {
            out.push_str(&format!("  = {}help{}: {}\n", p.help, p.reset, help));
        }

        out
    }

    /// `error[EP001]: message`
    fn heading(&self, diagnostic: &Diagnostic) -> String {
        let p = self.palette;
        let code = diagnostic
            .code
            .map(|code| format!("[{}]", code))
            .unwrap_or_default();

        format!(
            "{}error{}{}{}: {}{}\n",
            p.error, code, p.reset, p.strong, diagnostic.message, p.reset
        )
    }

    /// Location line, then the source line with the span underlined
    fn write_label(&self, label: &Label, out: &mut String) {
        let p = self.palette;
        let start = label.span.start;

        out.push_str(&format!(
            " {}-->{} {}:{}:{}\n",
            p.accent, p.reset, self.file.name, start.line, start.column
        ));

        let Some(text) = self.file.get_line(start.line) else {
            return;
        };

        let number = start.line.to_string();
        let gutter = " ".repeat(number.len());
        let skipped = (start.column as usize).saturating_sub(1);
        // Tabs are kept so the marker lines up however they are displayed
        let indent: String = text
            .chars()
            .take(skipped)
            .map(|ch| if ch == '\t' { '\t' } else { ' ' })
            .chain(std::iter::repeat(' '))
            .take(skipped)
            .collect();

        // Spans running past the line are underlined to its end
        let width = if label.span.end.line == start.line {
            label.span.end.column.saturating_sub(start.column) as usize
        } else {
            text.chars().count().saturating_sub(skipped)
        };
        let (marker, color) = if label.is_primary() {
            ('^', p.error)
        } else {
            ('-', p.accent)
        };
        let underline: String = std::iter::repeat(marker).take(width.max(1)).collect();

        out.push_str(&format!(" {} {}|{}\n", gutter, p.accent, p.reset));
        out.push_str(&format!(" {}{}{} | {}\n", p.accent, number, p.reset, text));
        out.push_str(&format!(
            " {} {}|{} {}{}{} {}{}\n",
            gutter, p.accent, p.reset, indent, color, underline, label.message, p.reset
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    #[test]
    fn test_diagnostic_rendering() {
        let file = SourceFile::new(
            "test.p4",
            "Language EN\nCase camelCase\nfunction integer main() {\n}\n",
        );

        let span = Span::new(Position::new(3, 10, 36), Position::new(3, 17, 43));

        let diagnostic = Diagnostic::error("unexpected token")
            .with_code(ErrorCode::UNEXPECTED_TOKEN)
            .with_label(span, "expected identifier")
            .with_help("function names must start with a lowercase letter");

        let output = DiagnosticRenderer::new(&file).without_colors().render(&diagnostic);

        assert!(output.starts_with("error[EP001]: unexpected token"));
        assert!(output.contains("test.p4:3:10"));
        assert!(output.contains("function integer main() {"));
        assert!(output.contains("^^^^^^^ expected identifier"));
        assert!(output.contains("help: function names must start"));
    }

    #[test]
    fn test_secondary_label_uses_dashes() {
        let file = SourceFile::new("cmp.p4", "x = a == b == c\n");
        let first = Span::new(Position::new(1, 7, 6), Position::new(1, 9, 8));
        let second = Span::new(Position::new(1, 12, 11), Position::new(1, 14, 13));

        let diagnostic = Diagnostic::error("comparison operators cannot be chained")
            .with_code(ErrorCode::NON_ASSOCIATIVE)
            .with_label(second, "second comparison")
            .with_secondary_label(first, "first comparison");

        let output = DiagnosticRenderer::new(&file).without_colors().render(&diagnostic);

        assert!(output.contains("^^ second comparison"));
        assert!(output.contains("-- first comparison"));
        assert!(diagnostic.labels[0].is_primary());
        assert!(!diagnostic.labels[1].is_primary());
    }

    #[test]
    fn test_get_line_strips_carriage_return() {
        let file = SourceFile::new("crlf.p4", "Language DK\r\nCase snake_case\r\n");
        assert_eq!(file.get_line(1), Some("Language DK"));
        assert_eq!(file.get_line(2), Some("Case snake_case"));
        assert_eq!(file.get_line(9), None);
        assert_eq!(file.get_line(3), Some(""));
    }

    #[test]
    fn test_underline_follows_tab_indentation() {
        let file = SourceFile::new("tabs.p4", "\t\toutput @\n");
        let span = Span::new(Position::new(1, 10, 9), Position::new(1, 11, 10));
        let diagnostic = Diagnostic::error("invalid character").with_label(span, "here");

        let output = DiagnosticRenderer::new(&file).without_colors().render(&diagnostic);

        assert!(output.contains(" | \t\toutput @\n"));
        assert!(output.contains(" | \t\t       ^ here\n"), "{output}");
    }
}
