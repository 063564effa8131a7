//! Tokens for the P4 language
//!
//! Defines all token types that the lexer can produce. Keywords carry their
//! meaning, not their spelling: `while` and `mens` both lex to
//! [`Keyword::While`], whatever language the program header declares.

use p4_error::span::{Position, Span};
use std::fmt;

/// The two vocabularies a P4 program may be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Language {
    /// `Language EN`
    En,
    /// `Language DK`
    Dk,
}

impl Language {
    /// The tag written in the program header
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Dk => "DK",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Statement and expression keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Function,
    New,
    If,
    Then,
    Else,
    While,
    Do,
    Return,
    Output,
    Input,
}

impl Keyword {
    #[cfg(test)]
    pub(crate) const ALL: [Keyword; 10] = [
        Keyword::Function,
        Keyword::New,
        Keyword::If,
        Keyword::Then,
        Keyword::Else,
        Keyword::While,
        Keyword::Do,
        Keyword::Return,
        Keyword::Output,
        Keyword::Input,
    ];

    /// Spelling of the keyword in the given vocabulary
    pub fn spelling(&self, language: Language) -> &'static str {
        match (self, language) {
            (Keyword::Function, Language::En) => "function",
            (Keyword::Function, Language::Dk) => "funktion",
            (Keyword::New, Language::En) => "new",
            (Keyword::New, Language::Dk) => "ny",
            (Keyword::If, Language::En) => "if",
            (Keyword::If, Language::Dk) => "hvis",
            (Keyword::Then, Language::En) => "then",
            (Keyword::Then, Language::Dk) => "så",
            (Keyword::Else, Language::En) => "else",
            (Keyword::Else, Language::Dk) => "ellers",
            (Keyword::While, Language::En) => "while",
            (Keyword::While, Language::Dk) => "mens",
            (Keyword::Do, Language::En) => "do",
            (Keyword::Do, Language::Dk) => "gør",
            (Keyword::Return, Language::En) => "return",
            (Keyword::Return, Language::Dk) => "returner",
            (Keyword::Output, Language::En) => "output",
            (Keyword::Output, Language::Dk) => "udskriv",
            (Keyword::Input, Language::En) => "input",
            (Keyword::Input, Language::Dk) => "indskriv",
        }
    }
}

/// Built-in type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TypeName {
    Boolean,
    Integer,
    Decimal,
    Str,
    NoType,
}

impl TypeName {
    #[cfg(test)]
    pub(crate) const ALL: [TypeName; 5] = [
        TypeName::Boolean,
        TypeName::Integer,
        TypeName::Decimal,
        TypeName::Str,
        TypeName::NoType,
    ];

    /// Spelling of the type in the given vocabulary
    pub fn spelling(&self, language: Language) -> &'static str {
        match (self, language) {
            (TypeName::Boolean, _) => "boolean",
            (TypeName::Integer, Language::En) => "integer",
            (TypeName::Integer, Language::Dk) => "heltal",
            (TypeName::Decimal, Language::En) => "decimal",
            (TypeName::Decimal, Language::Dk) => "kommatal",
            (TypeName::Str, Language::En) => "string",
            (TypeName::Str, Language::Dk) => "tekst",
            (TypeName::NoType, Language::En) => "noType",
            (TypeName::NoType, Language::Dk) => "ingenType",
        }
    }
}

/// All token types for the P4 language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // =========================================
    // Header words
    // =========================================
    /// `Language`
    LanguageHeader,
    /// `Case`
    CaseHeader,
    /// `EN` or `DK`
    LanguageTag(Language),

    // =========================================
    // Keywords
    // =========================================
    /// Any statement/expression keyword, in either spelling
    Keyword(Keyword),
    /// Built-in type name, in either spelling
    Type(TypeName),

    // =========================================
    // Literals and names
    // =========================================
    /// Integer literal: `42`
    IntLit(i64),
    /// Float literal: `3.14`
    FloatLit(f64),
    /// String literal with escapes resolved: `"hello\n"`
    StringLit(String),
    /// `true` / `false`
    BoolLit(bool),
    /// Identifier; the name is the token text
    Ident,

    // =========================================
    // Operators
    // =========================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Bang,
    /// `=`
    Eq,

    // =========================================
    // Punctuation
    // =========================================
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    /// Statement separator
    Newline,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Converts a lowercase-initial word to a reserved token, if it is one.
    ///
    /// Both vocabularies are always reserved, independent of the program
    /// header.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "function" | "funktion" => TokenKind::Keyword(Keyword::Function),
            "new" | "ny" => TokenKind::Keyword(Keyword::New),
            "if" | "hvis" => TokenKind::Keyword(Keyword::If),
            "then" | "så" => TokenKind::Keyword(Keyword::Then),
            "else" | "ellers" => TokenKind::Keyword(Keyword::Else),
            "while" | "mens" => TokenKind::Keyword(Keyword::While),
            "do" | "gør" => TokenKind::Keyword(Keyword::Do),
            "return" | "returner" => TokenKind::Keyword(Keyword::Return),
            "output" | "udskriv" => TokenKind::Keyword(Keyword::Output),
            "input" | "indskriv" => TokenKind::Keyword(Keyword::Input),

            "boolean" => TokenKind::Type(TypeName::Boolean),
            "integer" | "heltal" => TokenKind::Type(TypeName::Integer),
            "decimal" | "kommatal" => TokenKind::Type(TypeName::Decimal),
            "string" | "tekst" => TokenKind::Type(TypeName::Str),
            "noType" | "ingenType" => TokenKind::Type(TypeName::NoType),

            "true" => TokenKind::BoolLit(true),
            "false" => TokenKind::BoolLit(false),

            _ => return None,
        };
        Some(kind)
    }

    /// Converts an uppercase-initial word to a header token, if it is one
    pub fn header_word_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "Language" => Some(TokenKind::LanguageHeader),
            "Case" => Some(TokenKind::CaseHeader),
            "EN" => Some(TokenKind::LanguageTag(Language::En)),
            "DK" => Some(TokenKind::LanguageTag(Language::Dk)),
            _ => None,
        }
    }

    /// Source text of an operator or punctuation token
    pub fn symbol(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return f.write_str(symbol);
        }

        match self {
            TokenKind::LanguageHeader => f.write_str("Language"),
            TokenKind::CaseHeader => f.write_str("Case"),
            TokenKind::LanguageTag(lang) => write!(f, "{}", lang),
            TokenKind::Keyword(kw) => f.write_str(kw.spelling(Language::En)),
            TokenKind::Type(ty) => f.write_str(ty.spelling(Language::En)),
            TokenKind::IntLit(n) => write!(f, "{}", n),
            TokenKind::FloatLit(n) => write!(f, "{}", n),
            TokenKind::StringLit(s) => write!(f, "\"{}\"", s.escape_default()),
            TokenKind::BoolLit(b) => write!(f, "{}", b),
            TokenKind::Ident => f.write_str("identifier"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of input"),
            _ => Ok(()),
        }
    }
}

/// A token with its lexeme and location in the source code
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    /// Token type
    pub kind: TokenKind,
    /// The exact source text of the token
    pub text: &'src str,
    /// Location in source code
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// Checks if the token is of a specific type, ignoring literal payloads
    pub fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(kind)
    }

    /// Checks if it is end of input
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn position(&self) -> Position {
        self.span.start
    }

    /// 1-based line of the first character
    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    /// 1-based column of the first character
    pub fn column(&self) -> u32 {
        self.span.start.column
    }

    /// Human-readable description used in error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline | TokenKind::Eof => self.kind.to_string(),
            TokenKind::Ident => format!("identifier `{}`", self.text),
            _ => format!("`{}`", self.text),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.describe(), self.span.start)
    }
}
