//! AST - Abstract Syntax Tree for the P4 language
//!
//! The tree is built once per parse and never shared: every node owns its
//! children. Identifiers are kept as text plus span; no symbols are resolved.

use p4_error::{Span, Spanned};
pub use p4_lexer::{Language, TypeName};

/// Identifier casing convention declared in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CaseStyle {
    /// `Case camelCase`
    CamelCase,
    /// `Case snake_case`
    SnakeCase,
}

impl CaseStyle {
    /// The tag written in the program header
    pub fn tag(&self) -> &'static str {
        match self {
            CaseStyle::CamelCase => "camelCase",
            CaseStyle::SnakeCase => "snake_case",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "camelCase" => Some(CaseStyle::CamelCase),
            "snake_case" => Some(CaseStyle::SnakeCase),
            _ => None,
        }
    }
}

/// Complete program (source file)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Program {
    pub language: Language,
    pub case_style: CaseStyle,
    /// Never empty
    pub functions: Vec<FunctionDef>,
    pub span: Span,
}

impl Program {
    /// Finds the first function with the given name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name.name == name)
    }
}

/// A name as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Reference to a built-in type, in either spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeRef {
    pub name: TypeName,
    pub span: Span,
}

/// Contents of an array suffix: `[]`, `[10]` or `[size]`.
///
/// Bounds are recorded, never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ArrayBound {
    Unsized,
    Literal(i64),
    Named(Identifier),
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionDef {
    pub return_type: TypeRef,
    /// Array suffix on the return type, if any
    pub array: Option<ArrayBound>,
    pub name: Identifier,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

impl FunctionDef {
    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }
}

/// Function parameter: `integer values[]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Param {
    pub ty: TypeRef,
    pub name: Identifier,
    pub array: Option<ArrayBound>,
    pub span: Span,
}

impl Param {
    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }
}

/// `{ ... }`; may be empty
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Assignment target: a name plus zero or more index suffixes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Lvalue {
    pub base: Identifier,
    pub indices: Vec<Expr>,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Stmt {
    /// `xs[i] = expr`
    Assignment {
        target: Lvalue,
        value: Expr,
        span: Span,
    },

    /// `new integer xs[3] = expr`
    Declaration {
        ty: TypeRef,
        name: Identifier,
        dims: Vec<ArrayBound>,
        init: Option<Expr>,
        span: Span,
    },

    /// `if cond then { ... } else { ... }`
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    },

    /// `while cond do { ... }`
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },

    /// `return` or `return expr`
    Return { value: Option<Expr>, span: Span },

    /// `output expr`
    Output { value: Expr, span: Span },

    /// Postfix expression evaluated for its effect, e.g. a call
    Expr(Expr),
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    /// Binding strength, higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne => 3,
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 4,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 6,
        }
    }

    /// Equality and relational operators may not be chained
    pub fn is_non_associative(&self) -> bool {
        matches!(self.precedence(), 3 | 4)
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expr {
    IntLit(i64, Span),
    FloatLit(f64, Span),
    StringLit(String, Span),
    BoolLit(bool, Span),
    /// `[e1, e2, ...]`
    ArrayLit(Vec<Expr>, Span),
    Ident(Identifier),
    /// `input`
    Input(Span),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },

    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `callee(args)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },

    /// `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, span)
            | Expr::FloatLit(_, span)
            | Expr::StringLit(_, span)
            | Expr::BoolLit(_, span)
            | Expr::ArrayLit(_, span)
            | Expr::Input(span) => *span,
            Expr::Ident(ident) => ident.span,
            Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Assignment { span, .. }
            | Stmt::Declaration { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Output { span, .. } => *span,
            Stmt::Expr(expr) => expr.span(),
        }
    }
}
