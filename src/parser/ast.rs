//! Abstract syntax tree for compiled templates
//!
//! A template is a flat sequence of [`Segment`]s: literal text runs and
//! `${...}` placeholders. Each placeholder holds one [`Expr`] tree that the
//! engine evaluates per render call.

/// Byte range in template source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text copied verbatim into the output
    Literal(String),
    /// A `${...}` placeholder evaluated per render call
    Placeholder(Spanned<Expr>),
}

/// Binary operators supported inside placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Numeric addition, string concatenation otherwise
    Add,
    Eq,
    Ne,
}

/// A placeholder expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// A declared template parameter, or one of the `helpers`/`include`
    /// bindings when used as a member/call base
    Ident(String),
    /// Property access: `data.title`
    Member {
        object: Box<Spanned<Expr>>,
        property: String,
    },
    /// Subscript access: `data.items[0]`
    Index {
        object: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    /// Invocation: `helpers.lower(name)` or `include("site-header", data)`
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    /// `cond ? a : b`
    Ternary {
        condition: Box<Spanned<Expr>>,
        then_branch: Box<Spanned<Expr>>,
        else_branch: Box<Spanned<Expr>>,
    },
}
