//! Syntax tree for Lox programs.
//!
//! Nodes borrow their tokens from the scanner's output (`&'a Token<'a>`) and
//! are immutable once built. Every expression carries an [`ExprId`] that is
//! unique for the whole process, which is what the resolver keys its
//! binding‑distance table on: two textually identical `Variable` nodes at
//! different positions resolve independently.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Stable identity of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

impl ExprId {
    /// Hand out a fresh id. Ids never repeat, even across separate parses,
    /// so a REPL session can keep one side‑table for every line it runs.
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<'a> {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes, borrowed from the source.
    Str(&'a str),

    Bool(bool),

    Nil,
}

impl fmt::Display for LiteralValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::Str(s) => write!(f, "{}", s),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}

/// An expression node: identity plus shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'a> {
    pub id: ExprId,
    pub kind: ExprKind<'a>,
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>) -> Self {
        Self {
            id: ExprId::fresh(),
            kind,
        }
    }

    pub fn literal(value: LiteralValue<'a>) -> Self {
        Self::new(ExprKind::Literal(value))
    }
}

/// One case per expression production.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<'a> {
    /// Assignment expression: `identifier "=" expression`
    Assign {
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Function call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// `object.property`
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    Literal(LiteralValue<'a>),

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// `super.method`
    Super {
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },

    /// The `this` keyword inside a method.
    This(&'a Token<'a>),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Variable access.
    Variable(&'a Token<'a>),
}

/// `fun name(params) { body }`, shared by function statements and class
/// methods.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub name: &'a Token<'a>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<&'a Token<'a>>,

    pub body: Vec<Stmt<'a>>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these, one per top‑level declaration.  `for` loops never appear here:
/// the parser lowers them to `Block`/`While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Braced scope containing zero or more declarations.
    Block(Vec<Stmt<'a>>),

    Class {
        name: &'a Token<'a>,
        superclass: Option<Expr<'a>>,
        methods: Vec<FunctionDecl<'a>>,
    },

    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    Function(FunctionDecl<'a>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    Print {
        /// The `print` keyword, used to locate output failures.
        keyword: &'a Token<'a>,
        value: Expr<'a>,
    },

    Return {
        /// The `return` keyword token (for error locations).
        keyword: &'a Token<'a>,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },
}
