//! Syntax tree for unit bodies.

use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Stmt {
    pub kind: StmtKind,
    /// Line of the statement's first token.
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StmtKind {
    Let { name: String, value: Expr },
    Assign { target: Place, value: Expr },
    Return(Expr),
    Raise(Expr),
    Expr(Expr),
}

/// Left-hand side of an assignment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Place {
    Var(String),
    Slot { object: Expr, slot: String },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Nil,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    Record(Vec<(String, Expr)>),
    List(Vec<Expr>),
    Var(String),
    Slot {
        object: Box<Expr>,
        slot: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Add(Box<Expr>, Box<Expr>),
}
