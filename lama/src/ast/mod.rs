//! Abstract Syntax Tree definitions

mod expr;
mod pattern;
mod span;

pub use expr::*;
pub use pattern::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// A program is a single top-level scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub body: Block,
}

/// Lexical block: local definitions followed by an optional trailing expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub defs: Vec<Spanned<Definition>>,
    pub expr: Option<Box<Spanned<Expr>>>,
    pub span: Span,
}

impl Block {
    /// Block consisting of a single expression
    pub fn expr(expr: Spanned<Expr>) -> Self {
        let span = expr.span;
        Block {
            defs: Vec::new(),
            expr: Some(Box::new(expr)),
            span,
        }
    }
}

/// Local definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Definition {
    /// var x = e, y;
    Var(Vec<VarItem>),
    /// fun f (params) { body }
    Fun(FunDef),
}

/// One name introduced by a `var` definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarItem {
    pub name: Spanned<String>,
    pub init: Option<Spanned<Expr>>,
}

/// Named function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunDef {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Block,
}
