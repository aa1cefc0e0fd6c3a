//! Pattern AST nodes

use super::Spanned;
use serde::{Deserialize, Serialize};

/// Pattern for case branches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pattern {
    /// `_`
    Wildcard,
    /// Integer, char, `true`/`false` literal
    Int(i64),
    /// String literal, compared bytewise
    Str(Vec<u8>),
    /// `Tag (p1, ..., pn)` or bare `Tag`
    Sexp {
        tag: String,
        args: Vec<Spanned<Pattern>>,
    },
    /// `[p1, ..., pn]`
    Array(Vec<Spanned<Pattern>>),
    /// `{p1, ..., pn}`
    List(Vec<Spanned<Pattern>>),
    /// `head : tail`
    Cons {
        head: Box<Spanned<Pattern>>,
        tail: Box<Spanned<Pattern>>,
    },
    /// `x` or `x@p`
    Named {
        name: Spanned<String>,
        pattern: Option<Box<Spanned<Pattern>>>,
    },
    /// `#val`, `#box`, ...
    Shape(Shape),
    /// `(p)`
    Parens(Box<Spanned<Pattern>>),
}

/// Runtime shape tested by `#shape` patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// Any heap value (not an integer)
    Box,
    /// An integer
    Val,
    Str,
    Array,
    Sexp,
    Fun,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Box => write!(f, "#box"),
            Shape::Val => write!(f, "#val"),
            Shape::Str => write!(f, "#str"),
            Shape::Array => write!(f, "#array"),
            Shape::Sexp => write!(f, "#sexp"),
            Shape::Fun => write!(f, "#fun"),
        }
    }
}
