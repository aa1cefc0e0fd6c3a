//! Runtime errors for the interpreter

use crate::ast::Span;
use std::fmt;

/// Runtime error during evaluation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Source range of the node that failed, when known
    pub span: Option<Span>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operand, callee, or subscript target of the wrong runtime shape
    TypeMismatch,
    /// Argument count differs from the callee's arity
    ArityMismatch,
    /// No case branch accepted the scrutinee
    MatchFailure,
    /// Subscript outside the aggregate
    IndexOutOfBounds,
    /// Division or remainder by zero
    DivisionByZero,
    /// Host input or output failed
    Io,
    /// Call depth exceeded the configured limit
    StackOverflow,
    /// Compiled tree is inconsistent with the frames it runs against
    Internal,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            span: None,
        }
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("type error: expected {expected}, got {got}"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: impl std::fmt::Display, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("function {name} expects {expected} argument(s), got {got}"),
        )
    }

    /// `location` is rendered by the caller, `value` is the displayed scrutinee
    pub fn match_failure(location: &str, value: &str) -> Self {
        Self::new(
            ErrorKind::MatchFailure,
            format!("match failure at {location}, value: {value}"),
        )
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds for length {len}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::Io, format!("IO error: {msg}"))
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: call depth exceeded {limit}"),
        )
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(ErrorKind::Internal, format!("internal error: {msg}"))
    }

    /// Attach a source location unless a more precise one is already set
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
