//! Compile-time error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Error detected before any node is executed
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },

    /// Name declared twice in one scope
    #[error("Binding error at {span}: {message}")]
    DuplicateBinding { message: String, span: Span },

    /// Name not found anywhere in the scope chain
    #[error("Binding error at {span}: {message}")]
    UnboundIdentifier { message: String, span: Span },

    /// Expression used as an assignment target that has no reference form
    #[error("Assignment error at {span}: {message}")]
    NotAssignable { message: String, span: Span },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn duplicate_binding(name: &str, span: Span) -> Self {
        Self::DuplicateBinding {
            message: format!("id \"{name}\" is already defined in scope"),
            span,
        }
    }

    pub fn unbound_identifier(name: &str, span: Span) -> Self {
        Self::UnboundIdentifier {
            message: format!("id \"{name}\" is not defined"),
            span,
        }
    }

    pub fn not_assignable(what: &str, span: Span) -> Self {
        Self::NotAssignable {
            message: format!("{what} cannot be assigned to"),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Lexer { span, .. }
            | Self::Parser { span, .. }
            | Self::DuplicateBinding { span, .. }
            | Self::UnboundIdentifier { span, .. }
            | Self::NotAssignable { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. }
            | Self::Parser { message, .. }
            | Self::DuplicateBinding { message, .. }
            | Self::UnboundIdentifier { message, .. }
            | Self::NotAssignable { message, .. } => message,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Lexer",
            Self::Parser { .. } => "Parser",
            Self::DuplicateBinding { .. } | Self::UnboundIdentifier { .. } => "Binding",
            Self::NotAssignable { .. } => "Assignment",
        }
    }
}

/// Report a compile error with ariadne
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    report_at(filename, source, error.kind(), error.message(), Some(error.span()));
}

/// Report an error message at an optional source location with ariadne
pub fn report_at(filename: &str, source: &str, kind: &str, message: &str, span: Option<Span>) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let printed = match span {
        Some(span) => Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source))),
        None => Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {message}"))
            .finish()
            .eprint((filename, Source::from(source))),
    };

    if let Err(e) = printed {
        eprintln!("{kind} error: {message} ({e})");
    }
}
