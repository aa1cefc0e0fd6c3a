//! Parser implementation using lalrpop

use crate::ast::{BinOp, Block, Definition, Expr, Program, Span, Spanned};
use crate::error::{CompileError, Result};
use crate::lexer::Token;
use lalrpop_util::ParseError;

#[cfg(test)]
mod tests;

lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar,
    "/parser/grammar.rs"
);

/// Definitions and trailing expression of a scope, definitions in reverse order
type ScopeItems = (Vec<Spanned<Definition>>, Option<Box<Spanned<Expr>>>);

/// Parse tokens into AST
pub fn parse(_filename: &str, _source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    let program = grammar::ProgramParser::new()
        .parse(token_iter)
        .map_err(parse_error)?;

    tracing::trace!(defs = program.body.defs.len(), "parsed program");
    Ok(program)
}

fn parse_error(error: ParseError<usize, Token, CompileError>) -> CompileError {
    match error {
        ParseError::InvalidToken { location } => {
            CompileError::parser("invalid token", Span::new(location, location + 1))
        }
        ParseError::UnrecognizedEof { location, expected } => CompileError::parser(
            format!("unexpected end of input{}", expecting(&expected)),
            Span::new(location, location),
        ),
        ParseError::UnrecognizedToken {
            token: (start, token, end),
            expected,
        } => CompileError::parser(
            format!("unexpected `{token}`{}", expecting(&expected)),
            Span::new(start, end),
        ),
        ParseError::ExtraToken {
            token: (start, token, end),
        } => CompileError::parser(format!("unexpected `{token}`"), Span::new(start, end)),
        ParseError::User { error } => error,
    }
}

fn expecting(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(", expected one of {}", expected.join(" "))
    }
}

// ---- grammar actions ----

fn block((mut defs, expr): ScopeItems, span: Span) -> Block {
    defs.reverse();
    Block { defs, expr, span }
}

/// `e1; ...; en`, or the single expression itself
fn sequence(mut items: Vec<Spanned<Expr>>, span: Span) -> Spanned<Expr> {
    if items.len() == 1 {
        items.remove(0)
    } else {
        Spanned::new(Expr::Seq(items), span)
    }
}

fn binary(left: Spanned<Expr>, op: BinOp, right: Spanned<Expr>, span: Span) -> Spanned<Expr> {
    Spanned::new(
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

/// `( scope )`: a scope with no definitions is just its expression
fn paren(body: Block, span: Span) -> Spanned<Expr> {
    match body {
        Block {
            defs,
            expr: Some(inner),
            ..
        } if defs.is_empty() => Spanned::new(inner.node, span),
        body => Spanned::new(Expr::Scope(body), span),
    }
}
