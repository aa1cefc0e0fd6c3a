//! Lama Interpreter Library
//!
//! Eager, dynamically typed expression language with closures, tagged
//! values and structural pattern matching.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use ast::Span;
pub use error::{CompileError, Result};
pub use interp::{Executable, Interpreter, RuntimeError, Value};

use std::sync::Once;

/// Any failure on the way from source text to a result value
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Compile a parsed program
pub fn compile(program: &ast::Program) -> Result<Executable> {
    interp::compile(program)
}

/// Lex, parse and compile source text
pub fn compile_source(filename: &str, source: &str) -> Result<Executable> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(filename, source, tokens)?;
    interp::compile_with_source(&program, source)
}

/// Compile and run source text on `interp`
pub fn eval_source(source: &str, interp: &mut Interpreter) -> std::result::Result<Value, Error> {
    let executable = compile_source("<input>", source)?;
    Ok(interp.execute(&executable, &[])?)
}

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`; a no-op when unset
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }

        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    });
}
