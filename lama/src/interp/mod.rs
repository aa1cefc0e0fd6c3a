//! Lama interpreter
//!
//! Source is compiled once into a node tree with resolved slots, then the
//! tree is evaluated against chains of activation records.

mod builtins;
mod compile;
mod config;
mod error;
mod eval;
mod frame;
mod node;
mod pattern;
mod scope;
mod value;

pub use builtins::{Arity, Builtin, BuiltinFn, BUILTINS};
pub use compile::{compile, compile_with_source, Sort};
pub use config::{Config, DEFAULT_MAX_CALL_DEPTH};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use frame::{ancestor, Frame, FrameRef};
pub use node::{CaseNode, Executable, Function, Node};
pub use pattern::{Matcher, CONS_TAG};
pub use scope::{Binding, ScopeKind, ScopeStack};
pub use value::{Callable, Closure, Items, Reference, Value};
