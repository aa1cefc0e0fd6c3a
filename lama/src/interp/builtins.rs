//! Built-in functions available in the root frame

use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::value::Value;
use std::fmt;

/// Builtin function type
pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> InterpResult<Value>;

/// Accepted argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => n == count,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Variadic => write!(f, "any number of"),
        }
    }
}

/// A host-implemented function
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Builtins in root-slot order
pub static BUILTINS: [Builtin; 4] = [
    Builtin {
        name: "read",
        arity: Arity::Fixed(0),
        func: builtin_read,
    },
    Builtin {
        name: "write",
        arity: Arity::Fixed(1),
        func: builtin_write,
    },
    Builtin {
        name: "length",
        arity: Arity::Fixed(1),
        func: builtin_length,
    },
    Builtin {
        name: "string",
        arity: Arity::Fixed(1),
        func: builtin_string,
    },
];


/// read() -> int: prompt, then parse one line as an integer
fn builtin_read(interp: &mut Interpreter, _args: &[Value]) -> InterpResult<Value> {
    interp.read_int().map(Value::Int)
}

/// write(n) -> 0: print an integer followed by a newline
fn builtin_write(interp: &mut Interpreter, args: &[Value]) -> InterpResult<Value> {
    let n = args[0].expect_int()?;
    interp.write_int(n)?;
    Ok(Value::UNIT)
}

/// length(x) -> int
fn builtin_length(_interp: &mut Interpreter, args: &[Value]) -> InterpResult<Value> {
    let len = match &args[0] {
        Value::Str(bytes) => bytes.borrow().len(),
        Value::Array(items) | Value::Sexp(_, items) => items.borrow().len(),
        Value::Closure(closure) => closure.captured.as_ref().map_or(0, |frame| frame.borrow().len()),
        other => {
            return Err(RuntimeError::type_error(
                "string, array, s-expression or function",
                other.type_name(),
            ));
        }
    };
    Ok(Value::Int(len as i64))
}

/// string(x) -> str: display form of any value
fn builtin_string(_interp: &mut Interpreter, args: &[Value]) -> InterpResult<Value> {
    Ok(Value::string(args[0].to_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    fn interp() -> Interpreter {
        Interpreter::with_io(std::io::empty(), std::io::sink())
    }

    #[test]
    fn test_root_slot_order() {
        let names: Vec<_> = BUILTINS.iter().map(|b| b.name).collect();
        assert_eq!(names, ["read", "write", "length", "string"]);
        assert_eq!(BUILTINS[0].arity, Arity::Fixed(0));
        assert!(BUILTINS[1..].iter().all(|b| b.arity == Arity::Fixed(1)));
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::Fixed(2).to_string(), "2");
        assert_eq!(Arity::Variadic.to_string(), "any number of");
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Fixed(1).accepts(1));
        assert!(!Arity::Fixed(1).accepts(2));
        assert!(Arity::Variadic.accepts(0));
        assert!(Arity::Variadic.accepts(7));
    }

    #[test]
    fn test_length() {
        let mut it = interp();
        let n = builtin_length(&mut it, &[Value::string("abc")]).unwrap();
        assert_eq!(n, Value::Int(3));
        let n = builtin_length(&mut it, &[Value::sexp("T", vec![Value::Int(1)])]).unwrap();
        assert_eq!(n, Value::Int(1));
        let err = builtin_length(&mut it, &[Value::Int(1)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_string_renders_nested() {
        let mut it = interp();
        let v = Value::array(vec![
            Value::Int(1),
            Value::string("a"),
            Value::sexp("Pair", vec![Value::Int(2), Value::Int(3)]),
        ]);
        let s = builtin_string(&mut it, &[v]).unwrap();
        assert_eq!(s.to_string(), r#""[1, "a", Pair (2, 3)]""#);
    }

    #[test]
    fn test_write_rejects_non_integer() {
        let mut it = interp();
        let err = builtin_write(&mut it, &[Value::string("x")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_read_at_end_of_input() {
        let mut it = interp();
        let err = builtin_read(&mut it, &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
