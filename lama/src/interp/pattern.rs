//! Case pattern compilation and matching
//!
//! Matching is two-phase: a matcher first walks the scrutinee collecting
//! the values its named sub-patterns bind, and only a complete match
//! writes them into the frame.

use super::frame::FrameRef;
use super::scope::ScopeStack;
use super::value::Value;
use crate::ast::{Pattern, Shape, Span, Spanned};
use crate::error::{CompileError, Result};
use std::rc::Rc;

/// Tag of the pair s-expression built by `:` and list literals
pub const CONS_TAG: &str = "cons";

/// Compiled pattern
#[derive(Debug, Clone)]
pub enum Matcher {
    Wildcard,
    /// Integer equality; rejects non-integers
    Int(i64),
    /// Bytewise string equality
    Str(Rc<[u8]>),
    /// Tag equality plus exact arity, then fields left to right
    Sexp { tag: Rc<str>, fields: Vec<Matcher> },
    /// Exact length, then elements left to right
    Array(Vec<Matcher>),
    /// Match `inner`, then bind the whole value to `slot`
    Named { slot: usize, inner: Box<Matcher> },
    Shape(Shape),
}

impl Matcher {
    /// Test `value`, writing bindings into `frame` only on success
    pub fn matches(&self, value: &Value, frame: &FrameRef) -> bool {
        let mut bindings = Vec::new();
        if !self.collect(value, &mut bindings) {
            return false;
        }
        let mut frame = frame.borrow_mut();
        for (slot, bound) in bindings {
            frame.set(slot, bound);
        }
        true
    }

    fn collect(&self, value: &Value, bindings: &mut Vec<(usize, Value)>) -> bool {
        match self {
            Matcher::Wildcard => true,
            Matcher::Int(expected) => value.as_int() == Some(*expected),
            Matcher::Str(expected) => match value {
                Value::Str(bytes) => bytes.borrow().as_slice() == &expected[..],
                _ => false,
            },
            Matcher::Sexp { tag, fields } => match value {
                Value::Sexp(actual, items) => {
                    let items = items.borrow();
                    actual == tag
                        && items.len() == fields.len()
                        && fields.iter().zip(items.iter()).all(|(m, v)| m.collect(v, bindings))
                }
                _ => false,
            },
            Matcher::Array(elements) => match value {
                Value::Array(items) => {
                    let items = items.borrow();
                    items.len() == elements.len()
                        && elements.iter().zip(items.iter()).all(|(m, v)| m.collect(v, bindings))
                }
                _ => false,
            },
            Matcher::Named { slot, inner } => {
                if inner.collect(value, bindings) {
                    bindings.push((*slot, value.clone()));
                    true
                } else {
                    false
                }
            }
            Matcher::Shape(shape) => has_shape(value, *shape),
        }
    }
}

fn has_shape(value: &Value, shape: Shape) -> bool {
    match shape {
        Shape::Box => !matches!(value, Value::Int(_)),
        Shape::Val => matches!(value, Value::Int(_)),
        Shape::Str => matches!(value, Value::Str(_)),
        Shape::Array => matches!(value, Value::Array(_)),
        Shape::Sexp => matches!(value, Value::Sexp(..)),
        Shape::Fun => matches!(value, Value::Closure(_)),
    }
}

/// Declare every name bound by `pattern` in the innermost scope
pub fn declare_bindings(pattern: &Spanned<Pattern>, scopes: &mut ScopeStack) -> Result<()> {
    match &pattern.node {
        Pattern::Wildcard | Pattern::Int(_) | Pattern::Str(_) | Pattern::Shape(_) => Ok(()),
        Pattern::Sexp { args: items, .. } | Pattern::Array(items) | Pattern::List(items) => {
            items.iter().try_for_each(|p| declare_bindings(p, scopes))
        }
        Pattern::Cons { head, tail } => {
            declare_bindings(head, scopes)?;
            declare_bindings(tail, scopes)
        }
        Pattern::Named { name, pattern } => {
            scopes.declare(&name.node, name.span)?;
            match pattern {
                Some(inner) => declare_bindings(inner, scopes),
                None => Ok(()),
            }
        }
        Pattern::Parens(inner) => declare_bindings(inner, scopes),
    }
}

/// Compile a pattern whose names were declared by [`declare_bindings`]
pub fn compile_pattern(pattern: &Spanned<Pattern>, scopes: &ScopeStack) -> Result<Matcher> {
    let matcher = match &pattern.node {
        Pattern::Wildcard => Matcher::Wildcard,
        Pattern::Int(n) => Matcher::Int(*n),
        Pattern::Str(bytes) => Matcher::Str(Rc::from(bytes.as_slice())),
        Pattern::Shape(shape) => Matcher::Shape(*shape),
        Pattern::Sexp { tag, args } => Matcher::Sexp {
            tag: Rc::from(tag.as_str()),
            fields: compile_all(args, scopes)?,
        },
        Pattern::Array(items) => Matcher::Array(compile_all(items, scopes)?),
        Pattern::List(items) => {
            let mut list = Matcher::Int(0);
            for item in items.iter().rev() {
                list = cons(compile_pattern(item, scopes)?, list);
            }
            list
        }
        Pattern::Cons { head, tail } => {
            cons(compile_pattern(head, scopes)?, compile_pattern(tail, scopes)?)
        }
        Pattern::Named { name, pattern } => Matcher::Named {
            slot: local_slot(scopes, &name.node, name.span)?,
            inner: Box::new(match pattern {
                Some(inner) => compile_pattern(inner, scopes)?,
                None => Matcher::Wildcard,
            }),
        },
        Pattern::Parens(inner) => compile_pattern(inner, scopes)?,
    };
    Ok(matcher)
}

fn compile_all(patterns: &[Spanned<Pattern>], scopes: &ScopeStack) -> Result<Vec<Matcher>> {
    patterns.iter().map(|p| compile_pattern(p, scopes)).collect()
}

fn cons(head: Matcher, tail: Matcher) -> Matcher {
    Matcher::Sexp {
        tag: Rc::from(CONS_TAG),
        fields: vec![head, tail],
    }
}

fn local_slot(scopes: &ScopeStack, name: &str, span: Span) -> Result<usize> {
    scopes
        .local(name)
        .ok_or_else(|| CompileError::unbound_identifier(name, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::frame::Frame;
    use crate::lexer::tokenize;

    /// Parse `case 0 of <pattern> -> 0 esac` and compile its pattern
    fn compile(source: &str) -> (Matcher, ScopeStack) {
        let program = format!("case 0 of {source} -> 0 esac");
        let tokens = tokenize(&program).unwrap();
        let ast = crate::parser::parse("test.lama", &program, tokens).unwrap();
        let expr = ast.body.expr.unwrap();
        let crate::ast::Expr::Case { ref branches, .. } = expr.node else {
            panic!("Expected Case");
        };
        let mut scopes = ScopeStack::new();
        scopes.push_flat();
        declare_bindings(&branches[0].pattern, &mut scopes).unwrap();
        let matcher = compile_pattern(&branches[0].pattern, &scopes).unwrap();
        (matcher, scopes)
    }

    fn list(items: Vec<Value>) -> Value {
        items
            .into_iter()
            .rev()
            .fold(Value::Int(0), |tail, head| Value::sexp(CONS_TAG, vec![head, tail]))
    }

    #[test]
    fn test_literal_patterns() {
        let frame = Frame::new(0, None).into_ref();
        let (m, _) = compile("3");
        assert!(m.matches(&Value::Int(3), &frame));
        assert!(!m.matches(&Value::Int(4), &frame));
        assert!(!m.matches(&Value::string("3"), &frame));

        let (m, _) = compile(r#""ab""#);
        assert!(m.matches(&Value::string("ab"), &frame));
        assert!(!m.matches(&Value::string("abc"), &frame));
    }

    #[test]
    fn test_sexp_pattern_requires_tag_and_arity() {
        let frame = Frame::new(2, None).into_ref();
        let (m, _) = compile("Pair (a, b)");
        assert!(m.matches(&Value::sexp("Pair", vec![Value::Int(1), Value::Int(2)]), &frame));
        assert_eq!(frame.borrow().get(0), Some(Value::Int(1)));
        assert_eq!(frame.borrow().get(1), Some(Value::Int(2)));
        assert!(!m.matches(&Value::sexp("Pair", vec![Value::Int(1)]), &frame));
        assert!(!m.matches(&Value::sexp("Pear", vec![Value::Int(1), Value::Int(2)]), &frame));
    }

    #[test]
    fn test_list_and_cons_patterns() {
        let frame = Frame::new(3, None).into_ref();
        let (m, _) = compile("{a, b}");
        assert!(m.matches(&list(vec![Value::Int(1), Value::Int(2)]), &frame));
        assert!(!m.matches(&list(vec![Value::Int(1)]), &frame));

        let (m, _) = compile("h : t");
        let xs = list(vec![Value::Int(9), Value::Int(8)]);
        assert!(m.matches(&xs, &frame));
        assert_eq!(frame.borrow().get(0), Some(Value::Int(9)));
        assert_eq!(frame.borrow().get(1).unwrap().to_string(), "cons (8, 0)");
        assert!(!m.matches(&Value::Int(0), &frame));
    }

    #[test]
    fn test_array_pattern_exact_length() {
        let frame = Frame::new(1, None).into_ref();
        let (m, _) = compile("[_, x]");
        assert!(m.matches(&Value::array(vec![Value::Int(1), Value::Int(2)]), &frame));
        assert_eq!(frame.borrow().get(0), Some(Value::Int(2)));
        assert!(!m.matches(&Value::array(vec![Value::Int(1)]), &frame));
    }

    #[test]
    fn test_named_pattern_binds_whole_value() {
        let frame = Frame::new(2, None).into_ref();
        let (m, scopes) = compile("p@Pair (x, _)");
        assert_eq!(scopes.local("p"), Some(0));
        let pair = Value::sexp("Pair", vec![Value::Int(5), Value::Int(6)]);
        assert!(m.matches(&pair, &frame));
        assert!(frame.borrow().get(0).unwrap().is_identical(&pair));
        assert_eq!(frame.borrow().get(1), Some(Value::Int(5)));
    }

    #[test]
    fn test_failed_match_leaves_frame_untouched() {
        let frame = Frame::new(2, None).into_ref();
        let (m, _) = compile("Pair (x, 7)");
        assert!(!m.matches(&Value::sexp("Pair", vec![Value::Int(1), Value::Int(2)]), &frame));
        assert_eq!(frame.borrow().get(0), Some(Value::Int(0)));
    }

    #[test]
    fn test_shape_patterns() {
        let frame = Frame::new(0, None).into_ref();
        let (val, _) = compile("#val");
        let (boxed, _) = compile("#box");
        let (sexp, _) = compile("#sexp");
        assert!(val.matches(&Value::Int(1), &frame));
        assert!(!val.matches(&Value::string(""), &frame));
        assert!(boxed.matches(&Value::array(vec![]), &frame));
        assert!(!boxed.matches(&Value::Int(1), &frame));
        assert!(sexp.matches(&Value::sexp("Nil", vec![]), &frame));
    }

    #[test]
    fn test_duplicate_name_in_pattern() {
        let program = "case 0 of Pair (a, a) -> 0 esac";
        let tokens = tokenize(program).unwrap();
        let ast = crate::parser::parse("test.lama", program, tokens).unwrap();
        let crate::ast::Expr::Case { ref branches, .. } = ast.body.expr.unwrap().node else {
            panic!("Expected Case");
        };
        let mut scopes = ScopeStack::new();
        scopes.push_flat();
        let err = declare_bindings(&branches[0].pattern, &mut scopes).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateBinding { .. }));
    }
}
