//! Node evaluator

use super::config::Config;
use super::error::{InterpResult, RuntimeError};
use super::frame::{ancestor, Frame, FrameRef};
use super::node::{CaseNode, Executable, Node};
use super::pattern::CONS_TAG;
use super::value::{Callable, Closure, Reference, Value};
use crate::ast::{BinOp, Span};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Stack growth parameters for deep recursion
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// The interpreter
pub struct Interpreter {
    /// Source for the `read` builtin
    input: Box<dyn BufRead>,
    /// Sink for the `write` builtin and the read prompt
    output: Box<dyn Write>,
    config: Config,
    /// Current closure call nesting
    call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter over stdin and stdout
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }

    /// Create an interpreter over the given streams
    pub fn with_io(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Interpreter {
            input: Box::new(input),
            output: Box::new(output),
            config: Config::default(),
            call_depth: 0,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a compiled program in a fresh root frame
    ///
    /// The program takes no parameters; any `args` are accepted and ignored.
    pub fn execute(&mut self, executable: &Executable, args: &[Value]) -> InterpResult<Value> {
        tracing::debug!(
            frame_size = executable.frame_size,
            ignored_args = args.len(),
            "executing program"
        );

        let root = Frame::new(executable.frame_size, None).into_ref();
        {
            let mut frame = root.borrow_mut();
            for &(slot, builtin) in &executable.builtins {
                let closure = Closure {
                    callable: Callable::Builtin(builtin),
                    captured: None,
                };
                frame.set(slot, Value::Closure(Rc::new(closure)));
            }
        }

        self.call_depth = 0;
        let result = self.eval(&executable.body, &root);
        self.output.flush().map_err(io_error)?;
        result
    }

    /// Apply a function value to arguments
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> InterpResult<Value> {
        match callee {
            Value::Closure(closure) => self.call_closure(closure, args),
            other => Err(RuntimeError::type_error("function", other.type_name())),
        }
    }

    fn call_closure(&mut self, closure: &Closure, args: Vec<Value>) -> InterpResult<Value> {
        match &closure.callable {
            Callable::Builtin(builtin) => {
                if !builtin.arity.accepts(args.len()) {
                    return Err(RuntimeError::arity_mismatch(builtin.name, builtin.arity, args.len()));
                }
                (builtin.func)(self, &args)
            }
            Callable::Function(func) => {
                if func.arity != args.len() {
                    return Err(RuntimeError::arity_mismatch(
                        closure.callable.name(),
                        func.arity,
                        args.len(),
                    ));
                }

                // Check call depth
                self.call_depth += 1;
                if self.call_depth > self.config.max_call_depth {
                    self.call_depth -= 1;
                    return Err(RuntimeError::stack_overflow(self.config.max_call_depth));
                }

                let mut frame = Frame::new(func.frame_size, closure.captured.clone());
                for (slot, arg) in args.into_iter().enumerate() {
                    frame.set(slot, arg);
                }
                let frame = frame.into_ref();

                let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    self.eval(&func.body, &frame)
                });
                self.call_depth -= 1;
                result
            }
        }
    }

    /// Evaluate a node with automatic stack growth for deep recursion
    pub fn eval(&mut self, node: &Node, frame: &FrameRef) -> InterpResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(node, frame))
    }

    fn eval_inner(&mut self, node: &Node, frame: &FrameRef) -> InterpResult<Value> {
        match node {
            Node::Const(n) => Ok(Value::Int(*n)),
            Node::Str(bytes) => Ok(Value::string(bytes.to_vec())),

            Node::Name { slot, depth } => load(frame, *slot, *depth),
            Node::NameRef { slot, depth } => {
                let target = ancestor(frame, *depth)
                    .ok_or_else(|| RuntimeError::internal("frame chain shorter than binding depth"))?;
                Ok(Value::Ref(Reference::Slot {
                    frame: target,
                    slot: *slot,
                }))
            }

            Node::Define { slot, value } => {
                let value = self.eval(value, frame)?;
                if !frame.borrow_mut().set(*slot, value.clone()) {
                    return Err(RuntimeError::internal("definition slot outside frame"));
                }
                Ok(value)
            }

            Node::Assign {
                target,
                value,
                span,
            } => {
                let target = match self.eval(target, frame)? {
                    Value::Ref(reference) => reference,
                    other => {
                        return Err(RuntimeError::type_error("reference", other.type_name())
                            .with_span(*span));
                    }
                };
                let value = self.eval(value, frame)?;
                let stored = match &value {
                    Value::Int(n) => target.assign_int(*n),
                    other => target.assign(other.clone()),
                };
                stored.map_err(|e| e.with_span(*span))?;
                Ok(value)
            }

            Node::Seq(..) => self.eval_seq(node, frame),

            Node::Binary { op, lhs, rhs, span } => {
                let lhs = self.eval(lhs, frame)?;
                let rhs = self.eval(rhs, frame)?;
                binary(*op, lhs, rhs).map_err(|e| e.with_span(*span))
            }

            Node::Call { callee, args, span } => {
                let callee = self.eval(callee, frame)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<InterpResult<Vec<_>>>()?;
                self.call(&callee, args).map_err(|e| e.with_span(*span))
            }

            Node::Subscript { value, index, span } => {
                let target = self.eval(value, frame)?;
                let index = self.eval(index, frame)?;
                subscript(&target, &index).map_err(|e| e.with_span(*span))
            }
            Node::SubscriptRef { value, index, span } => {
                let target = self.eval(value, frame)?;
                let index = self.eval(index, frame)?;
                subscript_ref(target, &index)
                    .map(Value::Ref)
                    .map_err(|e| e.with_span(*span))
            }

            Node::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item, frame))
                    .collect::<InterpResult<Vec<_>>>()?;
                Ok(Value::array(items))
            }
            Node::Sexp { tag, fields } => {
                let fields = fields
                    .iter()
                    .map(|field| self.eval(field, frame))
                    .collect::<InterpResult<Vec<_>>>()?;
                Ok(Value::sexp(Rc::clone(tag), fields))
            }

            Node::Fun(func) => Ok(Value::Closure(Rc::new(Closure {
                callable: Callable::Function(Rc::clone(func)),
                captured: Some(Rc::clone(frame)),
            }))),

            Node::If {
                cond,
                then_branch,
                else_branch,
                span,
            } => {
                if self.condition(cond, frame, *span)? {
                    self.eval(then_branch, frame)
                } else {
                    self.eval(else_branch, frame)
                }
            }

            Node::While { cond, body, span } => {
                self.repeat(|it| {
                    if !it.condition(cond, frame, *span)? {
                        return Ok(false);
                    }
                    it.eval(body, frame)?;
                    Ok(true)
                })?;
                Ok(Value::UNIT)
            }
            Node::DoWhile { body, cond, span } => {
                self.repeat(|it| {
                    it.eval(body, frame)?;
                    it.condition(cond, frame, *span)
                })?;
                Ok(Value::UNIT)
            }

            Node::Case(case) => self.eval_case(case, frame),
        }
    }

    /// Walk a right-associated sequence without growing the stack
    fn eval_seq(&mut self, mut node: &Node, frame: &FrameRef) -> InterpResult<Value> {
        while let Node::Seq(first, rest) = node {
            self.eval(first, frame)?;
            node = &**rest;
        }
        self.eval(node, frame)
    }

    /// Run `step` until it reports the loop is finished
    fn repeat(&mut self, mut step: impl FnMut(&mut Self) -> InterpResult<bool>) -> InterpResult<()> {
        while step(self)? {}
        Ok(())
    }

    fn condition(&mut self, cond: &Node, frame: &FrameRef, span: Span) -> InterpResult<bool> {
        match self.eval(cond, frame)? {
            Value::Int(n) => Ok(n != 0),
            other => Err(RuntimeError::type_error("integer condition", other.type_name()).with_span(span)),
        }
    }

    fn eval_case(&mut self, case: &CaseNode, frame: &FrameRef) -> InterpResult<Value> {
        let value = self.eval(&case.scrutinee, frame)?;
        for (matcher, body) in &case.branches {
            if matcher.matches(&value, frame) {
                return self.eval(body, frame);
            }
        }

        tracing::debug!(location = %case.location, value = %value, "match failure");
        Err(RuntimeError::match_failure(&case.location, &value.to_string()).with_span(case.span))
    }

    /// Prompt, then read one line from the input as an integer
    pub(crate) fn read_int(&mut self) -> InterpResult<i64> {
        if let Some(prompt) = &self.config.read_prompt {
            self.output.write_all(prompt.as_bytes()).map_err(io_error)?;
            self.output.flush().map_err(io_error)?;
        }

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(RuntimeError::io_error("unexpected end of input"));
        }

        let text = line.trim();
        tracing::trace!(input = text, "read");
        text.parse::<i64>()
            .map_err(|_| RuntimeError::io_error(&format!("invalid integer: {text:?}")))
    }

    /// Write an integer followed by a newline
    pub(crate) fn write_int(&mut self, n: i64) -> InterpResult<()> {
        tracing::trace!(value = n, "write");
        writeln!(self.output, "{n}").map_err(io_error)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(err: io::Error) -> RuntimeError {
    RuntimeError::io_error(&err.to_string())
}

fn load(frame: &FrameRef, slot: usize, depth: usize) -> InterpResult<Value> {
    let target = ancestor(frame, depth)
        .ok_or_else(|| RuntimeError::internal("frame chain shorter than binding depth"))?;
    let value = target.borrow().get(slot);
    value.ok_or_else(|| RuntimeError::internal("slot outside frame"))
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> InterpResult<Value> {
    match op {
        BinOp::Eq => Ok(Value::bool(lhs.is_identical(&rhs))),
        BinOp::Ne => Ok(Value::bool(!lhs.is_identical(&rhs))),
        BinOp::Cons => Ok(Value::sexp(CONS_TAG, vec![lhs, rhs])),
        _ => {
            let (a, b) = match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => (*a, *b),
                (Value::Int(_), other) | (other, _) => {
                    return Err(RuntimeError::type_error(
                        &format!("integer operands for `{op}`"),
                        other.type_name(),
                    ));
                }
            };
            arithmetic(op, a, b).map(Value::Int)
        }
    }
}

/// Integer operators; overflow wraps
fn arithmetic(op: BinOp, a: i64, b: i64) -> InterpResult<i64> {
    Ok(match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero());
            }
            a.wrapping_div(b)
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero());
            }
            a.wrapping_rem(b)
        }
        BinOp::Lt => i64::from(a < b),
        BinOp::Le => i64::from(a <= b),
        BinOp::Gt => i64::from(a > b),
        BinOp::Ge => i64::from(a >= b),
        BinOp::Eq => i64::from(a == b),
        BinOp::Ne => i64::from(a != b),
        BinOp::And => i64::from(a != 0 && b != 0),
        BinOp::Or => i64::from(a != 0 || b != 0),
        BinOp::Cons => return Err(RuntimeError::internal("`:` is not an integer operator")),
    })
}

fn element_index(index: &Value, len: usize) -> InterpResult<usize> {
    let index = index.expect_int()?;
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| RuntimeError::index_out_of_bounds(index, len))
}

fn subscript(target: &Value, index: &Value) -> InterpResult<Value> {
    match target {
        Value::Str(bytes) => {
            let bytes = bytes.borrow();
            let i = element_index(index, bytes.len())?;
            Ok(Value::Int(i64::from(bytes[i])))
        }
        Value::Array(items) | Value::Sexp(_, items) => {
            let items = items.borrow();
            let i = element_index(index, items.len())?;
            Ok(items[i].clone())
        }
        other => Err(RuntimeError::type_error(
            "string, array or s-expression",
            other.type_name(),
        )),
    }
}

fn subscript_ref(target: Value, index: &Value) -> InterpResult<Reference> {
    match target {
        Value::Str(bytes) => {
            let index = element_index(index, bytes.borrow().len())?;
            Ok(Reference::Byte { bytes, index })
        }
        Value::Array(items) | Value::Sexp(_, items) => {
            let index = element_index(index, items.borrow().len())?;
            Ok(Reference::Element { items, index })
        }
        other => Err(RuntimeError::type_error(
            "string, array or s-expression",
            other.type_name(),
        )),
    }
}
