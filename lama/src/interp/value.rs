//! Runtime values for the interpreter

use super::builtins::Builtin;
use super::error::{InterpResult, RuntimeError};
use super::frame::FrameRef;
use super::node::Function;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Runtime value
///
/// Integers are immediate; every other variant is a shared handle, so
/// copying a value aliases the underlying storage.
#[derive(Clone)]
pub enum Value {
    /// 64-bit integer; also the unit and boolean value
    Int(i64),
    /// Mutable byte string
    Str(Rc<RefCell<Vec<u8>>>),
    /// Mutable array of values
    Array(Rc<Items>),
    /// Tagged constructor application with mutable fields
    Sexp(Rc<str>, Rc<Items>),
    /// Function value with its captured frame
    Closure(Rc<Closure>),
    /// Assignable location, produced only for assignment targets
    Ref(Reference),
}

impl Value {
    /// Value of `skip`, `false`, loops and one-armed `if`
    pub const UNIT: Value = Value::Int(0);

    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Str(Rc::new(RefCell::new(bytes.into())))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(Items::new(items)))
    }

    pub fn sexp(tag: impl Into<Rc<str>>, fields: Vec<Value>) -> Self {
        Value::Sexp(tag.into(), Rc::new(Items::new(fields)))
    }

    pub fn bool(b: bool) -> Self {
        Value::Int(i64::from(b))
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Sexp(..) => "s-expression",
            Value::Closure(_) => "function",
            Value::Ref(_) => "reference",
        }
    }

    /// Try to convert to i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer payload or a type error naming the offending shape
    pub fn expect_int(&self) -> InterpResult<i64> {
        self.as_int()
            .ok_or_else(|| RuntimeError::type_error("integer", self.type_name()))
    }

    /// Address of the shared storage, `None` for integers
    fn identity(&self) -> Option<usize> {
        match self {
            Value::Int(_) => None,
            Value::Str(s) => Some(Rc::as_ptr(s) as *const () as usize),
            Value::Array(a) => Some(Rc::as_ptr(a) as *const () as usize),
            Value::Sexp(_, fields) => Some(Rc::as_ptr(fields) as *const () as usize),
            Value::Closure(c) => Some(Rc::as_ptr(c) as *const () as usize),
            Value::Ref(r) => Some(r.identity()),
        }
    }

    /// Integers compare by value, everything else by identity
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_), _) | (_, Value::Int(_)) => false,
            _ => self.identity() == other.identity(),
        }
    }

    /// Display form as raw bytes; string contents are copied verbatim
    ///
    /// An aggregate reached again while it is still being rendered prints
    /// as `...`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut visiting = HashSet::new();
        let mut steps = vec![Step::Show(self.clone())];

        while let Some(step) = steps.pop() {
            let value = match step {
                Step::Show(value) => value,
                Step::Text(text) => {
                    out.extend_from_slice(text.as_bytes());
                    continue;
                }
                Step::Leave(id) => {
                    visiting.remove(&id);
                    continue;
                }
            };

            if let Some(id) = value.identity() {
                if !visiting.insert(id) {
                    out.extend_from_slice(b"...");
                    continue;
                }
                steps.push(Step::Leave(id));
            }

            match &value {
                Value::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
                Value::Str(bytes) => {
                    out.push(b'"');
                    out.extend_from_slice(&bytes.borrow());
                    out.push(b'"');
                }
                Value::Array(items) => {
                    out.push(b'[');
                    steps.push(Step::Text("]"));
                    push_fields(&mut steps, &items.borrow());
                }
                Value::Sexp(tag, fields) => {
                    out.extend_from_slice(tag.as_bytes());
                    let fields = fields.borrow();
                    if !fields.is_empty() {
                        out.extend_from_slice(b" (");
                        steps.push(Step::Text(")"));
                        push_fields(&mut steps, &fields);
                    }
                }
                Value::Closure(closure) => {
                    out.extend_from_slice(format!("<closure 0x{:x}", closure.callable.id()).as_bytes());
                    steps.push(Step::Text(">"));
                    if let Some(frame) = &closure.captured {
                        let frame_id = Rc::as_ptr(frame) as *const () as usize;
                        if visiting.insert(frame_id) {
                            steps.push(Step::Leave(frame_id));
                            for slot in frame.borrow().slots().iter().rev() {
                                steps.push(Step::Show(slot.clone()));
                                steps.push(Step::Text(", "));
                            }
                        } else {
                            out.extend_from_slice(b", ...");
                        }
                    }
                }
                Value::Ref(_) => out.extend_from_slice(b"<ref>"),
            }
        }
        out
    }
}

/// Pending output of `Value::to_bytes`
enum Step {
    Show(Value),
    Text(&'static str),
    /// Done with an aggregate; it renders in full again if met later
    Leave(usize),
}

/// Queue `items` separated by commas, first item on top
fn push_fields(steps: &mut Vec<Step>, items: &[Value]) {
    for (i, item) in items.iter().enumerate().rev() {
        steps.push(Step::Show(item.clone()));
        if i > 0 {
            steps.push(Step::Text(", "));
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            other => write!(f, "{}({other})", other.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other)
    }
}

/// Element storage shared by arrays and s-expressions
pub struct Items(RefCell<Vec<Value>>);

impl Items {
    pub fn new(items: Vec<Value>) -> Self {
        Items(RefCell::new(items))
    }

    fn into_vec(mut self) -> Vec<Value> {
        std::mem::take(self.0.get_mut())
    }
}

impl Deref for Items {
    type Target = RefCell<Vec<Value>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Items({:p})", self.0.as_ptr())
    }
}

impl Drop for Items {
    fn drop(&mut self) {
        release(std::mem::take(self.0.get_mut()), None);
    }
}

/// Drop `values` and `frame`, dismantling everything only they own with an
/// explicit worklist so long lists and deep records never recurse
pub(crate) fn release(mut values: Vec<Value>, frame: Option<FrameRef>) {
    let mut frames: Vec<FrameRef> = frame.filter(sole_owner).into_iter().collect();

    loop {
        if let Some(value) = values.pop() {
            match value {
                Value::Array(items)
                | Value::Sexp(_, items)
                | Value::Ref(Reference::Element { items, .. }) => {
                    if let Ok(items) = Rc::try_unwrap(items) {
                        values.extend(items.into_vec());
                    }
                }
                Value::Closure(closure) => {
                    if let Ok(closure) = Rc::try_unwrap(closure) {
                        frames.extend(closure.captured.filter(sole_owner));
                    }
                }
                Value::Ref(Reference::Slot { frame, .. }) => {
                    if sole_owner(&frame) {
                        frames.push(frame);
                    }
                }
                Value::Int(_) | Value::Str(_) | Value::Ref(Reference::Byte { .. }) => {}
            }
        } else if let Some(frame) = frames.pop() {
            if let Ok(frame) = Rc::try_unwrap(frame) {
                let (slots, parent) = frame.into_inner().take_contents();
                values.extend(slots);
                frames.extend(parent.filter(sole_owner));
            }
        } else {
            return;
        }
    }
}

fn sole_owner(frame: &FrameRef) -> bool {
    Rc::strong_count(frame) == 1
}

/// A function value: code plus the frame it closes over
pub struct Closure {
    pub callable: Callable,
    /// Frame current when the closure was created; `None` for builtins
    pub captured: Option<FrameRef>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.callable.name())
            .field("captured", &self.captured.as_ref().map(|fr| fr.borrow().len()))
            .finish()
    }
}

/// Code a closure runs
#[derive(Debug, Clone)]
pub enum Callable {
    Function(Rc<Function>),
    Builtin(&'static Builtin),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Function(func) => func.name.as_deref().unwrap_or("<lambda>"),
            Callable::Builtin(builtin) => builtin.name,
        }
    }

    /// Stable identity of the code, shared by all closures over it
    pub fn id(&self) -> usize {
        match self {
            Callable::Function(func) => Rc::as_ptr(func) as usize,
            Callable::Builtin(builtin) => *builtin as *const Builtin as usize,
        }
    }
}

/// Assignable location produced by a reference-sort node
#[derive(Debug, Clone)]
pub enum Reference {
    /// Slot of an activation record
    Slot { frame: FrameRef, slot: usize },
    /// Element of an array or field of an s-expression
    Element {
        items: Rc<Items>,
        index: usize,
    },
    /// Byte of a string
    Byte {
        bytes: Rc<RefCell<Vec<u8>>>,
        index: usize,
    },
}

impl Reference {
    fn identity(&self) -> usize {
        match self {
            Reference::Slot { frame, .. } => Rc::as_ptr(frame) as *const () as usize,
            Reference::Element { items, .. } => Rc::as_ptr(items) as *const () as usize,
            Reference::Byte { bytes, .. } => Rc::as_ptr(bytes) as *const () as usize,
        }
    }

    /// Store an integer; string bytes keep the low 8 bits
    pub fn assign_int(&self, value: i64) -> InterpResult<()> {
        match self {
            Reference::Byte { bytes, index } => {
                let mut bytes = bytes.borrow_mut();
                let len = bytes.len();
                let cell = bytes
                    .get_mut(*index)
                    .ok_or_else(|| RuntimeError::index_out_of_bounds(*index as i64, len))?;
                *cell = value as u8;
                Ok(())
            }
            _ => self.assign(Value::Int(value)),
        }
    }

    /// Store any value; a string byte accepts only integers
    pub fn assign(&self, value: Value) -> InterpResult<()> {
        match self {
            Reference::Slot { frame, slot } => {
                if frame.borrow_mut().set(*slot, value) {
                    Ok(())
                } else {
                    Err(RuntimeError::internal("slot outside frame"))
                }
            }
            Reference::Element { items, index } => {
                let mut items = items.borrow_mut();
                let len = items.len();
                let cell = items
                    .get_mut(*index)
                    .ok_or_else(|| RuntimeError::index_out_of_bounds(*index as i64, len))?;
                *cell = value;
                Ok(())
            }
            Reference::Byte { .. } => match value {
                Value::Int(n) => self.assign_int(n),
                other => Err(RuntimeError::type_error(
                    "integer for string element",
                    other.type_name(),
                )),
            },
        }
    }
}
