//! Executable node tree
//!
//! Produced by the compiler with every name already resolved to a
//! `(slot, depth)` pair, so evaluation never consults a symbol table.

use super::builtins::Builtin;
use super::pattern::Matcher;
use crate::ast::{BinOp, Span};
use std::rc::Rc;

/// A compiled expression
#[derive(Debug, Clone)]
pub enum Node {
    /// Integer constant (literals, `skip`, `true`/`false`)
    Const(i64),
    /// String literal; each evaluation yields a fresh copy
    Str(Rc<[u8]>),
    /// Read a slot `depth` frames up
    Name { slot: usize, depth: usize },
    /// Reference to a slot `depth` frames up
    NameRef { slot: usize, depth: usize },
    /// Initialize a local slot in the current frame
    Define { slot: usize, value: Box<Node> },
    /// Store through a reference, yielding the stored value
    Assign {
        target: Box<Node>,
        value: Box<Node>,
        span: Span,
    },
    /// Evaluate the first, then yield the second
    Seq(Box<Node>, Box<Node>),
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
        span: Span,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },
    Subscript {
        value: Box<Node>,
        index: Box<Node>,
        span: Span,
    },
    /// Reference to an element of a string, array or s-expression
    SubscriptRef {
        value: Box<Node>,
        index: Box<Node>,
        span: Span,
    },
    Array(Vec<Node>),
    Sexp { tag: Rc<str>, fields: Vec<Node> },
    /// Create a closure over the current frame
    Fun(Rc<Function>),
    If {
        cond: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
        span: Span,
    },
    While {
        cond: Box<Node>,
        body: Box<Node>,
        span: Span,
    },
    DoWhile {
        body: Box<Node>,
        cond: Box<Node>,
        span: Span,
    },
    Case(Box<CaseNode>),
}

/// Compiled `case` expression
#[derive(Debug, Clone)]
pub struct CaseNode {
    pub scrutinee: Node,
    pub branches: Vec<(Matcher, Node)>,
    /// Human-readable position used in match failure messages
    pub location: Rc<str>,
    pub span: Span,
}

/// Compiled function body
#[derive(Debug)]
pub struct Function {
    /// Defined name, `None` for lambdas
    pub name: Option<String>,
    pub arity: usize,
    /// Slots in each activation record, parameters first
    pub frame_size: usize,
    pub body: Node,
    pub span: Span,
}

/// A compiled program ready to run
#[derive(Debug)]
pub struct Executable {
    pub(crate) body: Node,
    pub(crate) frame_size: usize,
    /// Root slots pre-populated with builtin closures
    pub(crate) builtins: Vec<(usize, &'static Builtin)>,
}

impl Executable {
    /// Slot count of the root frame
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn body(&self) -> &Node {
        &self.body
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Const(0)
    }
}

// Deep node chains are torn down with a worklist, like the syntax tree
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl Node {
    /// Move every child that owns further nodes into `out`
    fn detach_children(&mut self, out: &mut Vec<Node>) {
        match self {
            Node::Const(_) | Node::Str(_) | Node::Name { .. } | Node::NameRef { .. } | Node::Fun(_) => {}
            Node::Define { value, .. } => detach(value, out),
            Node::Assign { target: a, value: b, .. }
            | Node::Seq(a, b)
            | Node::Binary { lhs: a, rhs: b, .. }
            | Node::Subscript { value: a, index: b, .. }
            | Node::SubscriptRef { value: a, index: b, .. }
            | Node::While { cond: a, body: b, .. }
            | Node::DoWhile { body: a, cond: b, .. } => {
                detach(a, out);
                detach(b, out);
            }
            Node::Call { callee, args, .. } => {
                detach(callee, out);
                args.iter_mut().for_each(|arg| detach(arg, out));
            }
            Node::Array(items) | Node::Sexp { fields: items, .. } => {
                items.iter_mut().for_each(|item| detach(item, out));
            }
            Node::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                detach(cond, out);
                detach(then_branch, out);
                detach(else_branch, out);
            }
            Node::Case(case) => {
                detach(&mut case.scrutinee, out);
                for (_, body) in &mut case.branches {
                    detach(body, out);
                }
            }
        }
    }
}

fn detach(node: &mut Node, out: &mut Vec<Node>) {
    let leaf = matches!(
        node,
        Node::Const(_) | Node::Str(_) | Node::Name { .. } | Node::NameRef { .. } | Node::Fun(_)
    );
    if !leaf {
        out.push(std::mem::take(node));
    }
}

/// Join nodes into a right-associated sequence
pub fn sequence(nodes: Vec<Node>) -> Node {
    nodes
        .into_iter()
        .rev()
        .reduce(|rest, node| Node::Seq(Box::new(node), Box::new(rest)))
        .unwrap_or_default()
}
