//! Expression AST nodes

use super::{Block, Definition, Pattern, Spanned};
use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// String literal (raw bytes, quotes already stripped)
    StringLit(Vec<u8>),
    /// Character literal, evaluates to its code
    CharLit(u8),
    /// `true` / `false`
    BoolLit(bool),
    /// `skip`
    #[default]
    Skip,

    /// Variable reference
    Var(String),

    /// Binary operation
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    /// Assignment: target := value
    Assign {
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },

    /// Sequence: e1; e2; ...; en
    Seq(Vec<Spanned<Expr>>),

    /// Function call: func(args)
    Call {
        func: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },

    /// Dotted call: receiver.func(args), sugar for func(receiver, args)
    DotCall {
        receiver: Box<Spanned<Expr>>,
        func: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },

    /// Subscript: value[index]
    Subscript {
        value: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },

    /// Array literal: [e1, e2, ...]
    Array(Vec<Spanned<Expr>>),

    /// List literal: {e1, e2, ...}
    List(Vec<Spanned<Expr>>),

    /// Tagged tuple: Tag (e1, e2, ...)
    Sexp {
        tag: String,
        args: Vec<Spanned<Expr>>,
    },

    /// Anonymous function: fun (params) { body }
    Fun {
        params: Vec<Spanned<String>>,
        body: Block,
    },

    /// Parenthesized scope: ( definitions; expr )
    Scope(Block),

    /// if cond then ... else ... fi (elif chains are nested in else)
    If {
        cond: Box<Spanned<Expr>>,
        then_branch: Block,
        else_branch: Option<Block>,
    },

    /// while cond do body od
    While {
        cond: Box<Spanned<Expr>>,
        body: Block,
    },

    /// do body while cond od
    Do {
        body: Block,
        cond: Box<Spanned<Expr>>,
    },

    /// for init, cond, post do body od
    For {
        init: Block,
        cond: Box<Spanned<Expr>>,
        post: Box<Spanned<Expr>>,
        body: Block,
    },

    /// case scrutinee of p1 -> b1 | ... esac
    Case {
        scrutinee: Box<Spanned<Expr>>,
        branches: Vec<CaseBranch>,
    },
}

// Long operator chains nest thousands of levels deep; tear them down
// with a worklist instead of the recursive drop glue.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.detach_children(&mut pending);
        }
    }
}

impl Expr {
    fn is_leaf(&self) -> bool {
        matches!(
            self,
            Expr::IntLit(_)
                | Expr::StringLit(_)
                | Expr::CharLit(_)
                | Expr::BoolLit(_)
                | Expr::Skip
                | Expr::Var(_)
        )
    }

    /// Move every non-leaf subexpression into `out`
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            Expr::IntLit(_)
            | Expr::StringLit(_)
            | Expr::CharLit(_)
            | Expr::BoolLit(_)
            | Expr::Skip
            | Expr::Var(_) => {}
            Expr::Binary { left, right, .. }
            | Expr::Assign {
                target: left,
                value: right,
            }
            | Expr::Subscript {
                value: left,
                index: right,
            } => {
                detach(left, out);
                detach(right, out);
            }
            Expr::Seq(items) | Expr::Array(items) | Expr::List(items) | Expr::Sexp { args: items, .. } => {
                items.iter_mut().for_each(|item| detach(item, out));
            }
            Expr::Call { func: head, args }
            | Expr::DotCall {
                receiver: head,
                args,
                ..
            } => {
                detach(head, out);
                args.iter_mut().for_each(|arg| detach(arg, out));
            }
            Expr::Fun { body, .. } | Expr::Scope(body) => detach_block(body, out),
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                detach(cond, out);
                detach_block(then_branch, out);
                if let Some(else_branch) = else_branch {
                    detach_block(else_branch, out);
                }
            }
            Expr::While { cond, body } | Expr::Do { body, cond } => {
                detach(cond, out);
                detach_block(body, out);
            }
            Expr::For {
                init,
                cond,
                post,
                body,
            } => {
                detach_block(init, out);
                detach(cond, out);
                detach(post, out);
                detach_block(body, out);
            }
            Expr::Case { scrutinee, branches } => {
                detach(scrutinee, out);
                for branch in branches {
                    detach_block(&mut branch.body, out);
                }
            }
        }
    }
}

fn detach(slot: &mut Spanned<Expr>, out: &mut Vec<Expr>) {
    if !slot.node.is_leaf() {
        out.push(std::mem::take(&mut slot.node));
    }
}

fn detach_block(block: &mut Block, out: &mut Vec<Expr>) {
    for def in &mut block.defs {
        match &mut def.node {
            Definition::Var(items) => {
                for init in items.iter_mut().filter_map(|item| item.init.as_mut()) {
                    detach(init, out);
                }
            }
            Definition::Fun(fun) => detach_block(&mut fun.body, out),
        }
    }
    if let Some(expr) = &mut block.expr {
        detach(expr, out);
    }
}

/// A single branch of a case expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseBranch {
    pub pattern: Spanned<Pattern>,
    pub body: Block,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical
    And,
    Or,

    /// List constructor `:`
    Cons,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
            BinOp::And => write!(f, "&&"),
            BinOp::Or => write!(f, "!!"),
            BinOp::Cons => write!(f, ":"),
        }
    }
}
