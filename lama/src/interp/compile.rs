//! Syntax tree to node compiler
//!
//! Every block is compiled in two passes: all names it defines are declared
//! first (so sibling functions can refer to each other), then definitions and
//! the trailing expression are lowered against the populated scope.

use super::builtins::BUILTINS;
use super::eval::{STACK_GROW_SIZE, STACK_RED_ZONE};
use super::node::{sequence, CaseNode, Executable, Function, Node};
use super::pattern::{compile_pattern, declare_bindings, Matcher, CONS_TAG};
use super::scope::ScopeStack;
use crate::ast::{Block, CaseBranch, Definition, Expr, Program, Span, Spanned};
use crate::error::{CompileError, Result};
use std::rc::Rc;

/// What a compiled expression must produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// A value
    Val,
    /// An assignable location
    Ref,
}

/// Compile a program; match failures report byte offsets
pub fn compile(program: &Program) -> Result<Executable> {
    Compiler::new(None).program(program)
}

/// Compile a program; match failures report `line:column` within `source`
pub fn compile_with_source(program: &Program, source: &str) -> Result<Executable> {
    Compiler::new(Some(source)).program(program)
}

struct Compiler<'src> {
    scopes: ScopeStack,
    source: Option<&'src str>,
}

impl<'src> Compiler<'src> {
    fn new(source: Option<&'src str>) -> Self {
        Compiler {
            scopes: ScopeStack::new(),
            source,
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    fn program(mut self, program: &Program) -> Result<Executable> {
        let mut builtins = Vec::with_capacity(BUILTINS.len());
        for builtin in BUILTINS.iter() {
            let slot = self.scopes.declare(builtin.name, Span::default())?;
            builtins.push((slot, builtin));
        }

        let body = self.block(&program.body, Sort::Val)?;
        let frame_size = self.scopes.finish();
        tracing::debug!(frame_size, builtins = builtins.len(), "compiled program");

        Ok(Executable {
            body,
            frame_size,
            builtins,
        })
    }

    // ---- blocks and definitions ----

    /// Compile a block in its own flat scope
    fn block(&mut self, block: &Block, sort: Sort) -> Result<Node> {
        self.scopes.push_flat();
        let node = self.block_body(block, sort);
        self.scopes.pop_scope();
        node
    }

    /// Compile a block into the innermost scope
    fn block_body(&mut self, block: &Block, sort: Sort) -> Result<Node> {
        for def in &block.defs {
            self.declare_definition(def)?;
        }

        let mut nodes = Vec::new();
        for def in &block.defs {
            self.definition(def, &mut nodes)?;
        }

        match &block.expr {
            Some(expr) => nodes.push(self.expr(expr, sort)?),
            None if sort == Sort::Ref => {
                return Err(CompileError::not_assignable("block without a result", block.span));
            }
            None => {}
        }

        Ok(sequence(nodes))
    }

    fn declare_definition(&mut self, def: &Spanned<Definition>) -> Result<()> {
        match &def.node {
            Definition::Var(items) => {
                for item in items {
                    let slot = self.scopes.declare(&item.name.node, item.name.span)?;
                    tracing::trace!(name = %item.name.node, slot, "declare var");
                }
            }
            Definition::Fun(fun) => {
                let slot = self.scopes.declare(&fun.name.node, fun.name.span)?;
                tracing::trace!(name = %fun.name.node, slot, "declare fun");
            }
        }
        Ok(())
    }

    fn definition(&mut self, def: &Spanned<Definition>, nodes: &mut Vec<Node>) -> Result<()> {
        match &def.node {
            Definition::Var(items) => {
                for item in items {
                    // uninitialized variables keep the zeroed slot
                    let Some(init) = &item.init else { continue };
                    let slot = self.local_slot(&item.name)?;
                    let value = self.expr(init, Sort::Val)?;
                    nodes.push(Node::Define {
                        slot,
                        value: Box::new(value),
                    });
                }
            }
            Definition::Fun(fun) => {
                let slot = self.local_slot(&fun.name)?;
                let func = self.function(Some(&fun.name.node), &fun.params, &fun.body, def.span)?;
                nodes.push(Node::Define {
                    slot,
                    value: Box::new(Node::Fun(func)),
                });
            }
        }
        Ok(())
    }

    fn local_slot(&self, name: &Spanned<String>) -> Result<usize> {
        self.scopes
            .local(&name.node)
            .ok_or_else(|| CompileError::unbound_identifier(&name.node, name.span))
    }

    /// Compile a function body in a fresh record, parameters first
    fn function(
        &mut self,
        name: Option<&str>,
        params: &[Spanned<String>],
        body: &Block,
        span: Span,
    ) -> Result<Rc<Function>> {
        self.scopes.push_record();
        let compiled = self.function_body(params, body);
        let frame_size = self.scopes.pop_scope();
        let body = compiled?;

        tracing::trace!(
            name = name.unwrap_or("<lambda>"),
            arity = params.len(),
            frame_size,
            "compiled function"
        );
        Ok(Rc::new(Function {
            name: name.map(str::to_string),
            arity: params.len(),
            frame_size,
            body,
            span,
        }))
    }

    fn function_body(&mut self, params: &[Spanned<String>], body: &Block) -> Result<Node> {
        for param in params {
            self.scopes.declare(&param.node, param.span)?;
        }
        self.block(body, Sort::Val)
    }

    // ---- expressions ----

    fn expr(&mut self, expr: &Spanned<Expr>, sort: Sort) -> Result<Node> {
        // Long operator chains nest as deep as they are long
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.expr_inner(expr, sort))
    }

    fn expr_inner(&mut self, expr: &Spanned<Expr>, sort: Sort) -> Result<Node> {
        let span = expr.span;

        match &expr.node {
            Expr::IntLit(n) => {
                self.value_only(sort, "integer literal", span)?;
                Ok(Node::Const(*n))
            }
            Expr::CharLit(c) => {
                self.value_only(sort, "character literal", span)?;
                Ok(Node::Const(i64::from(*c)))
            }
            Expr::BoolLit(b) => {
                self.value_only(sort, "boolean literal", span)?;
                Ok(Node::Const(i64::from(*b)))
            }
            Expr::Skip => {
                self.value_only(sort, "skip", span)?;
                Ok(Node::Const(0))
            }
            Expr::StringLit(bytes) => {
                self.value_only(sort, "string literal", span)?;
                Ok(Node::Str(Rc::from(bytes.as_slice())))
            }

            Expr::Var(name) => {
                let binding = self.scopes.resolve(name, span)?;
                tracing::trace!(name = %name, slot = binding.slot, depth = binding.depth, "resolve");
                Ok(match sort {
                    Sort::Val => Node::Name {
                        slot: binding.slot,
                        depth: binding.depth,
                    },
                    Sort::Ref => Node::NameRef {
                        slot: binding.slot,
                        depth: binding.depth,
                    },
                })
            }

            Expr::Binary { left, op, right } => {
                self.value_only(sort, "operator expression", span)?;
                Ok(Node::Binary {
                    op: *op,
                    lhs: Box::new(self.expr(left, Sort::Val)?),
                    rhs: Box::new(self.expr(right, Sort::Val)?),
                    span,
                })
            }

            Expr::Assign { target, value } => {
                self.value_only(sort, "assignment", span)?;
                Ok(Node::Assign {
                    target: Box::new(self.expr(target, Sort::Ref)?),
                    value: Box::new(self.expr(value, Sort::Val)?),
                    span,
                })
            }

            Expr::Seq(items) => {
                let last = items.len().saturating_sub(1);
                let nodes = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.expr(item, if i == last { sort } else { Sort::Val }))
                    .collect::<Result<Vec<_>>>()?;
                Ok(sequence(nodes))
            }

            Expr::Call { func, args } => {
                self.value_only(sort, "call", span)?;
                Ok(Node::Call {
                    callee: Box::new(self.expr(func, Sort::Val)?),
                    args: self.exprs(args)?,
                    span,
                })
            }

            Expr::DotCall {
                receiver,
                func,
                args,
            } => {
                self.value_only(sort, "call", span)?;
                let binding = self.scopes.resolve(&func.node, func.span)?;
                let callee = Node::Name {
                    slot: binding.slot,
                    depth: binding.depth,
                };
                let mut all_args = vec![self.expr(receiver, Sort::Val)?];
                all_args.extend(self.exprs(args)?);
                Ok(Node::Call {
                    callee: Box::new(callee),
                    args: all_args,
                    span,
                })
            }

            Expr::Subscript { value, index } => {
                let value = Box::new(self.expr(value, Sort::Val)?);
                let index = Box::new(self.expr(index, Sort::Val)?);
                Ok(match sort {
                    Sort::Val => Node::Subscript { value, index, span },
                    Sort::Ref => Node::SubscriptRef { value, index, span },
                })
            }

            Expr::Array(items) => {
                self.value_only(sort, "array literal", span)?;
                Ok(Node::Array(self.exprs(items)?))
            }

            Expr::List(items) => {
                self.value_only(sort, "list literal", span)?;
                let tag: Rc<str> = Rc::from(CONS_TAG);
                let mut list = Node::Const(0);
                for item in self.exprs(items)?.into_iter().rev() {
                    list = Node::Sexp {
                        tag: Rc::clone(&tag),
                        fields: vec![item, list],
                    };
                }
                Ok(list)
            }

            Expr::Sexp { tag, args } => {
                self.value_only(sort, "constructor", span)?;
                Ok(Node::Sexp {
                    tag: Rc::from(tag.as_str()),
                    fields: self.exprs(args)?,
                })
            }

            Expr::Fun { params, body } => {
                self.value_only(sort, "function literal", span)?;
                Ok(Node::Fun(self.function(None, params, body, span)?))
            }

            Expr::Scope(block) => self.block(block, sort),

            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = Box::new(self.expr(cond, Sort::Val)?);
                let then_branch = Box::new(self.block(then_branch, sort)?);
                let else_branch = match else_branch {
                    Some(block) => self.block(block, sort)?,
                    None => {
                        self.value_only(sort, "`if` without `else`", span)?;
                        Node::Const(0)
                    }
                };
                Ok(Node::If {
                    cond,
                    then_branch,
                    else_branch: Box::new(else_branch),
                    span,
                })
            }

            Expr::While { cond, body } => {
                self.value_only(sort, "loop", span)?;
                Ok(Node::While {
                    cond: Box::new(self.expr(cond, Sort::Val)?),
                    body: Box::new(self.block(body, Sort::Val)?),
                    span,
                })
            }

            Expr::Do { body, cond } => {
                self.value_only(sort, "loop", span)?;
                Ok(Node::DoWhile {
                    body: Box::new(self.block(body, Sort::Val)?),
                    cond: Box::new(self.expr(cond, Sort::Val)?),
                    span,
                })
            }

            Expr::For {
                init,
                cond,
                post,
                body,
            } => {
                self.value_only(sort, "loop", span)?;
                self.scopes.push_flat();
                let node = self.for_loop(init, cond, post, body, span);
                self.scopes.pop_scope();
                node
            }

            Expr::Case {
                scrutinee,
                branches,
            } => self.case(scrutinee, branches, sort, span),
        }
    }

    fn exprs(&mut self, exprs: &[Spanned<Expr>]) -> Result<Vec<Node>> {
        exprs.iter().map(|e| self.expr(e, Sort::Val)).collect()
    }

    /// Reject constructs that have no reference form
    fn value_only(&self, sort: Sort, what: &str, span: Span) -> Result<()> {
        match sort {
            Sort::Val => Ok(()),
            Sort::Ref => Err(CompileError::not_assignable(what, span)),
        }
    }

    /// `init; while cond do body; post od`, with `init`'s names in scope throughout
    fn for_loop(
        &mut self,
        init: &Block,
        cond: &Spanned<Expr>,
        post: &Spanned<Expr>,
        body: &Block,
        span: Span,
    ) -> Result<Node> {
        let init = self.block_body(init, Sort::Val)?;
        let cond = self.expr(cond, Sort::Val)?;
        let body = self.block(body, Sort::Val)?;
        let post = self.expr(post, Sort::Val)?;

        let looped = Node::While {
            cond: Box::new(cond),
            body: Box::new(sequence(vec![body, post])),
            span,
        };
        Ok(sequence(vec![init, looped]))
    }

    fn case(
        &mut self,
        scrutinee: &Spanned<Expr>,
        branches: &[CaseBranch],
        sort: Sort,
        span: Span,
    ) -> Result<Node> {
        let scrutinee = self.expr(scrutinee, Sort::Val)?;

        let mut compiled = Vec::with_capacity(branches.len());
        for branch in branches {
            self.scopes.push_flat();
            let result = self.case_branch(branch, sort);
            self.scopes.pop_scope();
            compiled.push(result?);
        }

        Ok(Node::Case(Box::new(CaseNode {
            scrutinee,
            branches: compiled,
            location: Rc::from(self.location(span)),
            span,
        })))
    }

    fn case_branch(&mut self, branch: &CaseBranch, sort: Sort) -> Result<(Matcher, Node)> {
        declare_bindings(&branch.pattern, &mut self.scopes)?;
        let matcher = compile_pattern(&branch.pattern, &self.scopes)?;
        let body = self.block(&branch.body, sort)?;
        Ok((matcher, body))
    }

    /// Position text for runtime diagnostics
    fn location(&self, span: Span) -> String {
        match self.source {
            Some(source) => {
                let (line, column) = span.line_col(source);
                format!("{line}:{column}")
            }
            None => span.to_string(),
        }
    }
}
