//! Compile-time scope stack
//!
//! Maps names to frame slots. Record scopes (the root and every function
//! body) get a fresh activation record at runtime; flat scopes (blocks,
//! case branches, loop bodies) allocate into the nearest enclosing record,
//! so entering them costs nothing at runtime.

use crate::ast::Span;
use crate::error::{CompileError, Result};
use std::collections::HashMap;

/// Whether a scope owns an activation record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Record,
    Flat,
}

/// Resolved location of a name relative to the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub slot: usize,
    /// Number of record hops from the current frame
    pub depth: usize,
}

#[derive(Debug)]
struct Scope {
    names: HashMap<String, usize>,
    kind: ScopeKind,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Scope {
            names: HashMap::new(),
            kind,
        }
    }
}

/// Stack of lexical scopes, index 0 is the root record
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    /// Next free slot of each open record, innermost last
    records: Vec<usize>,
}

impl ScopeStack {
    /// Create a new scope stack with a root record
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Scope::new(ScopeKind::Record)],
            records: vec![0],
        }
    }

    /// Open a scope that gets its own activation record
    pub fn push_record(&mut self) {
        self.scopes.push(Scope::new(ScopeKind::Record));
        self.records.push(0);
    }

    /// Open a scope that shares the enclosing record
    pub fn push_flat(&mut self) {
        self.scopes.push(Scope::new(ScopeKind::Flat));
    }

    /// Close the innermost scope, returning the size of the record it
    /// allocated into. Panics if trying to pop the root scope
    pub fn pop_scope(&mut self) -> usize {
        if self.scopes.len() <= 1 {
            panic!("Cannot pop root scope");
        }
        let size = self.record_size();
        if let Some(Scope {
            kind: ScopeKind::Record,
            ..
        }) = self.scopes.pop()
        {
            self.records.pop();
        }
        size
    }

    /// Slots allocated so far in the innermost record
    pub fn record_size(&self) -> usize {
        self.records.last().copied().unwrap_or(0)
    }

    /// Introduce `name` in the innermost scope and give it a fresh slot
    pub fn declare(&mut self, name: &str, span: Span) -> Result<usize> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompileError::parser("no open scope", span))?;
        if scope.names.contains_key(name) {
            return Err(CompileError::duplicate_binding(name, span));
        }

        let counter = self
            .records
            .last_mut()
            .ok_or_else(|| CompileError::parser("no open record", span))?;
        let slot = *counter;
        *counter += 1;
        scope.names.insert(name.to_string(), slot);
        Ok(slot)
    }

    /// Slot of `name` if it was declared in the innermost scope
    pub fn local(&self, name: &str) -> Option<usize> {
        self.scopes.last()?.names.get(name).copied()
    }

    /// Look up a name, searching from current scope to root
    pub fn resolve(&self, name: &str, span: Span) -> Result<Binding> {
        let mut depth = 0;
        for scope in self.scopes.iter().rev() {
            if let Some(&slot) = scope.names.get(name) {
                return Ok(Binding { slot, depth });
            }
            if scope.kind == ScopeKind::Record {
                depth += 1;
            }
        }
        Err(CompileError::unbound_identifier(name, span))
    }

    /// Size of the root record once compilation is done
    pub fn finish(self) -> usize {
        self.records.first().copied().unwrap_or(0)
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
