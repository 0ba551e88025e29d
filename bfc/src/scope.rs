//! Lexical scope chain for variable lookup during lowering.
//!
//! A function body is a stack of scopes: one pushed per `{ ... }` block, and
//! one pushed around each if/else arm and loop body regardless of whether
//! that body is itself a block. Declarations land in the innermost scope,
//! lookups walk innermost to outermost, matching ordinary block scoping.

use std::collections::HashMap;

use crate::error::SemanticError;
use crate::var::Variable;

pub struct ScopeChain<'a> {
    scopes: Vec<HashMap<String, Variable<'a>>>,
}

impl<'a> ScopeChain<'a> {
    pub fn new() -> Self {
        ScopeChain { scopes: vec![HashMap::new()] }
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
        assert!(!self.scopes.is_empty(), "popped the outermost scope");
    }

    /// Declares `name` in the innermost scope. Fails if `name` is already
    /// declared in that same scope (shadowing an outer scope is allowed).
    pub fn declare(&mut self, name: &str, var: Variable<'a>) -> Result<(), SemanticError> {
        let innermost = self.scopes.last_mut().expect("scope chain is never empty");
        if innermost.contains_key(name) {
            return Err(SemanticError::Redeclaration(name.to_string()));
        }
        innermost.insert(name.to_string(), var);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Variable<'a>, SemanticError> {
        for scope in self.scopes.iter().rev() {
            if let Some(var) = scope.get(name) {
                return Ok(var);
            }
        }
        Err(SemanticError::UndeclaredVariable(name.to_string()))
    }
}

impl Default for ScopeChain<'_> {
    fn default() -> Self {
        ScopeChain::new()
    }
}
