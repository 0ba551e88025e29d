//! The lowering compiler: two recursive-descent visitors (`expr`, `stmt`)
//! that walk the AST and drive the [`crate::generator::Generator`], via
//! ordinary exhaustive pattern matching over the AST's tagged variants.

pub mod expr;
pub mod stmt;

use std::collections::HashMap;

use crate::ast::Function;
use crate::error::{EncodingError, SemanticError};

/// Per-compilation context threaded through both visitors: the function
/// table (for call resolution) and the active call chain (for recursion
/// detection). Shared mutable state that isn't tied to the generator's
/// tape/emitter, so it lives alongside the generator rather than inside it.
pub struct LowerCtx<'p> {
    functions: HashMap<String, &'p Function>,
    call_stack: Vec<String>,
}

impl<'p> LowerCtx<'p> {
    pub fn new(functions: HashMap<String, &'p Function>) -> Self {
        LowerCtx {
            functions,
            call_stack: Vec::new(),
        }
    }

    fn resolve(&self, name: &str) -> Result<&'p Function, SemanticError> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| SemanticError::UnknownFunction(name.to_string()))
    }

    /// Pushes `name` onto the call stack, failing if it would create a
    /// cycle (direct or indirect recursion is unsupported).
    fn enter_call(&mut self, name: &str) -> Result<(), SemanticError> {
        if let Some(pos) = self.call_stack.iter().position(|f| f == name) {
            let mut chain: Vec<String> = self.call_stack[pos..].to_vec();
            chain.push(name.to_string());
            return Err(SemanticError::Recursion(chain));
        }
        self.call_stack.push(name.to_string());
        Ok(())
    }

    fn exit_call(&mut self) {
        self.call_stack.pop();
    }
}

/// Rejects identifiers that contain a Brainfuck operator character, which
/// would otherwise pollute the annotated rendering (and, for a maliciously
/// crafted name, could even inject spurious operators into a naive
/// annotated-to-minimal post-process). Generator-internal scratch names are
/// exempt since the compiler itself controls their shape.
pub(crate) fn validate_name(name: &str) -> Result<(), EncodingError> {
    if name.chars().any(|c| "><+-.,[]".contains(c)) {
        return Err(EncodingError::NameContainsOperator(name.to_string()));
    }
    Ok(())
}
