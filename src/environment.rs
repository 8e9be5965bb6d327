use std::collections::{hash_map::Entry, HashMap};

use log::trace;

use crate::{error::RuntimeError, syntax::token::Token, value::Value};

/// Lexical scopes as a stack of frames. The first frame is the global scope
/// and is never popped; the last frame is the innermost block.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, Value>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
        trace!("entered scope, depth {}", self.depth());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        trace!("left scope, depth {}", self.depth());
    }

    /// Number of frames, counting the global one.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the innermost scope, replacing any existing binding there.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name.lexeme))
            .cloned()
            .ok_or_else(|| Self::undefined(name))
    }

    /// Rebinds the nearest existing `name`. Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        for scope in self.scopes.iter_mut().rev() {
            if let Entry::Occupied(mut e) = scope.entry(name.lexeme.clone()) {
                e.insert(value);
                return Ok(());
            }
        }

        Err(Self::undefined(name))
    }

    fn undefined(name: &Token) -> RuntimeError {
        RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
    }
}
