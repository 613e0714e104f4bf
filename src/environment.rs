// ABOUTME: Environment module for managing variable bindings and lexical scopes

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Unconditionally binds `name` in this scope. Redefining an existing
    /// name in the same scope silently overwrites it (spec.md §4.3).
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up `name` in this scope and then recursively in parent scopes.
    /// Raises "Undefined variable '<name>'." carrying `name_token` for line
    /// reporting if the name is bound nowhere in the chain.
    pub fn get(&self, name_token: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name_token.lexeme) {
            return Ok(value.clone());
        }

        if let Some(parent) = &self.parent {
            return parent.get(name_token);
        }

        Err(RuntimeError::undefined_variable(name_token))
    }

    /// Rebinds `name` in the nearest scope (this one, or a parent) where it
    /// is already bound. Never creates a new binding; raises the same
    /// undefined-variable error as `get` otherwise.
    pub fn assign(&self, name_token: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name_token.lexeme) {
            self.bindings
                .borrow_mut()
                .insert(name_token.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(parent) = &self.parent {
            return parent.assign(name_token, value);
        }

        Err(RuntimeError::undefined_variable(name_token))
    }
}
