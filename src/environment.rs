//! The lexical environment: a chain of scopes, each a name-to-value table
//! with an optional parent.
//!
//! Multiple `Value`s (closures, classes, instances) may share the same
//! environment, so ownership is `Rc`-shared rather than exclusive;
//! bindings live behind a `RefCell` so `define`/`assign` can mutate a
//! scope that other `Rc` holders are simultaneously reading.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::EvaError;
use crate::value::Value;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new environment that extends `parent`.
    pub fn extend(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Inserts or overwrites `name` in the innermost bindings. Never fails.
    pub fn define(&self, name: impl Into<String>, value: Value) -> Value {
        self.bindings.borrow_mut().insert(name.into(), value.clone());
        value
    }

    /// Searches this environment, then recurses into `parent`.
    pub fn lookup(&self, name: &str) -> Result<Value, EvaError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(EvaError::UndefinedName(name.to_string())),
        }
    }

    /// Rebinds `name` in the nearest environment in the chain that already
    /// defines it. Never creates a new binding; fails if `name` is not
    /// already bound anywhere in the chain.
    pub fn assign(&self, name: &str, value: Value) -> Result<Value, EvaError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value.clone());
            return Ok(value);
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(EvaError::UndefinedName(name.to_string())),
        }
    }
}

/// Populates and returns a fresh root environment with the predefined
/// bindings every program starts with.
///
/// These names may be shadowed in inner scopes, and reassigned in the
/// root env itself like any other binding.
pub fn global() -> Rc<Environment> {
    let env = Environment::new();
    env.define("VERSION", Value::str("0.1"));
    env.define("null", Value::Null);
    env.define("true", Value::Bool(true));
    env.define("false", Value::Bool(false));
    env
}
