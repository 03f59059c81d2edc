use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::iter::FromIterator;

use super::{Result, RuntimeError, Value};

/// The variables of a single function call.
///
/// klox has no nested functions and no block scopes, so an environment is a
/// flat map with no enclosing environment: a callee sees its parameters and
/// its own `var`s and nothing of its caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    /// Creates a new empty environment.
    #[must_use]
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
        }
    }

    /// Binds `name` to `value`, replacing any earlier binding.
    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    /// Returns `RuntimeError::UndefinedVariable(name)` if `name` is unbound.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_owned()))
    }

    /// Rebinds an existing `name` and returns the new value.
    ///
    /// # Errors
    /// Returns `RuntimeError::UndefinedVariable(name)` if `name` was never
    /// defined; assignment does not create variables.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<Value> {
        match self.values.entry(name.to_owned()) {
            Entry::Vacant(_) => Err(RuntimeError::UndefinedVariable(name.to_owned())),
            Entry::Occupied(mut e) => {
                e.insert(value);
                Ok(value)
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Constructs an environment from `(name, value)` pairs, e.g. a callee's
/// parameters zipped with its arguments.
impl FromIterator<(String, Value)> for Environment {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (String, Value)>,
    {
        let mut values = HashMap::new();
        values.extend(iter);

        Environment { values }
    }
}
