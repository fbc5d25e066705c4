//! Argument objects handed to builtin functions.
//!
//! The host binds call arguments by name into a record. Builtins pull the
//! fields they need out of it; every read marks the field as used so the host
//! can report arguments nobody consumed.

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, Value>,
    used: HashSet<String>,
}

impl Arguments {
    pub fn new(values: IndexMap<String, Value>) -> Self {
        Arguments {
            values,
            used: HashSet::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds an argument object from a record value.
    pub fn from_record(value: Value) -> RuntimeResult<Self> {
        match value {
            Value::Record(fields) => Ok(Self::new(fields)),
            other => Err(RuntimeError::TypeError {
                expected: "record".to_string(),
                actual: other.type_name().to_string(),
                operation: "bind arguments".to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Reads an argument without marking it used.
    pub fn peek(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get(&mut self, name: &str) -> Option<&Value> {
        self.used.insert(name.to_string());
        self.values.get(name)
    }

    pub fn get_required(&mut self, name: &str) -> RuntimeResult<&Value> {
        self.get(name).ok_or_else(|| RuntimeError::MissingArgument {
            name: name.to_string(),
        })
    }

    pub fn get_string(&mut self, name: &str) -> RuntimeResult<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Self::kind_mismatch(name, "string", other)),
        }
    }

    pub fn get_required_string(&mut self, name: &str) -> RuntimeResult<String> {
        match self.get_required(name)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(Self::kind_mismatch(name, "string", other)),
        }
    }

    /// Fails with every provided argument that was never read, sorted by name.
    pub fn check_unused(&self) -> RuntimeResult<()> {
        let mut unused: Vec<String> = self
            .values
            .keys()
            .filter(|k| !self.used.contains(*k))
            .cloned()
            .collect();
        if unused.is_empty() {
            return Ok(());
        }
        unused.sort();
        Err(RuntimeError::UnusedArguments { names: unused })
    }

    fn kind_mismatch(name: &str, expected: &str, actual: &Value) -> RuntimeError {
        RuntimeError::TypeError {
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
            operation: format!("argument {}", name),
        }
    }
}
