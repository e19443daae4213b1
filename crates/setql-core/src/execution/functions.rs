//! Implementations of engine-bound functions.

use hashbrown::HashMap;
use setql_common::types::Value;
use setql_common::utils::error::ExecutionError;
use std::sync::Arc;

/// One application of an engine function.
///
/// Receives one set per argument: a single element (or none, for an empty
/// optional argument) for element-wise parameters, the whole set for
/// `SET OF` parameters. Returns the result set of this application.
pub type FunctionImpl =
    Arc<dyn Fn(&[Vec<Value>]) -> Result<Vec<Value>, ExecutionError> + Send + Sync>;

/// Registry of engine function implementations keyed by name.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionImpl>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Vec<Value>]) -> Result<Vec<Value>, ExecutionError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Looks up a function by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FunctionImpl> {
        self.functions.get(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_call() {
        let mut registry = FunctionRegistry::new();
        registry.register("count", |args: &[Vec<Value>]| {
            let n = i64::try_from(args[0].len()).unwrap_or(i64::MAX);
            Ok(vec![Value::Int64(n)])
        });

        assert!(registry.contains("count"));
        assert_eq!(registry.len(), 1);
        let count = registry.get("count").unwrap();
        let result = count(&[vec![Value::Int64(1), Value::Int64(2)]]).unwrap();
        assert_eq!(result, vec![Value::Int64(2)]);
    }
}
