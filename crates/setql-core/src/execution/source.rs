//! Data sources for input references.

use hashbrown::HashMap;
use parking_lot::Mutex;
use setql_common::types::Value;
use setql_common::utils::error::ExecutionError;
use std::sync::Arc;

/// Supplies the contents of named inputs at evaluation time.
pub trait DataSource: Send + Sync {
    /// Fetches the current contents of the input `name`.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::UnboundInput` if nothing is bound under
    /// `name`.
    fn fetch(&self, name: &str) -> Result<Vec<Value>, ExecutionError>;
}

type Generator = Arc<dyn Fn(u64) -> Vec<Value> + Send + Sync>;

enum Binding {
    Fixed(Vec<Value>),
    Generated(Generator),
}

/// An in-memory data source that counts fetches.
///
/// Generated bindings receive the 1-based fetch number, which lets tests
/// model volatile inputs whose every read is observable.
#[derive(Default)]
pub struct InMemorySource {
    bindings: HashMap<String, Binding>,
    fetches: Mutex<HashMap<String, u64>>,
}

impl InMemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a fixed set.
    #[must_use]
    pub fn with_values(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.bindings.insert(name.into(), Binding::Fixed(values));
        self
    }

    /// Binds `name` to a generator called on every fetch.
    #[must_use]
    pub fn with_generator<F>(mut self, name: impl Into<String>, generator: F) -> Self
    where
        F: Fn(u64) -> Vec<Value> + Send + Sync + 'static,
    {
        self.bindings
            .insert(name.into(), Binding::Generated(Arc::new(generator)));
        self
    }

    /// Returns how often `name` has been fetched.
    #[must_use]
    pub fn fetch_count(&self, name: &str) -> u64 {
        self.fetches.lock().get(name).copied().unwrap_or(0)
    }

    /// Returns the bound input names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for InMemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySource")
            .field("inputs", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl DataSource for InMemorySource {
    fn fetch(&self, name: &str) -> Result<Vec<Value>, ExecutionError> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| ExecutionError::UnboundInput(name.to_string()))?;
        let count = {
            let mut fetches = self.fetches.lock();
            let count = fetches.entry(name.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        Ok(match binding {
            Binding::Fixed(values) => values.clone(),
            Binding::Generated(generator) => generator(count),
        })
    }
}

/// A source with nothing bound. Used for compile-time evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySource;

impl DataSource for EmptySource {
    fn fetch(&self, name: &str) -> Result<Vec<Value>, ExecutionError> {
        Err(ExecutionError::UnboundInput(name.to_string()))
    }
}
