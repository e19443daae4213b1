//! The Setql engine.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::query::{CardinalityEstimator, ExprNode};
use crate::session::Session;
use rayon::prelude::*;
use setql_common::utils::error::Result;
use setql_core::execution::{Executor, Fragment, FunctionRegistry};
use std::sync::Arc;
use tracing::debug;

/// Holds the frozen catalog and hands out sessions.
///
/// The engine is `Send + Sync`; sessions created from it share the catalog
/// without copying.
pub struct Engine {
    /// The frozen operator catalog.
    catalog: Arc<Catalog>,
    /// Row-count statistics.
    estimator: Arc<CardinalityEstimator>,
    /// Reference executor, also used for constant folding.
    executor: Executor,
    /// Engine configuration.
    config: Config,
}

impl Engine {
    /// Creates an engine over `catalog`.
    #[must_use]
    pub fn new(catalog: Catalog, config: Config) -> Self {
        Self {
            catalog: Arc::new(catalog),
            estimator: Arc::new(CardinalityEstimator::from_config(&config)),
            executor: Executor::default(),
            config,
        }
    }

    /// Creates an engine over the built-in operator catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in declaration is rejected.
    pub fn builtin(config: Config) -> Result<Self> {
        Ok(Self::new(Catalog::builtin()?, config))
    }

    /// Sets the implementations of engine-bound functions.
    #[must_use]
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.executor = Executor::new(Arc::new(functions));
        self
    }

    /// Replaces the row-count estimator.
    #[must_use]
    pub fn with_estimator(mut self, estimator: CardinalityEstimator) -> Self {
        self.estimator = Arc::new(estimator);
        self
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the reference executor.
    #[must_use]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Creates a new session.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.estimator),
            self.executor.clone(),
            self.config.clone(),
        )
    }

    /// Compiles independent trees in parallel.
    ///
    /// Each tree is compiled in its own session; results are returned in
    /// input order.
    pub fn compile_batch(&self, trees: &mut [ExprNode]) -> Vec<Result<Fragment>> {
        debug!(trees = trees.len(), "compiling batch");
        trees
            .par_iter_mut()
            .map(|tree| self.session().compile(tree))
            .collect()
    }
}
