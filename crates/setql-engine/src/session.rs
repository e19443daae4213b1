//! Session management.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::query::{Binder, CardinalityEstimator, Emitter, ExprNode, ResolvedSignature, resolve};
use setql_common::types::{LogicalType, Value};
use setql_common::utils::error::Result;
use setql_core::execution::{DataSource, Executor, Fragment, FragmentBuilder, PlanBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// A shared flag that aborts compilation between node visits.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A session for compiling and evaluating expressions.
///
/// Sessions share the engine's frozen catalog and compile one tree at a
/// time. Each session has its own cancellation token.
pub struct Session {
    catalog: Arc<Catalog>,
    estimator: Arc<CardinalityEstimator>,
    executor: Executor,
    config: Config,
    cancel: CancellationToken,
}

impl Session {
    /// Creates a new session.
    pub(crate) fn new(
        catalog: Arc<Catalog>,
        estimator: Arc<CardinalityEstimator>,
        executor: Executor,
        config: Config,
    ) -> Self {
        Self {
            catalog,
            estimator,
            executor,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a handle that cancels this session's work.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves one call without building a tree.
    ///
    /// # Errors
    ///
    /// Returns the resolution error.
    pub fn resolve(&self, name: &str, arg_types: &[LogicalType]) -> Result<ResolvedSignature> {
        Ok(resolve(&self.catalog, name, arg_types)?)
    }

    /// Annotates every node of `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the session was cancelled.
    pub fn bind(&self, root: &mut ExprNode) -> Result<()> {
        Binder::new(&self.catalog, &self.estimator)
            .with_max_depth(self.config.max_depth)
            .with_cancellation(&self.cancel)
            .bind(root)
    }

    /// Lowers a bound tree through a target's builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is unbound, the target cannot express
    /// it, or the session was cancelled.
    pub fn emit<B: FragmentBuilder>(&self, root: &ExprNode, builder: &mut B) -> Result<B::Fragment> {
        let emitter = Emitter::new().with_cancellation(&self.cancel);
        if self.config.constant_folding {
            emitter.with_folding(&self.executor).emit(root, builder)
        } else {
            emitter.emit(root, builder)
        }
    }

    /// Binds `root` if needed and lowers it into a reference fragment.
    ///
    /// # Errors
    ///
    /// Returns any binding or lowering error.
    pub fn compile(&self, root: &mut ExprNode) -> Result<Fragment> {
        if !root.is_resolved() {
            self.bind(root)?;
        }
        let fragment = self.emit(root, &mut PlanBuilder::new())?;
        debug!(nodes = fragment.node_count(), "compiled fragment");
        Ok(fragment)
    }

    /// Compiles `root` and evaluates it against `source`.
    ///
    /// # Errors
    ///
    /// Returns any compile-time error, or the evaluation error.
    pub fn evaluate(&self, root: &mut ExprNode, source: &dyn DataSource) -> Result<Vec<Value>> {
        let fragment = self.compile(root)?;
        Ok(self.executor.execute(&fragment, source)?)
    }
}
