//! Row-count estimation for expression trees.
//!
//! Estimates the number of elements each node produces, for downstream
//! planners. Static cardinality bounds the estimate: an `Empty` node is 0,
//! a `One` node is 1.

use crate::catalog::{OperatorImpl, OperatorSignature};
use crate::config::Config;
use crate::query::expr::{ExprKind, ExprNode, InputRef};
use hashbrown::HashMap;
use setql_common::types::{Cardinality, SetMode};

/// Statistics for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct InputStats {
    /// Number of elements.
    pub row_count: u64,
    /// Number of distinct elements, if known.
    pub distinct_count: Option<u64>,
}

impl InputStats {
    /// Creates input statistics.
    #[must_use]
    pub fn new(row_count: u64) -> Self {
        Self {
            row_count,
            distinct_count: None,
        }
    }

    /// Sets the distinct count.
    #[must_use]
    pub fn with_distinct(mut self, distinct_count: u64) -> Self {
        self.distinct_count = Some(distinct_count);
        self
    }
}

/// Cardinality estimator.
#[derive(Debug, Clone)]
pub struct CardinalityEstimator {
    /// Statistics for each input.
    input_stats: HashMap<String, InputStats>,
    /// Default row count for inputs without statistics.
    default_row_count: u64,
    /// Fraction of rows assumed to survive deduplication.
    distinct_ratio: f64,
}

impl CardinalityEstimator {
    /// Creates a new cardinality estimator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Creates an estimator using the configured defaults.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            input_stats: HashMap::new(),
            default_row_count: config.default_set_size,
            distinct_ratio: config.distinct_ratio,
        }
    }

    /// Adds statistics for an input.
    pub fn add_input_stats(&mut self, name: &str, stats: InputStats) {
        self.input_stats.insert(name.to_string(), stats);
    }

    /// Estimates a whole tree.
    ///
    /// Bound nodes report their recorded estimate. Unbound calls fall back
    /// to the default row count.
    #[must_use]
    pub fn estimate(&self, node: &ExprNode) -> f64 {
        if let Some(info) = node.info() {
            return info.estimated_rows;
        }
        match node.kind() {
            ExprKind::Literal(_) => 1.0,
            ExprKind::Set { values, .. } => values.len() as f64,
            ExprKind::Input(input) => self.estimate_input(input),
            ExprKind::Call { .. } => self.default_row_count as f64,
        }
    }

    /// Estimates an input from its statistics or the default size.
    #[must_use]
    pub fn estimate_input(&self, input: &InputRef) -> f64 {
        let rows = self
            .input_stats
            .get(&input.name)
            .map_or(self.default_row_count, |stats| stats.row_count);
        bound(rows as f64, input.cardinality)
    }

    /// Estimates a call from the estimates of its arguments.
    #[must_use]
    pub fn estimate_call(
        &self,
        signature: &OperatorSignature,
        args: &[ExprNode],
        arg_rows: &[f64],
        cardinality: Cardinality,
    ) -> f64 {
        let arg = |index: usize| arg_rows.get(index).copied().unwrap_or(1.0);
        let rows = match &signature.implementation {
            OperatorImpl::Exists => 1.0,
            OperatorImpl::Distinct => self.estimate_distinct(args.first(), arg(0)),
            OperatorImpl::Union => arg_rows.iter().sum(),
            OperatorImpl::Membership { .. } => arg(0),
            OperatorImpl::Coalesce => arg(0).max(arg(1)),
            OperatorImpl::Conditional => arg(0).max(arg(2)),
            OperatorImpl::EngineFunction { .. } => {
                let applications: f64 = arg_rows
                    .iter()
                    .enumerate()
                    .map(|(index, rows)| match signature.parameter_for(index).map(|p| p.mode) {
                        Some(SetMode::Singleton) => *rows,
                        Some(SetMode::Optional) => rows.max(1.0),
                        Some(SetMode::SetOf) | None => 1.0,
                    })
                    .product();
                match signature.returns.mode {
                    SetMode::Singleton | SetMode::Optional => applications,
                    SetMode::SetOf => applications * self.default_row_count as f64,
                }
            }
        };
        bound(rows, cardinality)
    }

    /// Estimates distinct cardinality.
    fn estimate_distinct(&self, input: Option<&ExprNode>, rows: f64) -> f64 {
        if let Some(ExprKind::Input(input)) = input.map(ExprNode::kind) {
            if let Some(distinct) = self
                .input_stats
                .get(&input.name)
                .and_then(|stats| stats.distinct_count)
            {
                return (distinct as f64).min(rows);
            }
        }
        if rows <= 0.0 {
            return 0.0;
        }
        (rows * self.distinct_ratio).max(1.0)
    }
}

impl Default for CardinalityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps an estimate into the range its static cardinality allows.
fn bound(rows: f64, cardinality: Cardinality) -> f64 {
    match cardinality {
        Cardinality::Empty => 0.0,
        Cardinality::One => 1.0,
        Cardinality::AtMostOne => rows.min(1.0),
        Cardinality::Many => rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use setql_common::types::LogicalType;

    fn input(name: &str) -> ExprNode {
        ExprNode::input(InputRef::new(name, LogicalType::Int64, Cardinality::Many))
    }

    #[test]
    fn test_input_estimates() {
        let mut estimator = CardinalityEstimator::new();
        estimator.add_input_stats("users", InputStats::new(250));

        assert!((estimator.estimate(&input("users")) - 250.0).abs() < f64::EPSILON);
        assert!((estimator.estimate(&input("other")) - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distinct_uses_stats() {
        let catalog = Catalog::builtin().unwrap();
        let distinct = &catalog.lookup("DISTINCT")[0];
        let mut estimator = CardinalityEstimator::new();
        estimator.add_input_stats("tags", InputStats::new(400).with_distinct(12));

        let with_stats = estimator.estimate_call(distinct, &[input("tags")], &[400.0], Cardinality::Many);
        assert!((with_stats - 12.0).abs() < f64::EPSILON);

        let without = estimator.estimate_call(distinct, &[input("x")], &[400.0], Cardinality::Many);
        assert!((without - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_union_and_exists() {
        let catalog = Catalog::builtin().unwrap();
        let estimator = CardinalityEstimator::new();
        let union = &catalog.lookup("UNION")[0];
        let exists = &catalog.lookup("EXISTS")[0];

        let rows = estimator.estimate_call(union, &[], &[10.0, 5.0], Cardinality::Many);
        assert!((rows - 15.0).abs() < f64::EPSILON);
        let rows = estimator.estimate_call(exists, &[], &[10.0], Cardinality::One);
        assert!((rows - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounded_by_cardinality() {
        assert!((bound(50.0, Cardinality::AtMostOne) - 1.0).abs() < f64::EPSILON);
        assert!(bound(50.0, Cardinality::Empty).abs() < f64::EPSILON);
    }
}
