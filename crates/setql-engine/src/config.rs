//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Evaluate immutable, input-free subtrees at compile time.
    pub constant_folding: bool,

    /// Maximum nesting depth of an expression tree.
    pub max_depth: usize,

    /// Row estimate for inputs without statistics.
    pub default_set_size: u64,

    /// Fraction of rows assumed to survive `DISTINCT`.
    pub distinct_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            constant_folding: true,
            max_depth: 256,
            default_set_size: 1000,
            distinct_ratio: 0.5,
        }
    }
}

impl Config {
    /// Enables or disables constant folding.
    #[must_use]
    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.constant_folding = enabled;
        self
    }

    /// Sets the maximum expression depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the default input size for estimation.
    #[must_use]
    pub fn with_default_set_size(mut self, rows: u64) -> Self {
        self.default_set_size = rows;
        self
    }

    /// Sets the distinct ratio, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_distinct_ratio(mut self, ratio: f64) -> Self {
        self.distinct_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_constant_folding(false)
            .with_max_depth(8)
            .with_distinct_ratio(3.0);
        assert!(!config.constant_folding);
        assert_eq!(config.max_depth, 8);
        assert!((config.distinct_ratio - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.default_set_size, 1000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"max_depth": 16}"#).unwrap();
        assert_eq!(config.max_depth, 16);
        assert!(config.constant_folding);
    }
}
