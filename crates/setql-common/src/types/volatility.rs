//! Volatility classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How freely an expression may be cached, folded or reordered.
///
/// Variants are ordered from least to most optimizable, so the `min` of two
/// volatilities is the classification of an expression containing both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    /// May return different results or have side effects on every
    /// invocation. Must be evaluated at each logical invocation point.
    Volatile,
    /// Returns the same result within one query evaluation.
    Stable,
    /// A pure function of its inputs. May be folded or reused freely.
    Immutable,
}

impl Volatility {
    /// Combines two classifications into the least optimizable one.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.min(other)
    }

    /// Returns true if results may be reused within one evaluation.
    #[must_use]
    pub const fn is_reusable(self) -> bool {
        !matches!(self, Volatility::Volatile)
    }
}

impl fmt::Display for Volatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Volatility::Volatile => "volatile",
            Volatility::Stable => "stable",
            Volatility::Immutable => "immutable",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_picks_least_optimizable() {
        assert_eq!(
            Volatility::Immutable.combine(Volatility::Stable),
            Volatility::Stable
        );
        assert_eq!(
            Volatility::Stable.combine(Volatility::Volatile),
            Volatility::Volatile
        );
        assert_eq!(
            Volatility::Immutable.combine(Volatility::Immutable),
            Volatility::Immutable
        );
    }

    #[test]
    fn test_reusable() {
        assert!(Volatility::Stable.is_reusable());
        assert!(!Volatility::Volatile.is_reusable());
    }
}
