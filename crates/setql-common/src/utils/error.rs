//! Error types for Setql.
//!
//! Errors are grouped by the phase that raises them. Catalog and resolution
//! errors reject a query before anything runs; lowering errors are fatal for
//! the containing query; `CardinalityViolation` is the only semantic error
//! raised while a fragment executes.

use crate::types::LogicalType;
use thiserror::Error;

/// Result type alias for Setql operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Catalog construction error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Operator resolution error.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Fragment lowering error.
    #[error(transparent)]
    Lowering(#[from] LoweringError),

    /// Runtime evaluation error.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The query was cancelled between node visits.
    #[error("query cancelled")]
    Cancelled,

    /// Internal invariant broken.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised while building the operator catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// An overload with the same name and parameter types exists.
    #[error("cannot create operator {signature}: an operator with the same signature is already defined")]
    DuplicateSignature {
        /// Specialized name of the rejected signature.
        signature: String,
    },

    /// The declaration is malformed.
    #[error("cannot create operator {signature}: {reason}")]
    InvalidSignature {
        /// Specialized name of the rejected signature.
        signature: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors raised while resolving operator calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No overload accepts the argument types.
    #[error("no operator matches {name}({arg_types})")]
    NoMatchingOperator {
        /// Operator name.
        name: String,
        /// Comma-separated argument types.
        arg_types: String,
    },

    /// Several overloads match equally well.
    #[error("operator {name}({arg_types}) is ambiguous; candidates: {}", .candidates.join(", "))]
    AmbiguousOperator {
        /// Operator name.
        name: String,
        /// Comma-separated argument types.
        arg_types: String,
        /// Specialized names of the tied overloads.
        candidates: Vec<String>,
    },

    /// Generic parameters could not be bound consistently.
    #[error("type mismatch in {name}({arg_types}): {detail}")]
    TypeMismatch {
        /// Operator name.
        name: String,
        /// Comma-separated argument types.
        arg_types: String,
        /// Explanation of the conflict.
        detail: String,
    },

    /// A literal set contains an element of the wrong type.
    #[error("invalid set literal: {0}")]
    InvalidLiteral(String),

    /// The node already carries final annotations.
    #[error("expression node is already resolved")]
    AlreadyResolved,

    /// An annotation was requested from an unresolved node.
    #[error("expression node has not been resolved")]
    NotResolved,

    /// The expression tree is deeper than allowed.
    #[error("expression nesting exceeds the limit of {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

/// Errors raised when the target engine cannot express a fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoweringError {
    /// The target has no cast between the two types.
    #[error("target engine cannot cast {from} to {to}")]
    UnsupportedCast {
        /// Source type.
        from: LogicalType,
        /// Target type.
        to: LogicalType,
    },

    /// The target cannot express the construct.
    #[error("target engine does not support {0}")]
    Unsupported(String),
}

/// Errors raised while evaluating a fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// An operand held a number of values its context does not admit.
    #[error("cardinality violation in {context}: found {found} values")]
    CardinalityViolation {
        /// Where the violation happened.
        context: String,
        /// Number of values found.
        found: usize,
    },

    /// A value could not be converted.
    #[error("cannot cast {value} to {to}")]
    InvalidCast {
        /// Rendered source value.
        value: String,
        /// Target type.
        to: LogicalType,
    },

    /// The data source has nothing bound under this name.
    #[error("input '{0}' is not bound")]
    UnboundInput(String),

    /// No implementation is registered for this engine function.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A value had an unexpected type at runtime.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Found type name.
        found: String,
    },
}

impl Error {
    /// Returns true if this error was raised before execution started.
    #[must_use]
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            Error::Catalog(_) | Error::Resolve(_) | Error::Lowering(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_operator_and_types() {
        let err = Error::from(ResolveError::NoMatchingOperator {
            name: "IN".to_string(),
            arg_types: "str, SET OF int64".to_string(),
        });
        assert_eq!(err.to_string(), "no operator matches IN(str, SET OF int64)");
        assert!(err.is_compile_time());
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let err = ResolveError::AmbiguousOperator {
            name: "f".to_string(),
            arg_types: "int64".to_string(),
            candidates: vec!["f(decimal)".to_string(), "f(float64)".to_string()],
        };
        assert!(err.to_string().ends_with("candidates: f(decimal), f(float64)"));
    }

    #[test]
    fn test_cardinality_violation_is_runtime() {
        let err = Error::from(ExecutionError::CardinalityViolation {
            context: "IF condition".to_string(),
            found: 0,
        });
        assert!(!err.is_compile_time());
    }
}
