//! Logical types and implicit numeric promotion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a set's elements.
///
/// Every expression denotes a set, so a `LogicalType` always describes the
/// element type; how many elements there are is tracked separately by
/// [`Cardinality`](super::Cardinality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    /// Element type of an untyped empty set literal (`{}`).
    ///
    /// Assignable to every parameter type and never binds a type variable.
    Unknown,
    /// Boolean.
    Bool,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit IEEE float.
    Float32,
    /// 64-bit IEEE float.
    Float64,
    /// Arbitrary precision decimal.
    Decimal,
    /// UTF-8 string.
    String,
    /// Raw bytes.
    Bytes,
    /// JSON document.
    Json,
}

impl LogicalType {
    /// All concrete types, in the order used for deterministic tie-breaking.
    pub const CONCRETE: [LogicalType; 10] = [
        LogicalType::Bool,
        LogicalType::Int16,
        LogicalType::Int32,
        LogicalType::Int64,
        LogicalType::Float32,
        LogicalType::Float64,
        LogicalType::Decimal,
        LogicalType::String,
        LogicalType::Bytes,
        LogicalType::Json,
    ];

    /// Returns the short type name (as used in declarations).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            LogicalType::Unknown => "unknown",
            LogicalType::Bool => "bool",
            LogicalType::Int16 => "int16",
            LogicalType::Int32 => "int32",
            LogicalType::Int64 => "int64",
            LogicalType::Float32 => "float32",
            LogicalType::Float64 => "float64",
            LogicalType::Decimal => "decimal",
            LogicalType::String => "str",
            LogicalType::Bytes => "bytes",
            LogicalType::Json => "json",
        }
    }

    /// Parses a type name, accepting an optional `std::` module prefix.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("std::").unwrap_or(name);
        let ty = match name.to_ascii_lowercase().as_str() {
            "unknown" => LogicalType::Unknown,
            "bool" => LogicalType::Bool,
            "int16" => LogicalType::Int16,
            "int32" => LogicalType::Int32,
            "int64" => LogicalType::Int64,
            "float32" => LogicalType::Float32,
            "float64" => LogicalType::Float64,
            "decimal" => LogicalType::Decimal,
            "str" | "string" => LogicalType::String,
            "bytes" => LogicalType::Bytes,
            "json" => LogicalType::Json,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns true for integer, float and decimal types.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Int16
                | LogicalType::Int32
                | LogicalType::Int64
                | LogicalType::Float32
                | LogicalType::Float64
                | LogicalType::Decimal
        )
    }

    /// Returns true for the integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            LogicalType::Int16 | LogicalType::Int32 | LogicalType::Int64
        )
    }

    /// Returns the implicit promotion distance from `self` to `target`.
    ///
    /// `Some(0)` is an exact match, `None` means no implicit conversion
    /// exists. Distances are shortest paths in the promotion graph
    /// `int16 -> int32 -> int64 -> decimal`, `int64 -> float64` (weight 2),
    /// `float32 -> float64`. Decimal and float64 never promote into each
    /// other; the catalog spells those comparisons out as explicit overloads.
    ///
    /// `Unknown` reaches every concrete type at distance 1, so an untyped
    /// `{}` prefers an `anytype` parameter, where it costs nothing.
    #[must_use]
    pub fn promotion_distance(self, target: LogicalType) -> Option<u32> {
        if self == target {
            return Some(0);
        }
        if self == LogicalType::Unknown {
            return Some(1);
        }
        use LogicalType::{Decimal, Float32, Float64, Int16, Int32, Int64};
        match (self, target) {
            (Int16, Int32) => Some(1),
            (Int16, Int64) => Some(2),
            (Int16, Decimal) => Some(3),
            (Int16, Float64) => Some(4),
            (Int32, Int64) => Some(1),
            (Int32, Decimal) => Some(2),
            (Int32, Float64) => Some(3),
            (Int64, Decimal) => Some(1),
            (Int64, Float64) => Some(2),
            (Float32, Float64) => Some(1),
            _ => None,
        }
    }

    /// Finds the cheapest common promotion target of the given types.
    ///
    /// `Unknown` entries are ignored. Returns the target and the summed
    /// promotion distance, or `None` when no concrete type is given or no
    /// common target exists. Ties go to the earlier type in [`Self::CONCRETE`].
    #[must_use]
    pub fn common_supertype(types: &[LogicalType]) -> Option<(LogicalType, u32)> {
        let known: Vec<LogicalType> = types
            .iter()
            .copied()
            .filter(|t| *t != LogicalType::Unknown)
            .collect();
        if known.is_empty() {
            return None;
        }

        let mut best: Option<(LogicalType, u32)> = None;
        for target in Self::CONCRETE {
            let total = known
                .iter()
                .map(|t| t.promotion_distance(target))
                .try_fold(0u32, |acc, d| d.map(|d| acc + d));
            if let Some(total) = total {
                if best.is_none_or(|(_, b)| total < b) {
                    best = Some((target, total));
                }
            }
        }
        best
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
