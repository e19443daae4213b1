//! Runtime element values.

use super::LogicalType;
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A single element of a set.
///
/// Equality and hashing follow the type system's `=` operator rather than
/// representation identity: decimals compare numerically (`1.0 = 1.00`),
/// `-0.0 = 0.0`, and all NaNs are equal to each other so that deduplication
/// stays well defined. Values of different types are never equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 16-bit integer.
    Int16(i16),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Arbitrary precision decimal.
    Decimal(BigDecimal),
    /// UTF-8 string.
    #[serde(rename = "str")]
    String(Arc<str>),
    /// Raw bytes.
    Bytes(Arc<[u8]>),
    /// JSON document text.
    Json(Arc<str>),
}

impl Value {
    /// Returns the logical type of this value.
    #[must_use]
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Value::Bool(_) => LogicalType::Bool,
            Value::Int16(_) => LogicalType::Int16,
            Value::Int32(_) => LogicalType::Int32,
            Value::Int64(_) => LogicalType::Int64,
            Value::Float32(_) => LogicalType::Float32,
            Value::Float64(_) => LogicalType::Float64,
            Value::Decimal(_) => LogicalType::Decimal,
            Value::String(_) => LogicalType::String,
            Value::Bytes(_) => LogicalType::Bytes,
            Value::Json(_) => LogicalType::Json,
        }
    }

    /// Returns the boolean payload, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns an integer value widened to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a numeric value converted to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int16(v) => Some(f64::from(*v)),
            Value::Int32(v) => Some(f64::from(*v)),
            Value::Int64(v) => Some(*v as f64),
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Returns a numeric value converted exactly to a decimal.
    ///
    /// Non-finite floats have no decimal representation and yield `None`.
    #[must_use]
    pub fn to_decimal(&self) -> Option<BigDecimal> {
        match self {
            Value::Int16(v) => Some(BigDecimal::from(*v)),
            Value::Int32(v) => Some(BigDecimal::from(*v)),
            Value::Int64(v) => Some(BigDecimal::from(*v)),
            Value::Float32(v) => BigDecimal::from_f32(*v),
            Value::Float64(v) => BigDecimal::from_f64(*v),
            Value::Decimal(d) => Some(d.clone()),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical bit pattern for float equality: one NaN, one zero.
fn canonical_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn canonical_f32_bits(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => {
                canonical_f32_bits(*a) == canonical_f32_bits(*b)
            }
            (Value::Float64(a), Value::Float64(b)) => {
                canonical_f64_bits(*a) == canonical_f64_bits(*b)
            }
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float32(v) => canonical_f32_bits(*v).hash(state),
            Value::Float64(v) => canonical_f64_bits(*v).hash(state),
            // Equal decimals share one normalized form.
            Value::Decimal(d) => d.normalized().hash(state),
            Value::String(s) | Value::Json(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Decimal(d) => write!(f, "{d}n"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::Bytes(b) => {
                f.write_str("b'")?;
                for byte in b.iter() {
                    write!(f, "\\x{byte:02x}")?;
                }
                f.write_str("'")
            }
            Value::Json(s) => write!(f, "to_json('{s}')"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::str::FromStr;

    fn hash_of(v: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        v.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_decimal_equality_is_numeric() {
        let a = Value::Decimal(BigDecimal::from_str("1.0").unwrap());
        let b = Value::Decimal(BigDecimal::from_str("1.00").unwrap());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_float_zero_and_nan() {
        assert_eq!(Value::Float64(0.0), Value::Float64(-0.0));
        assert_eq!(hash_of(&Value::Float64(0.0)), hash_of(&Value::Float64(-0.0)));
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
    }

    #[test]
    fn test_different_types_are_never_equal() {
        assert_ne!(Value::Int32(1), Value::Int64(1));
        assert_ne!(Value::String("1".into()), Value::Json("1".into()));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(
            Value::Float64(0.5).to_decimal(),
            Some(BigDecimal::from_str("0.5").unwrap())
        );
        assert_eq!(Value::Float64(f64::INFINITY).to_decimal(), None);
        assert_eq!(Value::Int16(7).to_decimal(), Some(BigDecimal::from(7)));
        assert_eq!(Value::Bool(true).to_decimal(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("abc").to_string(), "'abc'");
        assert_eq!(
            Value::Decimal(BigDecimal::from_str("2.5").unwrap()).to_string(),
            "2.5n"
        );
        assert_eq!(Value::Bytes(Arc::from(&[1u8, 255][..])).to_string(), "b'\\x01\\xff'");
    }

    #[test]
    fn test_serde_externally_tagged() {
        let json = serde_json::to_string(&Value::Int64(3)).unwrap();
        assert_eq!(json, r#"{"int64":3}"#);
        let back: Value = serde_json::from_str(r#"{"str":"hi"}"#).unwrap();
        assert_eq!(back, Value::from("hi"));
    }
}
