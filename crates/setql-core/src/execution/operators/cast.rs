//! Checked element conversion.

use bigdecimal::ToPrimitive;
use setql_common::types::{LogicalType, Value};
use setql_common::utils::error::ExecutionError;

/// Converts every element of `input` to `to`.
///
/// # Errors
///
/// Fails on the first element that has no exact representation in `to`.
pub fn cast_set(input: Vec<Value>, to: LogicalType) -> Result<Vec<Value>, ExecutionError> {
    input.iter().map(|v| cast_value(v, to)).collect()
}

/// Converts one value to `to`.
///
/// Integer targets accept only integral, in-range sources. Float targets
/// accept any numeric source. Decimal targets accept any finite numeric
/// source; the conversion is exact.
///
/// # Errors
///
/// Returns `ExecutionError::InvalidCast` when the value cannot be
/// represented in `to`.
pub fn cast_value(value: &Value, to: LogicalType) -> Result<Value, ExecutionError> {
    if value.logical_type() == to {
        return Ok(value.clone());
    }
    let invalid = || ExecutionError::InvalidCast {
        value: value.to_string(),
        to,
    };
    let converted = match to {
        LogicalType::Int16 => integral(value)
            .and_then(|v| i16::try_from(v).ok())
            .map(Value::Int16),
        LogicalType::Int32 => integral(value)
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32),
        LogicalType::Int64 => integral(value).map(Value::Int64),
        LogicalType::Float32 => value.as_f64().map(|v| Value::Float32(v as f32)),
        LogicalType::Float64 => value.as_f64().map(Value::Float64),
        LogicalType::Decimal => value.to_decimal().map(Value::Decimal),
        _ => None,
    };
    converted.ok_or_else(invalid)
}

/// Returns the value as an `i64` if it is numeric, integral and in range.
fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => value.as_i64(),
        Value::Float32(_) | Value::Float64(_) => {
            let v = value.as_f64()?;
            let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
            (v.is_finite() && v.fract() == 0.0 && in_range).then(|| v as i64)
        }
        Value::Decimal(d) if d.is_integer() => d.to_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_widening() {
        assert_eq!(
            cast_value(&Value::Int16(7), LogicalType::Int64).unwrap(),
            Value::Int64(7)
        );
        assert_eq!(
            cast_value(&Value::Int64(3), LogicalType::Decimal).unwrap(),
            Value::Decimal(BigDecimal::from(3))
        );
        assert_eq!(
            cast_value(&Value::Float32(1.5), LogicalType::Float64).unwrap(),
            Value::Float64(1.5)
        );
    }

    #[test]
    fn test_float_to_decimal_is_exact() {
        let out = cast_value(&Value::Float64(0.5), LogicalType::Decimal).unwrap();
        assert_eq!(out, Value::Decimal(BigDecimal::from_str("0.5").unwrap()));
    }

    #[test]
    fn test_non_finite_to_decimal_fails() {
        let err = cast_value(&Value::Float64(f64::NAN), LogicalType::Decimal).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidCast { .. }));
    }

    #[test]
    fn test_narrowing_checks_range() {
        assert_eq!(
            cast_value(&Value::Int64(300), LogicalType::Int16).unwrap(),
            Value::Int16(300)
        );
        assert!(cast_value(&Value::Int64(70_000), LogicalType::Int16).is_err());
        assert!(cast_value(&Value::Float64(2.5), LogicalType::Int64).is_err());
        assert_eq!(
            cast_value(&Value::Float64(2.0), LogicalType::Int64).unwrap(),
            Value::Int64(2)
        );
    }

    #[test]
    fn test_non_numeric_fails() {
        assert!(cast_value(&Value::from("1"), LogicalType::Int64).is_err());
        assert!(cast_value(&Value::Int64(1), LogicalType::String).is_err());
    }

    #[test]
    fn test_cast_set() {
        let out = cast_set(vec![Value::Int32(1), Value::Int32(2)], LogicalType::Int64).unwrap();
        assert_eq!(out, vec![Value::Int64(1), Value::Int64(2)]);
    }
}
