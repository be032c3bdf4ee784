//! Boundary validation helpers for loosely-shaped JSON payloads.
//!
//! The backend is not consistent about field presence or numeric encoding
//! (decimals sometimes arrive as strings), so payloads are checked here before
//! they are turned into typed DTOs.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{context}: missing required field `{field}`")]
    MissingField {
        context: String,
        field: &'static str,
    },
    #[error("{context}: field `{field}` must be a finite number")]
    NotFinite {
        context: String,
        field: &'static str,
    },
    #[error("{context}: field `{field}` must be an integer id")]
    InvalidId {
        context: String,
        field: &'static str,
    },
    #[error("{context}: expected a JSON {expected}")]
    WrongShape {
        context: String,
        expected: &'static str,
    },
    #[error("{0}")]
    Invalid(String),
}

pub fn as_object<'a>(
    value: &'a Value,
    context: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongShape {
        context: context.to_string(),
        expected: "object",
    })
}

pub fn as_array<'a>(value: &'a Value, context: &str) -> Result<&'a Vec<Value>, ValidationError> {
    value.as_array().ok_or_else(|| ValidationError::WrongShape {
        context: context.to_string(),
        expected: "array",
    })
}

fn present<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

/// Reads a finite number; numeric strings are accepted, `NaN`/`inf` are not.
pub fn require_finite(
    obj: &Map<String, Value>,
    field: &'static str,
    context: &str,
) -> Result<f64, ValidationError> {
    let raw = present(obj, field).ok_or_else(|| ValidationError::MissingField {
        context: context.to_string(),
        field,
    })?;
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::NotFinite {
            context: context.to_string(),
            field,
        }),
    }
}

/// Reads an integer id; `"12"` and `12` normalize to the same value.
pub fn require_id(
    obj: &Map<String, Value>,
    field: &'static str,
    context: &str,
) -> Result<i64, ValidationError> {
    let raw = present(obj, field).ok_or_else(|| ValidationError::MissingField {
        context: context.to_string(),
        field,
    })?;
    let id = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    id.ok_or_else(|| ValidationError::InvalidId {
        context: context.to_string(),
        field,
    })
}

pub fn require_count(
    obj: &Map<String, Value>,
    field: &'static str,
    context: &str,
) -> Result<u32, ValidationError> {
    let value = require_finite(obj, field, context)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::Invalid(format!(
            "{}: field `{}` must be a non-negative whole number",
            context, field
        )));
    }
    Ok(value as u32)
}

pub fn optional_string(obj: &Map<String, Value>, field: &str) -> String {
    match obj.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_finite_accepts_numeric_strings() {
        let value = json!({ "a": 12.5, "b": "74.58", "c": "NaN", "d": true, "e": null });
        let obj = value.as_object().unwrap();
        assert_eq!(require_finite(obj, "a", "t").unwrap(), 12.5);
        assert_eq!(require_finite(obj, "b", "t").unwrap(), 74.58);
        assert!(matches!(
            require_finite(obj, "c", "t"),
            Err(ValidationError::NotFinite { field: "c", .. })
        ));
        assert!(matches!(
            require_finite(obj, "d", "t"),
            Err(ValidationError::NotFinite { field: "d", .. })
        ));
        assert!(matches!(
            require_finite(obj, "e", "t"),
            Err(ValidationError::MissingField { field: "e", .. })
        ));
    }

    #[test]
    fn test_require_id_normalizes_strings() {
        let value = json!({ "a": 7, "b": " 7 ", "c": 7.5 });
        let obj = value.as_object().unwrap();
        assert_eq!(require_id(obj, "a", "t").unwrap(), 7);
        assert_eq!(require_id(obj, "b", "t").unwrap(), 7);
        assert!(require_id(obj, "c", "t").is_err());
    }

    #[test]
    fn test_require_count_rejects_fractions() {
        let value = json!({ "n": 4, "f": 2.5, "neg": -1 });
        let obj = value.as_object().unwrap();
        assert_eq!(require_count(obj, "n", "t").unwrap(), 4);
        assert!(require_count(obj, "f", "t").is_err());
        assert!(require_count(obj, "neg", "t").is_err());
    }
}
