//! Value enum for dynamic field values

use serde::Deserialize;
use serde::Serialize;

use crate::error::FieldError;

/// A dynamic value held by a form field.
///
/// Forms are keyed by field name and may mix value types, so field values are
/// stored dynamically and converted to typed Rust values at the validator
/// boundary through [`FromValue`].
///
/// # Type Mapping
///
/// | Rust type | Variant |
/// |-----------|---------|
/// | `None` | `Null` |
/// | `bool` | `Bool` |
/// | `i32`, `i64`, `u32` | `Int` |
/// | `f64` | `Float` |
/// | `String`, `&str` | `String` |
/// | `Vec<T>` | `List` |
///
/// # Example
///
/// ```
/// use formwork::model::Value;
///
/// let name = Value::from("Contoso");
/// let age = Value::from(42i64);
/// let empty = Value::Null;
/// assert_eq!(name.type_name(), "string");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Fallback for JSON values with no dedicated variant.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Json(_) => "json",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as `f64`, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

// =============================================================================
// Typed conversion
// =============================================================================

/// Conversion from a dynamic [`Value`] into a typed Rust value.
///
/// `field` names the value's origin and ends up in the error message.
pub trait FromValue: Sized {
    /// Convert `value`, failing with a type mismatch.
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError>;
}

impl FromValue for Value {
    fn from_value(_field: &str, value: Value) -> Result<Self, FieldError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(FieldError::type_mismatch(
                field,
                "string",
                other.type_name(),
            )),
        }
    }
}

impl FromValue for bool {
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(FieldError::type_mismatch(field, "bool", other.type_name())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Float(n) => Ok(n),
            Value::Int(n) => Ok(n as f64), // Allow widening
            other => Err(FieldError::type_mismatch(field, "float", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(field, other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(field: &str, value: Value) -> Result<Self, FieldError> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| T::from_value(field, item))
                .collect(),
            other => Err(FieldError::type_mismatch(field, "list", other.type_name())),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Json(serde_json::Value::Number(n)), Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            object @ serde_json::Value::Object(_) => Value::Json(object),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
