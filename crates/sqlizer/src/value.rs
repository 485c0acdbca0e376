//! Bound scalar values.
//!
//! Every `?` placeholder the builder emits is backed by exactly one [`Value`]
//! in the accumulated value list. The executor hands these to tokio-postgres
//! in emission order.

use std::fmt;
use tokio_postgres::types::ToSql;

/// A scalar bound to a single placeholder marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Returns `true` for [`Value::Int`] and [`Value::Float`].
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
        }
    }

    /// Borrow this value as a tokio-postgres parameter.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Value::Text(s) => s,
            Value::Int(i) => i,
            Value::Float(f) => f,
            Value::Bool(b) => b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_impls_cover_common_scalars() {
        assert_eq!(Value::from("a"), Value::Text("a".to_string()));
        assert_eq!(Value::from(5_i32), Value::Int(5));
        assert_eq!(Value::from(5_i64), Value::Int(5));
        assert_eq!(Value::from(1.5_f64), Value::Float(1.5));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn display_renders_scalars() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::from(42_i64).to_string(), "42");
        assert_eq!(Value::from(false).to_string(), "false");
    }

    #[test]
    fn is_number_matches_numeric_variants() {
        assert!(Value::from(1_i64).is_number());
        assert!(Value::from(1.0_f64).is_number());
        assert!(!Value::from("1").is_number());
        assert!(!Value::from(true).is_number());
    }
}
