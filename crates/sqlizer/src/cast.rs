//! Value casting for predicate arguments.
//!
//! Predicate methods accept an [`Arg`]: either a plain scalar (used as-is) or
//! a scalar tagged with a [`Cast`] target, coerced before it is bound. This
//! resolves the value shape at the type level instead of inspecting it at
//! runtime.

use crate::error::{SqlizerError, SqlizerResult};
use crate::value::Value;

/// Target type for a tagged cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// Textual rendering of the input.
    Text,
    /// Numeric coercion; fails when the input is not a number.
    Number,
    /// Truthy/falsy coercion.
    Bool,
}

/// Coerce `value` to the type named by `tag`.
///
/// Only the numeric case can fail: non-numeric text (and empty text) yields
/// [`SqlizerError::Cast`].
pub fn cast_value(value: Value, tag: Cast) -> SqlizerResult<Value> {
    match tag {
        Cast::Text => Ok(Value::Text(value.to_string())),
        Cast::Number => match value {
            Value::Int(_) | Value::Float(_) => Ok(value),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::Text(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(Value::Int(i));
                }
                match trimmed.parse::<f64>() {
                    Ok(x) if !x.is_nan() => Ok(Value::Float(x)),
                    _ => Err(SqlizerError::cast(s, "number")),
                }
            }
        },
        Cast::Bool => Ok(Value::Bool(match value {
            Value::Bool(b) => b,
            Value::Text(s) => !s.is_empty(),
            Value::Int(i) => i != 0,
            Value::Float(x) => x != 0.0 && !x.is_nan(),
        })),
    }
}

/// A predicate value argument: plain, or tagged for casting.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Bound as-is.
    Plain(Value),
    /// Run through [`cast_value`] before binding.
    Cast(Value, Cast),
}

impl Arg {
    /// Tag a scalar with a cast target.
    ///
    /// # Example
    /// ```ignore
    /// builder.where_("post_id", "=", Arg::cast(id_param, Cast::Number))?
    /// ```
    pub fn cast(value: impl Into<Value>, tag: Cast) -> Self {
        Arg::Cast(value.into(), tag)
    }

    /// Resolve to the scalar that will actually be bound.
    pub(crate) fn resolve(self) -> SqlizerResult<Value> {
        match self {
            Arg::Plain(v) => Ok(v),
            Arg::Cast(v, tag) => cast_value(v, tag),
        }
    }
}

impl<T: Into<Value>> From<T> for Arg {
    fn from(value: T) -> Self {
        Arg::Plain(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_text_renders_any_scalar() {
        assert_eq!(
            cast_value(Value::Int(42), Cast::Text).unwrap(),
            Value::Text("42".to_string())
        );
        assert_eq!(
            cast_value(Value::Bool(true), Cast::Text).unwrap(),
            Value::Text("true".to_string())
        );
    }

    #[test]
    fn cast_number_parses_integers_and_floats() {
        assert_eq!(
            cast_value(Value::Text("42".to_string()), Cast::Number).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            cast_value(Value::Text(" 1.5 ".to_string()), Cast::Number).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(
            cast_value(Value::Bool(true), Cast::Number).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn cast_number_rejects_non_numeric_text() {
        let err = cast_value(Value::Text("abc".to_string()), Cast::Number).unwrap_err();
        assert!(matches!(err, SqlizerError::Cast { .. }));

        let err = cast_value(Value::Text(String::new()), Cast::Number).unwrap_err();
        assert!(matches!(err, SqlizerError::Cast { .. }));
    }

    #[test]
    fn cast_bool_uses_truthiness() {
        assert_eq!(
            cast_value(Value::Text("x".to_string()), Cast::Bool).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            cast_value(Value::Text(String::new()), Cast::Bool).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(cast_value(Value::Int(0), Cast::Bool).unwrap(), Value::Bool(false));
        assert_eq!(cast_value(Value::Float(2.0), Cast::Bool).unwrap(), Value::Bool(true));
    }

    #[test]
    fn plain_arg_passes_through() {
        assert_eq!(Arg::from(7_i64).resolve().unwrap(), Value::Int(7));
        assert_eq!(
            Arg::from("seven").resolve().unwrap(),
            Value::Text("seven".to_string())
        );
    }

    #[test]
    fn tagged_arg_runs_the_caster() {
        assert_eq!(
            Arg::cast("7", Cast::Number).resolve().unwrap(),
            Value::Int(7)
        );
        assert!(Arg::cast("seven", Cast::Number).resolve().is_err());
    }
}
