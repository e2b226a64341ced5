//! Render-time values flowing through template expressions
//!
//! Parameters, helper arguments, and helper results are all [`Value`]s. The
//! engine coerces a placeholder's final value to text with the [`Display`]
//! impl, so anything a helper returns ends up string-rendered.

use std::collections::BTreeMap;
use std::fmt;

/// A dynamically-typed template value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The sentinel a missing argument or absent object member produces
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Build an object from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// Build an array from values
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Object member lookup; `None` for non-objects and absent keys
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness for ternary conditions: empty strings, zero, NaN, `null`,
    /// and `undefined` are false; arrays and objects are always true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // Integral numbers render without a trailing .0
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from(42i64).to_string(), "42");
        assert_eq!(Value::from(3.5).to_string(), "3.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Undefined.to_string(), "undefined");
    }

    #[test]
    fn test_display_array_joins_with_commas() {
        let v = Value::array([Value::from(1i64), Value::from("two")]);
        assert_eq!(v.to_string(), "1,two");
    }

    #[test]
    fn test_object_member_lookup() {
        let v = Value::object([("name", Value::from("world"))]);
        assert_eq!(v.get("name"), Some(&Value::from("world")));
        assert_eq!(v.get("missing"), None);
        assert_eq!(Value::Null.get("name"), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(1i64).is_truthy());
        assert!(Value::Object(BTreeMap::new()).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(0i64).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
    }
}
