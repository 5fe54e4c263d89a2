//! Runtime values of visibility expressions
//!
//! Values can be integers, text, booleans, lists, null, or errors. Errors
//! propagate through evaluation instead of aborting it.

use crate::VisError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Runtime value of an expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Number(i64),
    Text(String),
    Bool(bool),
    List(Vec<Value>),
    Null,
    Error(VisError),
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&VisError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Null => "Null",
            Value::Error(_) => "Error",
        }
    }

    // ========== Truthiness and Comparison ==========

    /// Truthiness of a value.
    ///
    /// `false`, `0`, `""`, `"0"`, `[]` and `null` are falsy; errors are
    /// returned unchanged so the caller can report them.
    pub fn truthy(&self) -> Result<bool, VisError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(*n != 0),
            Value::Text(s) => Ok(!(s.is_empty() || s == "0")),
            Value::List(l) => Ok(!l.is_empty()),
            Value::Null => Ok(false),
            Value::Error(e) => Err(e.clone()),
        }
    }

    /// Loose equality used by `==` and `!=`.
    ///
    /// Numbers compare equal to text holding the same integer, so
    /// `get_the_id() == "5"` behaves like `get_the_id() == 5`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Number(n), Value::Text(s)) | (Value::Text(s), Value::Number(n)) => {
                s.trim().parse::<i64>().map_or(false, |parsed| parsed == *n)
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => false,
        }
    }

    /// Ordering used by `<`, `<=`, `>` and `>=`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, VisError> {
        match (self, other) {
            (Value::Error(e), _) | (_, Value::Error(e)) => Err(e.clone()),
            (Value::Number(a), Value::Number(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Number(a), Value::Text(s)) => s.trim().parse::<i64>()
                .map(|b| a.cmp(&b))
                .map_err(|_| VisError::type_error("Number", "Text")),
            (Value::Text(s), Value::Number(b)) => s.trim().parse::<i64>()
                .map(|a| a.cmp(b))
                .map_err(|_| VisError::type_error("Number", "Text")),
            (left, right) => Err(VisError::type_error(left.type_name(), right.type_name())
                .with_note("values of these types cannot be ordered")),
        }
    }

    // ========== JSON Interop ==========

    /// Convert a JSON value (e.g. a request variable from a fixture).
    ///
    /// Objects and non-integer numbers have no counterpart and become errors.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Number(i),
                None => Value::Error(VisError::type_error("integer", "decimal number")),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(_) => Value::Error(VisError::type_error("scalar or list", "object")),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => {
                let contents: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", contents.join(", "))
            }
            Value::Null => write!(f, "null"),
            Value::Error(e) => write!(f, "#ERROR: {}", e.code),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// From implementations for convenience
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<VisError> for Value {
    fn from(e: VisError) -> Self {
        Value::Error(e)
    }
}
