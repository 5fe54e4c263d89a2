//! Helper functions for predicates
//!
//! Argument checks and the id/slug/title matching rules shared by the
//! conditional predicates.

use menuvis_core::{Value, VisError};

/// Return the first error among the arguments, if any
pub fn propagate_error(args: &[Value]) -> Option<Value> {
    args.iter().find(|a| a.is_error()).cloned()
}

/// Check the number of arguments is within `min..=max`
pub fn check_arity(func: &str, args: &[Value], min: usize, max: usize) -> Result<(), VisError> {
    if args.len() < min || args.len() > max {
        let expected = if args.len() < min { min } else { max };
        return Err(VisError::arg_count(func, expected, args.len()));
    }
    Ok(())
}

/// Extract text, returning error for any other type
pub fn require_text<'a>(value: &'a Value, func: &str, arg: &str) -> Result<&'a str, VisError> {
    match value {
        Value::Text(s) => Ok(s.as_str()),
        Value::Error(e) => Err(e.clone()),
        other => Err(VisError::arg_type(func, arg, "Text", other.type_name())),
    }
}

/// Identity of a queried object as seen by the matching rules
pub struct Identity<'a> {
    pub id: u64,
    pub slug: &'a str,
    pub title: &'a str,
}

/// Does `arg` select the object?
///
/// A number matches the id, text matches the id (when numeric), the slug or
/// the title, and a list matches when any of its elements does.
pub fn matches_identity(arg: &Value, who: &Identity<'_>, func: &str) -> Result<bool, VisError> {
    match arg {
        Value::Number(n) => Ok(u64::try_from(*n).map_or(false, |id| id == who.id)),
        Value::Text(s) => {
            if let Ok(id) = s.trim().parse::<u64>() {
                return Ok(id == who.id);
            }
            Ok(s == who.slug || s == who.title)
        }
        Value::List(items) => {
            for item in items {
                if matches_identity(item, who, func)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Error(e) => Err(e.clone()),
        other => Err(VisError::arg_type(func, "selector", "Number, Text or List", other.type_name())),
    }
}

/// Does `arg` name `name` (directly or as one element of a list)?
pub fn matches_name(arg: &Value, name: &str, func: &str) -> Result<bool, VisError> {
    match arg {
        Value::Text(s) => Ok(s == name),
        Value::List(items) => {
            for item in items {
                if matches_name(item, name, func)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Error(e) => Err(e.clone()),
        other => Err(VisError::arg_type(func, "name", "Text or List", other.type_name())),
    }
}

/// Turn a predicate result into a value
pub fn to_value(result: Result<bool, VisError>) -> Value {
    match result {
        Ok(b) => Value::Bool(b),
        Err(e) => Value::Error(e),
    }
}
