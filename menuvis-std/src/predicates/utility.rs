//! Utility functions over values

use menuvis_plugin::prelude::*;
use crate::helpers::{check_arity, propagate_error};

pub struct Count;
pub struct InArray;

static COUNT_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "list", typ: "List", description: "List to count", optional: false },
];
static COUNT_EXAMPLES: [&str; 1] = ["count($cart_items) > 0"];

static IN_ARRAY_ARGS: [ArgMeta; 2] = [
    ArgMeta { name: "needle", typ: "Any", description: "Value to look for", optional: false },
    ArgMeta { name: "haystack", typ: "List", description: "List to search", optional: false },
];
static IN_ARRAY_EXAMPLES: [&str; 2] = ["in_array(get_the_ID(), [4, 8, 15])", "in_array($lang, ['de', 'fr'])"];

impl PredicatePlugin for Count {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "count",
            description: "Number of elements in a list",
            usage: "count(list)",
            args: &COUNT_ARGS,
            returns: "Number",
            examples: &COUNT_EXAMPLES,
            category: "utility",
        }
    }

    fn call(&self, args: &[Value], _ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        if let Err(e) = check_arity("count", args, 1, 1) {
            return Value::Error(e);
        }
        match &args[0] {
            Value::List(items) => Value::Number(items.len() as i64),
            other => Value::Error(VisError::arg_type("count", "list", "List", other.type_name())),
        }
    }
}

impl PredicatePlugin for InArray {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "in_array",
            description: "True when the list holds a value loosely equal to the needle",
            usage: "in_array(needle, haystack)",
            args: &IN_ARRAY_ARGS,
            returns: "Bool",
            examples: &IN_ARRAY_EXAMPLES,
            category: "utility",
        }
    }

    fn call(&self, args: &[Value], _ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        if let Err(e) = check_arity("in_array", args, 2, 2) {
            return Value::Error(e);
        }
        match &args[1] {
            Value::List(items) => Value::Bool(items.iter().any(|v| v.loose_eq(&args[0]))),
            other => Value::Error(VisError::arg_type("in_array", "haystack", "List", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ctx() -> RequestContext {
        RequestContext::new(Arc::new(PredicateRegistry::new()))
    }

    #[test]
    fn test_count() {
        let list = Value::List(vec![Value::Number(1), Value::Null]);
        assert_eq!(Count.call(&[list], &ctx()).as_number(), Some(2));
        assert_eq!(Count.call(&[Value::List(vec![])], &ctx()).as_number(), Some(0));
    }

    #[test]
    fn test_count_rejects_scalars() {
        let result = Count.call(&[Value::Number(3)], &ctx());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::ARG_TYPE));
    }

    #[test]
    fn test_count_propagates_undefined_variable() {
        let result = Count.call(&[ctx().get_var("cart")], &ctx());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::UNDEFINED_VAR));
    }

    #[test]
    fn test_in_array_loose() {
        let hay = Value::List(vec![Value::Number(4), Value::from("8")]);
        assert_eq!(InArray.call(&[Value::Number(8), hay.clone()], &ctx()).as_bool(), Some(true));
        assert_eq!(InArray.call(&[Value::from("4"), hay.clone()], &ctx()).as_bool(), Some(true));
        assert_eq!(InArray.call(&[Value::Number(15), hay], &ctx()).as_bool(), Some(false));
    }

    #[test]
    fn test_in_array_needs_list() {
        let result = InArray.call(&[Value::Number(1), Value::from("1")], &ctx());
        assert!(result.is_error());
    }
}
