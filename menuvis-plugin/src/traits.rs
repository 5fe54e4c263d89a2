//! Plugin traits

use menuvis_core::Value;
use crate::RequestContext;
use serde::Serialize;

/// Metadata about a predicate argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: true }
    }
}

/// Metadata for a predicate plugin
#[derive(Debug, Clone, Serialize)]
pub struct PredicateMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
}

/// Conditional function callable from a visibility expression.
///
/// Implementations must be pure with respect to the request context:
/// calling twice with the same arguments yields the same value.
pub trait PredicatePlugin: Send + Sync {
    fn meta(&self) -> PredicateMeta;
    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value;
}
