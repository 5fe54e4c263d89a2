//! Structured errors for visibility expressions
//!
//! Errors never crash a render. They are values that propagate through
//! evaluation and carry enough context to tell an administrator which menu
//! item is broken and why.

use crate::ItemId;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const LEX_ERROR: &str = "LEX_ERROR";
    pub const DISALLOWED_CALL: &str = "DISALLOWED_CALL";
    pub const UNDEFINED_VAR: &str = "UNDEFINED_VAR";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The expression could not be evaluated
    Error,
    /// The expression can never be accepted
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Menu item the expression belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,

    /// Display title of the menu item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,

    /// Expression source that caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Byte offset into the expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error for expression validation and evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

impl VisError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: attribute the error to a menu item
    pub fn for_item(mut self, id: ItemId, title: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.item_id = Some(id);
        ctx.item_title = Some(title.into());
        self
    }

    /// Builder: set expression context
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.expression = Some(expression.into());
        self
    }

    /// Builder: set byte offset
    pub fn at(mut self, position: usize) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.position = Some(position);
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Title of the menu item this error was attributed to, if any
    pub fn item_title(&self) -> Option<&str> {
        self.context.as_ref()?.item_title.as_deref()
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Check expression syntax")
    }

    pub fn lex_error(details: impl Into<String>) -> Self {
        Self::new(codes::LEX_ERROR, format!("Unreadable expression: {}", details.into()))
            .with_suggestion("Check quotes and operators")
            .with_severity(Severity::Fatal)
    }

    pub fn disallowed_call(name: &str) -> Self {
        Self::new(codes::DISALLOWED_CALL, format!("Call to '{}' is not allowed", name))
            .with_suggestion("Only allow-listed conditional functions may be called")
            .with_severity(Severity::Fatal)
    }

    pub fn undefined_var(name: &str) -> Self {
        Self::new(codes::UNDEFINED_VAR, format!("Undefined variable: ${}", name))
            .with_suggestion(format!("Define '${}' in the request context or check spelling", name))
    }

    pub fn undefined_func(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FUNC, format!("Call to undefined function {}()", name))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn arg_count(func: &str, expected: usize, got: usize) -> Self {
        Self::new(codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", func, expected, got))
    }

    pub fn arg_type(func: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", func, arg, expected, got))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug in a conditional function, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for VisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for VisError {}
