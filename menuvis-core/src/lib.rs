//! menuvis Core - Fundamental types
//!
//! This crate provides the core types used throughout menuvis:
//! - `Value`: Runtime values of visibility expressions
//! - `VisError`: Structured errors attributed to menu items
//! - `ItemId`: Identifier of a navigation-menu item

mod value;
mod error;

pub use value::Value;
pub use error::{VisError, ErrorContext, Severity, codes};

/// Identifier of a menu item, unique within a menu
pub type ItemId = u64;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ItemId, Value, VisError, Severity};
    pub use crate::error::codes;
}
