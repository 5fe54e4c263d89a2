//! Fault notices
//!
//! Evaluation faults are reported back to privileged viewers as plain text
//! notices naming the menu item they came from.

use crate::item::MenuItem;
use menuvis_core::{ItemId, VisError};
use serde::Serialize;
use std::fmt;

/// A captured evaluation fault for one menu item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub item_id: ItemId,
    pub item_title: String,
    pub error: VisError,
}

impl Notice {
    pub fn new(item: &MenuItem, error: VisError) -> Self {
        Self {
            item_id: item.id,
            item_title: item.title.clone(),
            error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.item_title.is_empty() {
            write!(f, "Error in \"{}\" menu item Visibility: ", self.item_title)?;
        }
        write!(f, "{}", self.error.message)
    }
}

/// Notice renderer
pub struct NoticeRenderer;

impl NoticeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// One notice per line
    pub fn render(&self, notices: &[Notice]) -> String {
        let mut output = String::new();
        for notice in notices {
            output.push_str(&notice.to_string());
            output.push('\n');
        }
        output
    }

    /// Notices as a JSON array
    pub fn render_json(&self, notices: &[Notice]) -> serde_json::Value {
        serde_json::json!(notices
            .iter()
            .map(|n| serde_json::json!({
                "item_id": n.item_id,
                "item_title": n.item_title,
                "code": n.error.code,
                "message": n.to_string(),
            }))
            .collect::<Vec<_>>())
    }
}

impl Default for NoticeRenderer {
    fn default() -> Self {
        Self::new()
    }
}
