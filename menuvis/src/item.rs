//! Navigation-menu items

use menuvis_core::ItemId;
use serde::{Deserialize, Serialize};

/// A menu item as handed to the visibility filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
}

impl MenuItem {
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self { id, title: title.into() }
    }
}
