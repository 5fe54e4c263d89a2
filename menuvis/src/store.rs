//! Item meta store
//!
//! Per-item key/value metadata. The visibility filter reads the stored
//! expression and the parent link from here; the save and delete hooks write
//! the expression.

use menuvis_core::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Meta key holding an item's visibility expression
pub const VISIBILITY_KEY: &str = "_menu_item_visibility";

/// Meta key holding an item's parent id (`"0"` for top-level items)
pub const PARENT_KEY: &str = "_menu_item_menu_item_parent";

pub trait MetaStore {
    fn get_meta(&self, id: ItemId, key: &str) -> Option<String>;
    fn update_meta(&mut self, id: ItemId, key: &str, value: &str);
    /// Returns whether a value was removed
    fn delete_meta(&mut self, id: ItemId, key: &str) -> bool;
    fn is_menu_item(&self, id: ItemId) -> bool;

    /// Stored visibility expression; blank values count as absent
    fn visibility_of(&self, id: ItemId) -> Option<String> {
        self.get_meta(id, VISIBILITY_KEY).filter(|v| !v.trim().is_empty())
    }

    /// Parent id; `"0"`, empty and unparseable values mean no parent
    fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.get_meta(id, PARENT_KEY)
            .and_then(|v| v.trim().parse::<ItemId>().ok())
            .filter(|&parent| parent != 0)
    }
}

/// Meta store backed by in-memory maps, loadable from JSON fixtures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryMetaStore {
    menu_items: BTreeSet<ItemId>,
    meta: BTreeMap<ItemId, BTreeMap<String, String>>,
}

impl InMemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Register a menu item, optionally under a parent
    pub fn with_item(mut self, id: ItemId, parent: Option<ItemId>) -> Self {
        self.insert_item(id, parent);
        self
    }

    pub fn with_visibility(mut self, id: ItemId, expression: &str) -> Self {
        self.update_meta(id, VISIBILITY_KEY, expression);
        self
    }

    pub fn insert_item(&mut self, id: ItemId, parent: Option<ItemId>) {
        self.menu_items.insert(id);
        self.update_meta(id, PARENT_KEY, &parent.unwrap_or(0).to_string());
    }
}

impl MetaStore for InMemoryMetaStore {
    fn get_meta(&self, id: ItemId, key: &str) -> Option<String> {
        self.meta.get(&id)?.get(key).cloned()
    }

    fn update_meta(&mut self, id: ItemId, key: &str, value: &str) {
        self.meta.entry(id).or_default().insert(key.to_string(), value.to_string());
    }

    fn delete_meta(&mut self, id: ItemId, key: &str) -> bool {
        let Some(entries) = self.meta.get_mut(&id) else {
            return false;
        };
        let removed = entries.remove(key).is_some();
        if entries.is_empty() {
            self.meta.remove(&id);
        }
        removed
    }

    fn is_menu_item(&self, id: ItemId) -> bool {
        self.menu_items.contains(&id)
    }
}
