//! Allow-list of call names permitted inside a visibility expression

use crate::PredicateRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered set of permitted call names.
///
/// Built once when the component graph is constructed and never mutated
/// afterwards. Membership is case-insensitive; the declared spelling and
/// order are kept for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AllowList {
    names: Vec<String>,
    index: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for name in names {
            let name: String = name.into();
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if list.index.insert(name.to_lowercase()) {
                list.names.push(name.to_string());
            }
        }
        list
    }

    /// Every predicate registered in the capability table
    pub fn from_registry(registry: &PredicateRegistry) -> Self {
        Self::new(registry.names())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(&name.to_lowercase())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<Vec<String>> for AllowList {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<AllowList> for Vec<String> {
    fn from(list: AllowList) -> Self {
        list.names
    }
}
