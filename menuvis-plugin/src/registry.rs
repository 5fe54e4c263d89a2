//! Predicate Registry
//!
//! The capability table: maps call names to their implementations.

use crate::{PredicatePlugin, PredicateMeta};
use crate::RequestContext;
use menuvis_core::{Value, VisError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Central predicate registry
pub struct PredicateRegistry {
    predicates: HashMap<String, Arc<dyn PredicatePlugin>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    pub fn with_predicate<P: PredicatePlugin + 'static>(mut self, p: P) -> Self {
        let name = p.meta().name.to_lowercase();
        self.predicates.insert(name, Arc::new(p));
        self
    }

    pub fn get_predicate(&self, name: &str) -> Option<&dyn PredicatePlugin> {
        self.predicates.get(&name.to_lowercase()).map(|p| p.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(&name.to_lowercase())
    }

    /// Registered names as declared by each predicate, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.predicates.values()
            .map(|p| p.meta().name)
            .collect();
        names.sort_unstable_by_key(|n| n.to_lowercase());
        names
    }

    pub fn call_predicate(&self, name: &str, args: &[Value], ctx: &RequestContext) -> Value {
        match self.get_predicate(name) {
            Some(p) => p.call(args, ctx),
            None => {
                let similar = self.find_similar(name);
                let mut err = VisError::undefined_func(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(3).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")));
                }
                Value::Error(err)
            }
        }
    }

    /// Find predicate names similar to the given name (for error suggestions)
    fn find_similar(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.predicates.values()
            .filter_map(|p| {
                let candidate = p.meta().name;
                let score = Self::similarity_score(&name_lower, &candidate.to_lowercase());
                if score > 10 {
                    Some((candidate.to_string(), score))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        score += query_chars.intersection(&candidate_chars).count() * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    /// Metadata of one predicate
    pub fn describe(&self, name: &str) -> Option<PredicateMeta> {
        self.get_predicate(name).map(|p| p.meta())
    }

    /// Metadata of all predicates, optionally restricted to a category
    pub fn list_predicates(&self, category: Option<&str>) -> Vec<PredicateMeta> {
        let mut metas: Vec<PredicateMeta> = self.predicates.values()
            .map(|p| p.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by_key(|m| m.name.to_lowercase());
        metas
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
