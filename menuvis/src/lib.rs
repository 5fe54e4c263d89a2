//! menuvis - conditional visibility for navigation-menu items
//!
//! Administrators attach a small boolean expression to each menu item. On
//! save the expressions pass through an allow-list gate; at render time the
//! stored expressions are evaluated against the request and invisible items
//! (with their descendants) are dropped from the menu.

mod lexer;
mod scan;
mod ast;
mod parser;
mod gate;
mod eval;
mod filter;
mod item;
mod notice;
mod store;
pub mod config;
pub mod logging;

pub use ast::{Expr, BinOp, UnaryOp};
pub use config::{VisibilityConfig, ConfigError};
pub use eval::Evaluator;
pub use filter::{FilterOutcome, VisibilityFilter};
pub use gate::{AllowListGate, GateDecision};
pub use item::MenuItem;
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use notice::{Notice, NoticeRenderer};
pub use parser::{parse_expr, MAX_DEPTH, MAX_OPERATORS};
pub use scan::{call_sites, scan_batch, CallSite};
pub use store::{InMemoryMetaStore, MetaStore, PARENT_KEY, VISIBILITY_KEY};

pub use menuvis_core::{codes, ItemId, Value, VisError};
pub use menuvis_plugin::{
    AllowList, PredicateMeta, PredicatePlugin, PredicateRegistry, Post, QueryFlags, Queried,
    RequestContext, Term, Viewer,
};

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the save hook did with one item's submitted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Deleted,
    Updated,
    Unchanged,
}

/// Result of saving a batch of expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { actions: Vec<(ItemId, SaveAction)> },
    /// Nothing was written
    Rejected { reason: VisError },
}

impl SaveOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SaveOutcome::Rejected { .. })
    }

    pub fn action(&self, id: ItemId) -> Option<SaveAction> {
        match self {
            SaveOutcome::Saved { actions } => actions.iter().find(|(i, _)| *i == id).map(|(_, a)| *a),
            SaveOutcome::Rejected { .. } => None,
        }
    }
}

/// Main engine: the allow-list, capability table, gate and filter
pub struct MenuVisibility {
    registry: Arc<PredicateRegistry>,
    gate: AllowListGate,
    filter: VisibilityFilter,
    privileged_capability: String,
}

impl MenuVisibility {
    pub fn new(registry: PredicateRegistry, config: VisibilityConfig) -> Self {
        let allow = Arc::new(config.allow_list);
        info!(
            allowed = allow.len(),
            predicates = registry.names().len(),
            "menu visibility initialised"
        );
        for name in allow.names().iter().filter(|n| !registry.contains(n)) {
            warn!(name = %name, "allow-listed name has no predicate; calls to it will fault");
        }
        Self {
            registry: Arc::new(registry),
            gate: AllowListGate::new(allow.clone()),
            filter: VisibilityFilter::new(allow),
            privileged_capability: config.privileged_capability,
        }
    }

    pub fn with_standard_library() -> Self {
        Self::from_config(VisibilityConfig::default())
    }

    /// Standard predicates under the given configuration
    pub fn from_config(config: VisibilityConfig) -> Self {
        Self::new(menuvis_std::standard_registry(), config)
    }

    pub fn allow_list(&self) -> &AllowList {
        self.gate.allow_list()
    }

    /// Fresh request context bound to this engine's capability table
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.registry.clone())
            .with_privileged_capability(self.privileged_capability.clone())
    }

    /// Render-time hook: drop invisible items and their descendants
    pub fn filter_menu_items<S>(&self, items: Vec<MenuItem>, store: &S, ctx: &RequestContext) -> FilterOutcome
    where
        S: MetaStore + ?Sized,
    {
        let total = items.len();
        let outcome = self.filter.filter(items, store, ctx);
        debug!(total, kept = outcome.items.len(), faults = outcome.notices.len(), "menu filtered");
        outcome
    }

    /// Save hook: gate the whole batch, then write each item's value.
    ///
    /// Submitted values are trimmed of surrounding whitespace before they are
    /// checked, compared with the stored value and stored; the rest of the
    /// expression is kept as typed.
    pub fn save_batch<S>(&self, store: &mut S, edits: &[(ItemId, &str)]) -> SaveOutcome
    where
        S: MetaStore + ?Sized,
    {
        let trimmed: Vec<(ItemId, &str)> = edits.iter().map(|(id, v)| (*id, v.trim())).collect();
        let values: Vec<&str> = trimmed.iter().map(|(_, v)| *v).collect();

        if let GateDecision::Reject { reason } = self.gate.check_batch(&values) {
            return SaveOutcome::Rejected { reason };
        }

        let mut actions = Vec::with_capacity(trimmed.len());
        for (id, value) in trimmed {
            let action = if value.is_empty() {
                store.delete_meta(id, VISIBILITY_KEY);
                SaveAction::Deleted
            } else if store.get_meta(id, VISIBILITY_KEY).as_deref() != Some(value) {
                store.update_meta(id, VISIBILITY_KEY, value);
                SaveAction::Updated
            } else {
                SaveAction::Unchanged
            };
            debug!(item = id, ?action, "visibility saved");
            actions.push((id, action));
        }
        SaveOutcome::Saved { actions }
    }

    /// Delete hook: forget the expression of a removed menu item.
    /// Returns whether anything was deleted.
    pub fn remove_visibility_meta<S>(&self, store: &mut S, id: ItemId) -> bool
    where
        S: MetaStore + ?Sized,
    {
        if !store.is_menu_item(id) {
            return false;
        }
        let removed = store.delete_meta(id, VISIBILITY_KEY);
        debug!(item = id, removed, "visibility meta removed");
        removed
    }

    /// Would this expression be accepted on save?
    pub fn validate(&self, expression: &str) -> GateDecision {
        self.gate.check_batch(&[expression.trim()])
    }

    /// Evaluate one expression outside a menu; blank means visible
    pub fn evaluate(&self, expression: &str, ctx: &RequestContext) -> Result<bool, VisError> {
        self.filter.evaluate(expression, ctx)
    }

    pub fn describe(&self, name: &str) -> Option<PredicateMeta> {
        self.registry.describe(name)
    }

    pub fn list_predicates(&self, category: Option<&str>) -> Vec<PredicateMeta> {
        self.registry.list_predicates(category)
    }
}

impl Default for MenuVisibility {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

#[macro_export]
macro_rules! vars {
    {} => { std::collections::HashMap::new() };
    { $($key:ident : $value:expr),* $(,)? } => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert(stringify!($key).to_string(), $crate::Value::from($value));
        )*
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MenuVisibility {
        MenuVisibility::with_standard_library()
    }

    fn admin() -> Viewer {
        Viewer::logged_in().with_capability("manage_options")
    }

    fn kept(outcome: &FilterOutcome) -> Vec<ItemId> {
        outcome.items.iter().map(|i| i.id).collect()
    }

    mod render_tests {
        use super::*;

        fn menu() -> (Vec<MenuItem>, InMemoryMetaStore) {
            let items = vec![MenuItem::new(1, "Home"), MenuItem::new(2, "About"), MenuItem::new(3, "Team")];
            let store = InMemoryMetaStore::new()
                .with_item(1, None)
                .with_item(2, None)
                .with_item(3, Some(2))
                .with_visibility(2, "is_page(5)")
                .with_visibility(3, "true");
            (items, store)
        }

        #[test]
        fn test_page_condition() {
            let mv = engine();
            let (items, store) = menu();

            let on_page_5 = mv.context().with_post(Post::page(5, "about", "About"));
            assert_eq!(kept(&mv.filter_menu_items(items.clone(), &store, &on_page_5)), vec![1, 2, 3]);

            let on_page_6 = mv.context().with_post(Post::page(6, "contact", "Contact"));
            assert_eq!(kept(&mv.filter_menu_items(items, &store, &on_page_6)), vec![1]);
        }

        #[test]
        fn test_child_listed_before_parent_survives() {
            let mv = engine();
            let (mut items, store) = menu();
            items.swap(1, 2);
            let ctx = mv.context().with_post(Post::page(6, "contact", "Contact"));
            assert_eq!(kept(&mv.filter_menu_items(items, &store, &ctx)), vec![1, 3]);
        }

        #[test]
        fn test_undefined_variable_fault() {
            let mv = engine();
            let store = InMemoryMetaStore::new()
                .with_item(1, None)
                .with_visibility(1, "count($undefined_var) > 0");
            let items = vec![MenuItem::new(1, "Cart")];

            let out = mv.filter_menu_items(items.clone(), &store, &mv.context().with_viewer(admin()));
            assert_eq!(kept(&out), vec![1]);
            assert_eq!(out.notices.len(), 1);
            assert_eq!(
                out.notices[0].to_string(),
                "Error in \"Cart\" menu item Visibility: Undefined variable: $undefined_var"
            );

            let out = mv.filter_menu_items(items, &store, &mv.context());
            assert_eq!(kept(&out), vec![1]);
            assert!(out.notices.is_empty());
        }

        #[test]
        fn test_request_variables() {
            let mv = engine();
            let store = InMemoryMetaStore::new()
                .with_item(1, None)
                .with_visibility(1, "$lang == 'de' && in_array($plan, ['pro', 'team'])");
            let items = vec![MenuItem::new(1, "Team area")];

            let ctx = mv.context().with_variables(vars! { lang: "de", plan: "pro" });
            assert_eq!(kept(&mv.filter_menu_items(items.clone(), &store, &ctx)), vec![1]);

            let ctx = mv.context().with_variables(vars! { lang: "en", plan: "pro" });
            assert!(kept(&mv.filter_menu_items(items, &store, &ctx)).is_empty());
        }

        #[test]
        fn test_custom_privileged_capability() {
            let config = VisibilityConfig::default().with_privileged_capability("edit_theme_options");
            let mv = MenuVisibility::from_config(config);
            let store = InMemoryMetaStore::new().with_item(1, None).with_visibility(1, "$nope");
            let items = vec![MenuItem::new(1, "X")];

            let out = mv.filter_menu_items(items.clone(), &store, &mv.context().with_viewer(admin()));
            assert!(out.notices.is_empty());

            let designer = Viewer::logged_in().with_capability("edit_theme_options");
            let out = mv.filter_menu_items(items, &store, &mv.context().with_viewer(designer));
            assert_eq!(out.notices.len(), 1);
        }

        #[test]
        fn test_deeply_nested_stored_expression_is_a_fault() {
            let mv = engine();
            let deep = format!("{}is_home(){}", "(".repeat(10_000), ")".repeat(10_000));
            let store = InMemoryMetaStore::new().with_item(1, None).with_visibility(1, &deep);

            let out = mv.filter_menu_items(vec![MenuItem::new(1, "Deep")], &store, &mv.context().with_viewer(admin()));
            assert_eq!(kept(&out), vec![1]);
            assert_eq!(out.notices.len(), 1);
            assert_eq!(out.notices[0].error.code, codes::PARSE_ERROR);
        }

        #[test]
        fn test_evaluate_directly() {
            let mv = engine();
            let ctx = mv.context().with_viewer(Viewer::logged_in().with_role("editor"));
            assert_eq!(mv.evaluate("is_user_logged_in() and user_has_role('editor')", &ctx), Ok(true));
            assert_eq!(mv.evaluate("", &ctx), Ok(true));
            assert!(mv.evaluate("$missing", &ctx).is_err());
        }
    }

    mod save_tests {
        use super::*;

        #[test]
        fn test_disallowed_call_rejects_batch() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new()
                .with_item(1, None)
                .with_item(2, None)
                .with_visibility(1, "is_home()");

            let outcome = mv.save_batch(&mut store, &[(1, "is_page(5)"), (2, "shell_exec('rm -rf /')")]);
            assert!(outcome.is_rejected());
            assert_eq!(store.visibility_of(1).as_deref(), Some("is_home()"));
            assert_eq!(store.visibility_of(2), None);
        }

        #[test]
        fn test_empty_identical_changed() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new()
                .with_item(1, None)
                .with_item(2, None)
                .with_item(3, None)
                .with_visibility(1, "is_home()")
                .with_visibility(2, "is_search()");

            let outcome = mv.save_batch(&mut store, &[(1, ""), (2, " is_search() "), (3, "is_404()")]);
            assert_eq!(outcome.action(1), Some(SaveAction::Deleted));
            assert_eq!(outcome.action(2), Some(SaveAction::Unchanged));
            assert_eq!(outcome.action(3), Some(SaveAction::Updated));

            assert_eq!(store.visibility_of(1), None);
            assert_eq!(store.visibility_of(2).as_deref(), Some("is_search()"));
            assert_eq!(store.visibility_of(3).as_deref(), Some("is_404()"));
        }

        #[test]
        fn test_unparseable_value_rejects() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new().with_item(1, None);
            let outcome = mv.save_batch(&mut store, &[(1, "is_home() &&")]);
            assert!(outcome.is_rejected());
            assert_eq!(store.visibility_of(1), None);
        }

        #[test]
        fn test_deeply_nested_batch_is_rejected() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new()
                .with_item(1, None)
                .with_item(2, None)
                .with_visibility(2, "is_home()");
            let deep = format!("{}true{}", "(".repeat(10_000), ")".repeat(10_000));

            let outcome = mv.save_batch(&mut store, &[(1, deep.as_str()), (2, "")]);
            assert!(outcome.is_rejected());
            assert_eq!(store.visibility_of(1), None);
            assert_eq!(store.visibility_of(2).as_deref(), Some("is_home()"));
        }

        #[test]
        fn test_validate() {
            let mv = engine();
            assert!(mv.validate("is_page(5) || is_front_page()").is_accepted());
            assert!(mv.validate("").is_accepted());
            let decision = mv.validate("system('id')");
            assert_eq!(decision.reason().map(|r| r.code.as_str()), Some(codes::DISALLOWED_CALL));
        }

        #[test]
        fn test_configured_allow_list_replaces_default() {
            let config = VisibilityConfig::from_json_str(r#"{"allow_list": ["is_home"]}"#).unwrap();
            let mv = MenuVisibility::from_config(config);
            assert!(mv.validate("is_home()").is_accepted());
            assert!(!mv.validate("is_page(5)").is_accepted());
        }

        #[test]
        fn test_outcome_serializes() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new().with_item(1, None);
            let json = serde_json::to_value(mv.save_batch(&mut store, &[(1, "is_home()")])).unwrap();
            assert_eq!(json["status"], "saved");
            assert_eq!(json["actions"][0][1], "updated");
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn test_removes_expression_of_menu_item() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new().with_item(1, None).with_visibility(1, "is_home()");
            assert!(mv.remove_visibility_meta(&mut store, 1));
            assert_eq!(store.visibility_of(1), None);
        }

        #[test]
        fn test_ignores_other_posts() {
            let mv = engine();
            let mut store = InMemoryMetaStore::new().with_visibility(9, "is_home()");
            assert!(!mv.remove_visibility_meta(&mut store, 9));
            assert_eq!(store.visibility_of(9).as_deref(), Some("is_home()"));
        }
    }

    mod introspection_tests {
        use super::*;

        #[test]
        fn test_describe_and_list() {
            let mv = engine();
            assert_eq!(mv.describe("IS_PAGE").map(|m| m.name), Some("is_page"));
            assert_eq!(mv.list_predicates(Some("user")).len(), 3);
            assert_eq!(mv.allow_list().len(), 21);
        }

        #[test]
        fn test_vars_macro() {
            let v = vars! { count: 3i64, name: "x", flag: true };
            assert_eq!(v.get("count").and_then(|v| v.as_number()), Some(3));
            assert_eq!(v.get("flag").and_then(|v| v.as_bool()), Some(true));
            let empty: std::collections::HashMap<String, Value> = vars! {};
            assert!(empty.is_empty());
        }
    }
}
