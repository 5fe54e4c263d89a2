//! Visibility filter
//!
//! One pass over the menu in order. An item is dropped when its expression
//! is false or its parent was already dropped; dropped ids are remembered so
//! their own children follow. A child listed before its parent is not
//! affected by the parent's result.

use crate::eval::Evaluator;
use crate::item::MenuItem;
use crate::notice::{Notice, NoticeRenderer};
use crate::parser::parse_expr;
use crate::store::MetaStore;
use menuvis_core::{ItemId, VisError};
use menuvis_plugin::{AllowList, RequestContext};
use serde::Serialize;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, debug_span, warn};

/// Result of filtering one menu
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    /// Retained items, in input order
    pub items: Vec<MenuItem>,
    /// Ids of dropped items, in input order
    pub hidden: Vec<ItemId>,
    /// Evaluation faults; empty unless the viewer is privileged
    pub notices: Vec<Notice>,
}

impl FilterOutcome {
    /// Notices as text, one per line; empty when there are none
    pub fn render_notices(&self) -> String {
        NoticeRenderer::new().render(&self.notices)
    }

    pub fn notices_json(&self) -> serde_json::Value {
        NoticeRenderer::new().render_json(&self.notices)
    }
}

pub struct VisibilityFilter {
    allow: Arc<AllowList>,
    evaluator: Evaluator,
}

impl VisibilityFilter {
    pub fn new(allow: Arc<AllowList>) -> Self {
        Self { allow, evaluator: Evaluator::new() }
    }

    /// Evaluate one stored expression. Blank means visible.
    ///
    /// Every fault, including one that no longer parses or a panicking
    /// predicate, comes back as `Err` with the expression attached.
    pub fn evaluate(&self, expression: &str, ctx: &RequestContext) -> Result<bool, VisError> {
        if expression.trim().is_empty() {
            return Ok(true);
        }
        let run = || -> Result<bool, VisError> {
            let expr = parse_expr(expression, &self.allow)?;
            self.evaluator.visibility(&expr, ctx)
        };
        catch_unwind(AssertUnwindSafe(run))
            .unwrap_or_else(|payload| Err(VisError::internal(panic_message(payload.as_ref()))))
            .map_err(|e| e.with_expression(expression))
    }

    pub fn filter<S>(&self, items: Vec<MenuItem>, store: &S, ctx: &RequestContext) -> FilterOutcome
    where
        S: MetaStore + ?Sized,
    {
        let privileged = ctx.is_privileged();
        let mut hidden_set: HashSet<ItemId> = HashSet::new();
        let mut outcome = FilterOutcome::default();

        for item in items {
            let span = debug_span!("menu_item", id = item.id, title = %item.title);
            let _enter = span.enter();

            let visible = match store.visibility_of(item.id) {
                None => true,
                Some(expression) => match self.evaluate(&expression, ctx) {
                    Ok(v) => v,
                    Err(err) => {
                        let err = err.for_item(item.id, item.title.clone());
                        warn!(code = %err.code, error = %err.message, "visibility expression failed; item kept");
                        if privileged {
                            outcome.notices.push(Notice::new(&item, err));
                        }
                        true
                    }
                },
            };

            let parent_hidden = store.parent_of(item.id).is_some_and(|p| hidden_set.contains(&p));
            if !visible || parent_hidden {
                debug!(visible, parent_hidden, "menu item hidden");
                hidden_set.insert(item.id);
                outcome.hidden.push(item.id);
            } else {
                outcome.items.push(item);
            }
        }

        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("conditional function panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("conditional function panicked: {}", s)
    } else {
        "conditional function panicked".to_string()
    }
}
