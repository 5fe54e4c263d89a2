//! Allow-list gate
//!
//! Decides whether a save batch of expressions may be stored. The check is
//! all-or-nothing: one bad expression rejects the whole batch.

use crate::parser::parse_expr;
use crate::scan::{call_sites, scan_batch};
use menuvis_core::VisError;
use menuvis_plugin::AllowList;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Accept,
    Reject { reason: VisError },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accept)
    }

    pub fn reason(&self) -> Option<&VisError> {
        match self {
            GateDecision::Accept => None,
            GateDecision::Reject { reason } => Some(reason),
        }
    }
}

impl From<Result<(), VisError>> for GateDecision {
    fn from(result: Result<(), VisError>) -> Self {
        match result {
            Ok(()) => GateDecision::Accept,
            Err(reason) => GateDecision::Reject { reason },
        }
    }
}

pub struct AllowListGate {
    allow: Arc<AllowList>,
}

impl AllowListGate {
    pub fn new(allow: Arc<AllowList>) -> Self {
        Self { allow }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow
    }

    /// Lexical check only: every call site must name an allow-listed call
    pub fn check_calls(&self, input: &str) -> GateDecision {
        let decision: GateDecision = call_sites(input)
            .map_err(VisError::from)
            .and_then(|sites| self.first_disallowed(sites.iter().map(|s| (s.name.as_str(), s.pos))))
            .into();
        log_decision(&decision, 1);
        decision
    }

    /// Full check of a save batch: lexical scan of the joined batch, then
    /// every non-empty expression must parse
    pub fn check_batch(&self, expressions: &[&str]) -> GateDecision {
        let decision: GateDecision = self.run_batch(expressions).into();
        log_decision(&decision, expressions.len());
        decision
    }

    fn run_batch(&self, expressions: &[&str]) -> Result<(), VisError> {
        let sites = scan_batch(expressions)?;
        self.first_disallowed(sites.iter().map(|s| (s.name.as_str(), s.pos)))?;

        for expr in expressions.iter().filter(|e| !e.trim().is_empty()) {
            parse_expr(expr, &self.allow).map_err(|e| e.with_expression(*expr))?;
        }
        Ok(())
    }

    fn first_disallowed<'s, I>(&self, sites: I) -> Result<(), VisError>
    where
        I: IntoIterator<Item = (&'s str, usize)>,
    {
        match sites.into_iter().find(|(name, _)| !self.allow.contains(name)) {
            Some((name, pos)) => Err(VisError::disallowed_call(name).at(pos)),
            None => Ok(()),
        }
    }
}

fn log_decision(decision: &GateDecision, batch_size: usize) {
    match decision {
        GateDecision::Accept => debug!(batch_size, "visibility batch accepted"),
        GateDecision::Reject { reason } => warn!(
            batch_size,
            code = %reason.code,
            error = %reason.message,
            "visibility batch rejected"
        ),
    }
}
