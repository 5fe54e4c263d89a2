//! Request context
//!
//! Everything a predicate may ask about the current page view: what was
//! queried, which kind of page it is, and who is looking at it.

use menuvis_core::{Value, VisError};
use crate::PredicateRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Capability that lets a viewer see evaluation faults
pub const DEFAULT_PRIVILEGED_CAPABILITY: &str = "manage_options";

/// A taxonomy term (category, tag, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub taxonomy: String,
}

impl Term {
    pub fn category(id: u64, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id, slug: slug.into(), name: name.into(), taxonomy: "category".to_string() }
    }

    pub fn tag(id: u64, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id, slug: slug.into(), name: name.into(), taxonomy: "post_tag".to_string() }
    }
}

/// A single post, page or custom post type entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub post_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl Post {
    pub fn new(id: u64, post_type: impl Into<String>, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: title.into(),
            post_type: post_type.into(),
            template: None,
            terms: Vec::new(),
        }
    }

    pub fn page(id: u64, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, "page", slug, title)
    }

    pub fn post(id: u64, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, "post", slug, title)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn terms_in<'a>(&'a self, taxonomy: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.terms.iter().filter(move |t| t.taxonomy == taxonomy)
    }
}

/// The object the current request resolved to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Queried {
    #[default]
    Nothing,
    Post(Post),
    Term(Term),
}

/// Page-kind flags that do not follow from the queried object alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFlags {
    pub front_page: bool,
    pub home: bool,
    pub search: bool,
    pub not_found: bool,
    pub post_type_archive: Option<String>,
}

/// Who is viewing the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewer {
    pub logged_in: bool,
    pub roles: Vec<String>,
    pub capabilities: HashSet<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in() -> Self {
        Self { logged_in: true, ..Self::default() }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Evaluation context passed to predicates
pub struct RequestContext {
    pub registry: Arc<PredicateRegistry>,
    pub queried: Queried,
    pub flags: QueryFlags,
    pub viewer: Viewer,
    pub variables: HashMap<String, Value>,
    pub privileged_capability: String,
}

impl RequestContext {
    pub fn new(registry: Arc<PredicateRegistry>) -> Self {
        Self {
            registry,
            queried: Queried::Nothing,
            flags: QueryFlags::default(),
            viewer: Viewer::anonymous(),
            variables: HashMap::new(),
            privileged_capability: DEFAULT_PRIVILEGED_CAPABILITY.to_string(),
        }
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.queried = Queried::Post(post);
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.queried = Queried::Term(term);
        self
    }

    pub fn with_flags(mut self, flags: QueryFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn with_variables(mut self, vars: HashMap<String, Value>) -> Self {
        self.variables = vars;
        self
    }

    pub fn with_privileged_capability(mut self, capability: impl Into<String>) -> Self {
        self.privileged_capability = capability.into();
        self
    }

    /// Queried post, if the request resolved to one
    pub fn post(&self) -> Option<&Post> {
        match &self.queried {
            Queried::Post(p) => Some(p),
            _ => None,
        }
    }

    /// Queried term, if the request is a term archive
    pub fn term(&self) -> Option<&Term> {
        match &self.queried {
            Queried::Term(t) => Some(t),
            _ => None,
        }
    }

    /// Whether the viewer may see evaluation fault details
    pub fn is_privileged(&self) -> bool {
        self.viewer.can(&self.privileged_capability)
    }

    pub fn get_var(&self, name: &str) -> Value {
        match self.variables.get(name) {
            Some(v) => v.clone(),
            None => Value::Error(VisError::undefined_var(name)),
        }
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        self.registry.call_predicate(name, args, self)
    }
}
