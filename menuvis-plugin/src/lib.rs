//! menuvis Plugin System
//!
//! Provides the capability table visibility expressions are evaluated against:
//! - Predicates (conditional functions such as `is_page`)
//! - The allow-list of names an expression may call
//! - The per-request context predicates read from

mod traits;
mod registry;
mod allowlist;
mod context;

pub use traits::{PredicatePlugin, PredicateMeta, ArgMeta};
pub use registry::PredicateRegistry;
pub use allowlist::AllowList;
pub use context::{
    RequestContext, Queried, Post, Term, QueryFlags, Viewer,
    DEFAULT_PRIVILEGED_CAPABILITY,
};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        PredicatePlugin, PredicateMeta, ArgMeta, PredicateRegistry,
        RequestContext, Queried, Post, Term,
    };
    pub use menuvis_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuvis_core::{codes, Value};
    use std::sync::Arc;

    struct Always;

    impl PredicatePlugin for Always {
        fn meta(&self) -> PredicateMeta {
            PredicateMeta {
                name: "is_always",
                description: "Always true",
                usage: "is_always()",
                args: &[],
                returns: "Bool",
                examples: &[],
                category: "test",
            }
        }

        fn call(&self, _args: &[Value], _ctx: &RequestContext) -> Value {
            Value::Bool(true)
        }
    }

    fn registry() -> Arc<PredicateRegistry> {
        Arc::new(PredicateRegistry::new().with_predicate(Always))
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_lookup_is_case_insensitive() {
            let reg = registry();
            assert!(reg.contains("is_always"));
            assert!(reg.contains("IS_Always"));
            assert!(!reg.contains("is_never"));
        }

        #[test]
        fn test_call_registered_predicate() {
            let reg = registry();
            let ctx = RequestContext::new(reg.clone());
            assert_eq!(ctx.call("is_always", &[]).as_bool(), Some(true));
        }

        #[test]
        fn test_unknown_predicate_suggests_similar() {
            let reg = registry();
            let ctx = RequestContext::new(reg.clone());
            let result = ctx.call("is_alway", &[]);
            let err = result.as_error().unwrap();
            assert_eq!(err.code, codes::UNDEFINED_FUNC);
            assert!(err.suggestion.as_deref().unwrap_or("").contains("is_always"));
        }

        #[test]
        fn test_list_and_describe() {
            let reg = registry();
            assert_eq!(reg.names(), vec!["is_always"]);
            assert_eq!(reg.list_predicates(Some("test")).len(), 1);
            assert!(reg.list_predicates(Some("query")).is_empty());
            assert_eq!(reg.describe("is_always").map(|m| m.usage), Some("is_always()"));
        }
    }

    mod allowlist_tests {
        use super::*;

        #[test]
        fn test_dedup_and_order() {
            let list = AllowList::new(["is_page", "IS_PAGE", " is_home ", "", "is_page"]);
            assert_eq!(list.names(), &["is_page".to_string(), "is_home".to_string()]);
            assert_eq!(list.len(), 2);
        }

        #[test]
        fn test_membership_is_case_insensitive() {
            let list = AllowList::new(["get_the_ID"]);
            assert!(list.contains("get_the_id"));
            assert!(list.contains("GET_THE_ID"));
            assert!(!list.contains("shell_exec"));
        }

        #[test]
        fn test_from_registry() {
            let list = AllowList::from_registry(&registry());
            assert!(list.contains("is_always"));
        }

        #[test]
        fn test_serde_as_sequence() {
            let list: AllowList = serde_json::from_str(r#"["is_page", "is_page", "is_home"]"#).unwrap();
            assert_eq!(list.len(), 2);
            let json = serde_json::to_string(&list).unwrap();
            assert_eq!(json, r#"["is_page","is_home"]"#);
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_undefined_variable_is_error_value() {
            let ctx = RequestContext::new(registry());
            let v = ctx.get_var("missing");
            assert_eq!(v.as_error().map(|e| e.code.as_str()), Some(codes::UNDEFINED_VAR));
        }

        #[test]
        fn test_set_var() {
            let mut ctx = RequestContext::new(registry());
            ctx.set_var("lang", Value::from("de"));
            assert_eq!(ctx.get_var("lang").as_text(), Some("de"));
        }

        #[test]
        fn test_privilege_follows_capability() {
            let ctx = RequestContext::new(registry())
                .with_viewer(Viewer::logged_in().with_capability("manage_options"));
            assert!(ctx.is_privileged());

            let ctx = RequestContext::new(registry())
                .with_viewer(Viewer::logged_in().with_capability("manage_options"))
                .with_privileged_capability("edit_theme_options");
            assert!(!ctx.is_privileged());

            let ctx = RequestContext::new(registry());
            assert!(!ctx.is_privileged());
        }

        #[test]
        fn test_queried_accessors() {
            let ctx = RequestContext::new(registry()).with_post(Post::page(5, "about", "About"));
            assert_eq!(ctx.post().map(|p| p.id), Some(5));
            assert!(ctx.term().is_none());

            let ctx = RequestContext::new(registry()).with_term(Term::category(3, "news", "News"));
            assert_eq!(ctx.term().map(|t| t.slug.as_str()), Some("news"));
            assert!(ctx.post().is_none());
        }

        #[test]
        fn test_queried_deserializes_from_json() {
            let q: Queried = serde_json::from_str(
                r#"{"kind": "post", "id": 9, "slug": "hello", "title": "Hello", "post_type": "post"}"#,
            ).unwrap();
            assert!(matches!(q, Queried::Post(ref p) if p.id == 9 && p.terms.is_empty()));
        }
    }
}
