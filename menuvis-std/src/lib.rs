//! menuvis Standard Library
//!
//! The conditional predicates a visibility expression may call out of the box.

pub mod predicates;
mod helpers;

use menuvis_plugin::{AllowList, PredicateRegistry};

/// Load standard library into registry
pub fn load_standard_library(registry: PredicateRegistry) -> PredicateRegistry {
    registry
        // Query
        .with_predicate(predicates::IsPage)
        .with_predicate(predicates::IsSingle)
        .with_predicate(predicates::IsSingular)
        .with_predicate(predicates::IsFrontPage)
        .with_predicate(predicates::IsHome)
        .with_predicate(predicates::IsArchive)
        .with_predicate(predicates::IsSearch)
        .with_predicate(predicates::Is404)
        .with_predicate(predicates::IsPostTypeArchive)
        .with_predicate(predicates::IsPageTemplate)
        .with_predicate(predicates::GetPostType)
        .with_predicate(predicates::GetTheId)
        // Taxonomy
        .with_predicate(predicates::IsCategory)
        .with_predicate(predicates::IsTag)
        .with_predicate(predicates::InCategory)
        .with_predicate(predicates::HasTag)
        // Viewer
        .with_predicate(predicates::IsUserLoggedIn)
        .with_predicate(predicates::CurrentUserCan)
        .with_predicate(predicates::UserHasRole)
        // Utility
        .with_predicate(predicates::Count)
        .with_predicate(predicates::InArray)
}

/// Create registry with standard library
pub fn standard_registry() -> PredicateRegistry {
    load_standard_library(PredicateRegistry::new())
}

/// Allow-list naming every standard predicate
pub fn default_allow_list() -> AllowList {
    AllowList::from_registry(&standard_registry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuvis_core::Value;
    use menuvis_plugin::{Post, RequestContext};
    use std::sync::Arc;

    #[test]
    fn test_standard_registry_contents() {
        let reg = standard_registry();
        assert_eq!(reg.names().len(), 21);
        for name in ["is_page", "is_front_page", "get_the_ID", "current_user_can", "count", "in_array"] {
            assert!(reg.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_default_allow_list_matches_registry() {
        let list = default_allow_list();
        assert_eq!(list.len(), 21);
        assert!(list.contains("get_the_id"));
        assert!(!list.contains("shell_exec"));
        assert!(!list.contains("eval"));
    }

    #[test]
    fn test_call_through_context() {
        let ctx = RequestContext::new(Arc::new(standard_registry()))
            .with_post(Post::page(5, "about", "About"));
        assert_eq!(ctx.call("IS_PAGE", &[Value::Number(5)]).as_bool(), Some(true));
        assert_eq!(ctx.call("get_the_id", &[]).as_number(), Some(5));
    }

    #[test]
    fn test_every_predicate_documents_itself() {
        let reg = standard_registry();
        for meta in reg.list_predicates(None) {
            assert!(!meta.description.is_empty(), "{} lacks a description", meta.name);
            assert!(meta.usage.starts_with(meta.name), "{} usage mismatch", meta.name);
            assert!(!meta.examples.is_empty(), "{} lacks examples", meta.name);
        }
    }
}
