//! Query predicates: what kind of page is being viewed

use menuvis_plugin::prelude::*;
use crate::helpers::{check_arity, matches_identity, matches_name, propagate_error, to_value, Identity};

pub struct IsPage;
pub struct IsSingle;
pub struct IsSingular;
pub struct IsFrontPage;
pub struct IsHome;
pub struct IsArchive;
pub struct IsSearch;
pub struct Is404;
pub struct IsPostTypeArchive;
pub struct IsPageTemplate;
pub struct GetPostType;
pub struct GetTheId;

static NO_ARGS: [ArgMeta; 0] = [];

static PAGE_ARGS: [ArgMeta; 1] = [ArgMeta { name: "page", typ: "Number|Text|List", description: "Page id, slug or title (or a list of them)", optional: true }];
static PAGE_EXAMPLES: [&str; 3] = ["is_page()", "is_page(5)", "is_page(['about', 'contact'])"];

static SINGLE_ARGS: [ArgMeta; 1] = [ArgMeta { name: "post", typ: "Number|Text|List", description: "Post id, slug or title (or a list of them)", optional: true }];
static SINGLE_EXAMPLES: [&str; 2] = ["is_single()", "is_single('hello-world')"];

static SINGULAR_ARGS: [ArgMeta; 1] = [ArgMeta { name: "post_types", typ: "Text|List", description: "Post type name(s)", optional: true }];
static SINGULAR_EXAMPLES: [&str; 2] = ["is_singular()", "is_singular(['post', 'product'])"];

static FRONT_PAGE_EXAMPLES: [&str; 1] = ["is_front_page()"];
static HOME_EXAMPLES: [&str; 1] = ["is_home()"];
static ARCHIVE_EXAMPLES: [&str; 1] = ["is_archive()"];
static SEARCH_EXAMPLES: [&str; 1] = ["is_search()"];
static NOT_FOUND_EXAMPLES: [&str; 1] = ["is_404()"];

static PT_ARCHIVE_ARGS: [ArgMeta; 1] = [ArgMeta { name: "post_types", typ: "Text|List", description: "Post type name(s)", optional: true }];
static PT_ARCHIVE_EXAMPLES: [&str; 2] = ["is_post_type_archive()", "is_post_type_archive('product')"];

static TEMPLATE_ARGS: [ArgMeta; 1] = [ArgMeta { name: "template", typ: "Text|List", description: "Template file name(s)", optional: true }];
static TEMPLATE_EXAMPLES: [&str; 2] = ["is_page_template()", "is_page_template('full-width.php')"];

static POST_TYPE_EXAMPLES: [&str; 1] = ["get_post_type() == 'product'"];
static THE_ID_EXAMPLES: [&str; 1] = ["get_the_ID() == 42"];

/// Match the optional selector argument against a post
fn select_post(func: &str, args: &[Value], post: &Post) -> Result<bool, VisError> {
    match args.first() {
        None => Ok(true),
        Some(arg) => matches_identity(arg, &Identity { id: post.id, slug: &post.slug, title: &post.title }, func),
    }
}

/// Predicates taking no arguments that read a single flag
fn flag_predicate(func: &str, args: &[Value], flag: bool) -> Value {
    if let Some(err) = propagate_error(args) {
        return err;
    }
    to_value(check_arity(func, args, 0, 0).map(|_| flag))
}

impl PredicatePlugin for IsPage {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_page",
            description: "True when a page (optionally one of the given pages) is displayed",
            usage: "is_page(page?)",
            args: &PAGE_ARGS,
            returns: "Bool",
            examples: &PAGE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("is_page", args, 0, 1).and_then(|_| match ctx.post() {
            Some(post) if post.post_type == "page" => select_post("is_page", args, post),
            _ => Ok(false),
        }))
    }
}

impl PredicatePlugin for IsSingle {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_single",
            description: "True when a single post of any type except page and attachment is displayed",
            usage: "is_single(post?)",
            args: &SINGLE_ARGS,
            returns: "Bool",
            examples: &SINGLE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("is_single", args, 0, 1).and_then(|_| match ctx.post() {
            Some(post) if post.post_type != "page" && post.post_type != "attachment" => {
                select_post("is_single", args, post)
            }
            _ => Ok(false),
        }))
    }
}

impl PredicatePlugin for IsSingular {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_singular",
            description: "True when any single post, page or attachment is displayed",
            usage: "is_singular(post_types?)",
            args: &SINGULAR_ARGS,
            returns: "Bool",
            examples: &SINGULAR_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("is_singular", args, 0, 1).and_then(|_| match (ctx.post(), args.first()) {
            (None, _) => Ok(false),
            (Some(_), None) => Ok(true),
            (Some(post), Some(types)) => matches_name(types, &post.post_type, "is_singular"),
        }))
    }
}

impl PredicatePlugin for IsFrontPage {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_front_page",
            description: "True on the site front page",
            usage: "is_front_page()",
            args: &NO_ARGS,
            returns: "Bool",
            examples: &FRONT_PAGE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        flag_predicate("is_front_page", args, ctx.flags.front_page)
    }
}

impl PredicatePlugin for IsHome {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_home",
            description: "True on the blog posts index",
            usage: "is_home()",
            args: &NO_ARGS,
            returns: "Bool",
            examples: &HOME_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        flag_predicate("is_home", args, ctx.flags.home)
    }
}

impl PredicatePlugin for IsArchive {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_archive",
            description: "True on any term or post type archive",
            usage: "is_archive()",
            args: &NO_ARGS,
            returns: "Bool",
            examples: &ARCHIVE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        let archive = ctx.term().is_some() || ctx.flags.post_type_archive.is_some();
        flag_predicate("is_archive", args, archive)
    }
}

impl PredicatePlugin for IsSearch {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_search",
            description: "True on search result pages",
            usage: "is_search()",
            args: &NO_ARGS,
            returns: "Bool",
            examples: &SEARCH_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        flag_predicate("is_search", args, ctx.flags.search)
    }
}

impl PredicatePlugin for Is404 {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_404",
            description: "True when the request matched nothing",
            usage: "is_404()",
            args: &NO_ARGS,
            returns: "Bool",
            examples: &NOT_FOUND_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        flag_predicate("is_404", args, ctx.flags.not_found)
    }
}

impl PredicatePlugin for IsPostTypeArchive {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_post_type_archive",
            description: "True on a post type archive (optionally of the given types)",
            usage: "is_post_type_archive(post_types?)",
            args: &PT_ARCHIVE_ARGS,
            returns: "Bool",
            examples: &PT_ARCHIVE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("is_post_type_archive", args, 0, 1).and_then(|_| {
            match (&ctx.flags.post_type_archive, args.first()) {
                (None, _) => Ok(false),
                (Some(_), None) => Ok(true),
                (Some(archived), Some(types)) => matches_name(types, archived, "is_post_type_archive"),
            }
        }))
    }
}

impl PredicatePlugin for IsPageTemplate {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_page_template",
            description: "True when the displayed page uses a custom template (optionally one of the given ones)",
            usage: "is_page_template(template?)",
            args: &TEMPLATE_ARGS,
            returns: "Bool",
            examples: &TEMPLATE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        let template = ctx.post()
            .filter(|p| p.post_type == "page")
            .and_then(|p| p.template.as_deref());
        to_value(check_arity("is_page_template", args, 0, 1).and_then(|_| match (template, args.first()) {
            (None, _) => Ok(false),
            (Some(_), None) => Ok(true),
            (Some(t), Some(wanted)) => matches_name(wanted, t, "is_page_template"),
        }))
    }
}

impl PredicatePlugin for GetPostType {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "get_post_type",
            description: "Post type of the displayed post, or null",
            usage: "get_post_type()",
            args: &NO_ARGS,
            returns: "Text|Null",
            examples: &POST_TYPE_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Err(e) = check_arity("get_post_type", args, 0, 0) {
            return Value::Error(e);
        }
        match ctx.post() {
            Some(post) => Value::Text(post.post_type.clone()),
            None => Value::Null,
        }
    }
}

impl PredicatePlugin for GetTheId {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "get_the_ID",
            description: "Id of the displayed post, or null",
            usage: "get_the_ID()",
            args: &NO_ARGS,
            returns: "Number|Null",
            examples: &THE_ID_EXAMPLES,
            category: "query",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Err(e) = check_arity("get_the_ID", args, 0, 0) {
            return Value::Error(e);
        }
        match ctx.post().map(|p| i64::try_from(p.id)) {
            Some(Ok(id)) => Value::Number(id),
            Some(Err(_)) => Value::Error(VisError::type_error("Number", "out-of-range id")),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuvis_plugin::QueryFlags;
    use std::sync::Arc;

    fn ctx() -> RequestContext {
        RequestContext::new(Arc::new(PredicateRegistry::new()))
    }

    fn about_page() -> RequestContext {
        ctx().with_post(Post::page(5, "about", "About").with_template("wide.php"))
    }

    #[test]
    fn test_is_page() {
        let c = about_page();
        assert_eq!(IsPage.call(&[], &c).as_bool(), Some(true));
        assert_eq!(IsPage.call(&[Value::Number(5)], &c).as_bool(), Some(true));
        assert_eq!(IsPage.call(&[Value::Number(6)], &c).as_bool(), Some(false));
        assert_eq!(IsPage.call(&[Value::from("about")], &c).as_bool(), Some(true));

        let post = ctx().with_post(Post::post(5, "about", "About"));
        assert_eq!(IsPage.call(&[Value::Number(5)], &post).as_bool(), Some(false));
        assert_eq!(IsPage.call(&[], &ctx()).as_bool(), Some(false));
    }

    #[test]
    fn test_is_page_too_many_args() {
        let result = IsPage.call(&[Value::Number(1), Value::Number(2)], &about_page());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::ARG_COUNT));
    }

    #[test]
    fn test_is_single_excludes_pages() {
        let post = ctx().with_post(Post::post(9, "hello", "Hello"));
        assert_eq!(IsSingle.call(&[], &post).as_bool(), Some(true));
        assert_eq!(IsSingle.call(&[Value::from("hello")], &post).as_bool(), Some(true));
        assert_eq!(IsSingle.call(&[], &about_page()).as_bool(), Some(false));
    }

    #[test]
    fn test_is_singular_by_type() {
        let product = ctx().with_post(Post::new(3, "product", "mug", "Mug"));
        assert_eq!(IsSingular.call(&[], &product).as_bool(), Some(true));
        let types = Value::List(vec![Value::from("post"), Value::from("product")]);
        assert_eq!(IsSingular.call(&[types], &product).as_bool(), Some(true));
        assert_eq!(IsSingular.call(&[Value::from("page")], &product).as_bool(), Some(false));
    }

    #[test]
    fn test_flags() {
        let c = ctx().with_flags(QueryFlags { front_page: true, search: true, ..QueryFlags::default() });
        assert_eq!(IsFrontPage.call(&[], &c).as_bool(), Some(true));
        assert_eq!(IsHome.call(&[], &c).as_bool(), Some(false));
        assert_eq!(IsSearch.call(&[], &c).as_bool(), Some(true));
        assert_eq!(Is404.call(&[], &c).as_bool(), Some(false));
        assert!(IsHome.call(&[Value::Number(1)], &c).is_error());
    }

    #[test]
    fn test_archives() {
        let term = ctx().with_term(Term::category(2, "news", "News"));
        assert_eq!(IsArchive.call(&[], &term).as_bool(), Some(true));

        let products = ctx().with_flags(QueryFlags {
            post_type_archive: Some("product".to_string()),
            ..QueryFlags::default()
        });
        assert_eq!(IsArchive.call(&[], &products).as_bool(), Some(true));
        assert_eq!(IsPostTypeArchive.call(&[], &products).as_bool(), Some(true));
        assert_eq!(IsPostTypeArchive.call(&[Value::from("product")], &products).as_bool(), Some(true));
        assert_eq!(IsPostTypeArchive.call(&[Value::from("event")], &products).as_bool(), Some(false));
        assert_eq!(IsArchive.call(&[], &about_page()).as_bool(), Some(false));
    }

    #[test]
    fn test_is_page_template() {
        let c = about_page();
        assert_eq!(IsPageTemplate.call(&[], &c).as_bool(), Some(true));
        assert_eq!(IsPageTemplate.call(&[Value::from("wide.php")], &c).as_bool(), Some(true));
        assert_eq!(IsPageTemplate.call(&[Value::from("narrow.php")], &c).as_bool(), Some(false));
        let plain = ctx().with_post(Post::page(6, "contact", "Contact"));
        assert_eq!(IsPageTemplate.call(&[], &plain).as_bool(), Some(false));
    }

    #[test]
    fn test_getters() {
        let c = about_page();
        assert_eq!(GetPostType.call(&[], &c).as_text(), Some("page"));
        assert_eq!(GetTheId.call(&[], &c).as_number(), Some(5));
        assert!(GetPostType.call(&[], &ctx()).is_null());
        assert!(GetTheId.call(&[], &ctx()).is_null());
    }

    #[test]
    fn test_error_argument_propagates() {
        let err = Value::Error(VisError::undefined_var("page"));
        let result = IsPage.call(&[err], &about_page());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::UNDEFINED_VAR));
    }
}
