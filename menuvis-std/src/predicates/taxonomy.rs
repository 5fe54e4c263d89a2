//! Taxonomy predicates: categories and tags

use menuvis_plugin::prelude::*;
use crate::helpers::{check_arity, matches_identity, propagate_error, to_value, Identity};

const CATEGORY: &str = "category";
const TAG: &str = "post_tag";

pub struct IsCategory;
pub struct IsTag;
pub struct InCategory;
pub struct HasTag;

static CATEGORY_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "category", typ: "Number|Text|List", description: "Category id, slug or name (or a list of them)", optional: true },
];
static CATEGORY_EXAMPLES: [&str; 2] = ["is_category()", "is_category('news')"];

static TAG_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "tag", typ: "Number|Text|List", description: "Tag id, slug or name (or a list of them)", optional: true },
];
static TAG_EXAMPLES: [&str; 2] = ["is_tag()", "is_tag(['sale', 'new'])"];

static IN_CATEGORY_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "category", typ: "Number|Text|List", description: "Category id, slug or name (or a list of them)", optional: false },
];
static IN_CATEGORY_EXAMPLES: [&str; 2] = ["in_category('news')", "in_category([3, 'events'])"];

static HAS_TAG_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "tag", typ: "Number|Text|List", description: "Tag id, slug or name (or a list of them)", optional: true },
];
static HAS_TAG_EXAMPLES: [&str; 2] = ["has_tag()", "has_tag('featured')"];

fn term_identity(term: &Term) -> Identity<'_> {
    Identity { id: term.id, slug: &term.slug, title: &term.name }
}

/// Is the request an archive of `taxonomy`, optionally of the selected term?
fn term_archive(func: &str, taxonomy: &str, args: &[Value], ctx: &RequestContext) -> Value {
    if let Some(err) = propagate_error(args) {
        return err;
    }
    to_value(check_arity(func, args, 0, 1).and_then(|_| match (ctx.term(), args.first()) {
        (Some(term), None) => Ok(term.taxonomy == taxonomy),
        (Some(term), Some(sel)) if term.taxonomy == taxonomy => matches_identity(sel, &term_identity(term), func),
        _ => Ok(false),
    }))
}

/// Does the displayed post carry a term of `taxonomy`, optionally the selected one?
fn post_has_term(func: &str, taxonomy: &str, args: &[Value], ctx: &RequestContext) -> Result<bool, VisError> {
    let Some(post) = ctx.post() else {
        return Ok(false);
    };
    let Some(sel) = args.first() else {
        return Ok(post.terms_in(taxonomy).next().is_some());
    };
    for term in post.terms_in(taxonomy) {
        if matches_identity(sel, &term_identity(term), func)? {
            return Ok(true);
        }
    }
    Ok(false)
}

impl PredicatePlugin for IsCategory {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_category",
            description: "True on a category archive (optionally of the given categories)",
            usage: "is_category(category?)",
            args: &CATEGORY_ARGS,
            returns: "Bool",
            examples: &CATEGORY_EXAMPLES,
            category: "taxonomy",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        term_archive("is_category", CATEGORY, args, ctx)
    }
}

impl PredicatePlugin for IsTag {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_tag",
            description: "True on a tag archive (optionally of the given tags)",
            usage: "is_tag(tag?)",
            args: &TAG_ARGS,
            returns: "Bool",
            examples: &TAG_EXAMPLES,
            category: "taxonomy",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        term_archive("is_tag", TAG, args, ctx)
    }
}

impl PredicatePlugin for InCategory {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "in_category",
            description: "True when the displayed post is filed under one of the given categories",
            usage: "in_category(category)",
            args: &IN_CATEGORY_ARGS,
            returns: "Bool",
            examples: &IN_CATEGORY_EXAMPLES,
            category: "taxonomy",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("in_category", args, 1, 1).and_then(|_| post_has_term("in_category", CATEGORY, args, ctx)))
    }
}

impl PredicatePlugin for HasTag {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "has_tag",
            description: "True when the displayed post has any tag (optionally one of the given tags)",
            usage: "has_tag(tag?)",
            args: &HAS_TAG_ARGS,
            returns: "Bool",
            examples: &HAS_TAG_EXAMPLES,
            category: "taxonomy",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("has_tag", args, 0, 1).and_then(|_| post_has_term("has_tag", TAG, args, ctx)))
    }
}
