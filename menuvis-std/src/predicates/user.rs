//! Viewer predicates

use menuvis_plugin::prelude::*;
use crate::helpers::{check_arity, propagate_error, require_text, to_value};

pub struct IsUserLoggedIn;
pub struct CurrentUserCan;
pub struct UserHasRole;

static NO_ARGS: [ArgMeta; 0] = [];
static LOGGED_IN_EXAMPLES: [&str; 2] = ["is_user_logged_in()", "!is_user_logged_in()"];

static CAN_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "capability", typ: "Text", description: "Capability or role name", optional: false },
];
static CAN_EXAMPLES: [&str; 2] = ["current_user_can('edit_posts')", "current_user_can('administrator')"];

static ROLE_ARGS: [ArgMeta; 1] = [
    ArgMeta { name: "roles", typ: "Text|List", description: "Role name(s); any one suffices", optional: false },
];
static ROLE_EXAMPLES: [&str; 2] = ["user_has_role('editor')", "user_has_role(['editor', 'author'])"];

impl PredicatePlugin for IsUserLoggedIn {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "is_user_logged_in",
            description: "True when the viewer is logged in",
            usage: "is_user_logged_in()",
            args: &NO_ARGS,
            returns: "Bool",
            examples: &LOGGED_IN_EXAMPLES,
            category: "user",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(check_arity("is_user_logged_in", args, 0, 0).map(|_| ctx.viewer.logged_in))
    }
}

impl PredicatePlugin for CurrentUserCan {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "current_user_can",
            description: "True when the viewer holds the capability (role names are accepted too)",
            usage: "current_user_can(capability)",
            args: &CAN_ARGS,
            returns: "Bool",
            examples: &CAN_EXAMPLES,
            category: "user",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        to_value(
            check_arity("current_user_can", args, 1, 1)
                .and_then(|_| require_text(&args[0], "current_user_can", "capability"))
                .map(|cap| ctx.viewer.can(cap) || ctx.viewer.has_role(cap)),
        )
    }
}

impl PredicatePlugin for UserHasRole {
    fn meta(&self) -> PredicateMeta {
        PredicateMeta {
            name: "user_has_role",
            description: "True when the viewer has any of the given roles",
            usage: "user_has_role(roles)",
            args: &ROLE_ARGS,
            returns: "Bool",
            examples: &ROLE_EXAMPLES,
            category: "user",
        }
    }

    fn call(&self, args: &[Value], ctx: &RequestContext) -> Value {
        if let Some(err) = propagate_error(args) {
            return err;
        }
        if let Err(e) = check_arity("user_has_role", args, 1, 1) {
            return Value::Error(e);
        }
        let roles: Vec<&Value> = match &args[0] {
            Value::List(items) => items.iter().collect(),
            single => vec![single],
        };
        let mut any = false;
        for role in roles {
            match require_text(role, "user_has_role", "roles") {
                Ok(r) => any = any || ctx.viewer.has_role(r),
                Err(e) => return Value::Error(e),
            }
        }
        Value::Bool(any)
    }
}
