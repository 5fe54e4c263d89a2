//! Expression evaluator
//!
//! Walks a parsed expression against the request context. Faults travel as
//! `Value::Error` and surface from `visibility` as `Err`.

use crate::ast::{BinOp, Expr, UnaryOp};
use menuvis_core::{Value, VisError};
use menuvis_plugin::RequestContext;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Is the item visible under this expression?
    pub fn visibility(&self, expr: &Expr, ctx: &RequestContext) -> Result<bool, VisError> {
        self.eval_expr(expr, ctx).truthy()
    }

    pub fn eval_expr(&self, expr: &Expr, ctx: &RequestContext) -> Value {
        match expr {
            Expr::Number(n) => Value::Number(*n),
            Expr::Str(s) => Value::Text(s.clone()),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Null => Value::Null,
            Expr::Variable(name) => ctx.get_var(name),

            Expr::List(items) => {
                let values: Vec<Value> = items.iter().map(|e| self.eval_expr(e, ctx)).collect();
                match values.iter().find(|v| v.is_error()) {
                    Some(err) => err.clone(),
                    None => Value::List(values),
                }
            }

            Expr::Call(name, args) => {
                let evaluated: Vec<Value> = args.iter().map(|a| self.eval_expr(a, ctx)).collect();
                match ctx.call(name, &evaluated) {
                    Value::Error(e) => Value::Error(e.with_note(format!("in {}()", name))),
                    v => v,
                }
            }

            Expr::Unary(UnaryOp::Not, inner) => match self.eval_expr(inner, ctx).truthy() {
                Ok(b) => Value::Bool(!b),
                Err(e) => Value::Error(e),
            },

            Expr::Binary(left, BinOp::And, right) => self.eval_logic(left, right, false, ctx),
            Expr::Binary(left, BinOp::Or, right) => self.eval_logic(left, right, true, ctx),

            Expr::Binary(left, op, right) => {
                let l = self.eval_expr(left, ctx);
                let r = self.eval_expr(right, ctx);
                self.eval_comparison(l, *op, r)
            }
        }
    }

    /// `&&` / `||` with short-circuit; `short` is the left value that decides alone
    fn eval_logic(&self, left: &Expr, right: &Expr, short: bool, ctx: &RequestContext) -> Value {
        match self.eval_expr(left, ctx).truthy() {
            Ok(b) if b == short => Value::Bool(short),
            Ok(_) => match self.eval_expr(right, ctx).truthy() {
                Ok(b) => Value::Bool(b),
                Err(e) => Value::Error(e.with_note("from right operand")),
            },
            Err(e) => Value::Error(e.with_note("from left operand")),
        }
    }

    fn eval_comparison(&self, left: Value, op: BinOp, right: Value) -> Value {
        if let Value::Error(e) = &left {
            return Value::Error(e.clone().with_note("from left operand"));
        }
        if let Value::Error(e) = &right {
            return Value::Error(e.clone().with_note("from right operand"));
        }

        match op {
            BinOp::Eq => Value::Bool(left.loose_eq(&right)),
            BinOp::NotEq => Value::Bool(!left.loose_eq(&right)),
            _ => match left.compare(&right) {
                Ok(ord) => Value::Bool(match op {
                    BinOp::Lt => ord == Ordering::Less,
                    BinOp::Le => ord != Ordering::Greater,
                    BinOp::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                }),
                Err(e) => Value::Error(e.with_note(format!("in '{}' comparison", op.symbol()))),
            },
        }
    }
}
