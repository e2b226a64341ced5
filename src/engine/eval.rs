//! Expression-tree evaluation for compiled templates
//!
//! Segments are replayed per render call: literals are copied through and
//! placeholder expressions are evaluated against the parameter scope and the
//! engine, then string-coerced. Helper and include names are looked up here,
//! at call time, never at compile time.

use crate::parser::ast::{BinaryOp, Expr, Segment, Spanned};
use crate::value::Value;

use super::{Engine, RenderError};

/// Name bound to the live helpers view inside every placeholder
const HELPERS_BINDING: &str = "helpers";
/// Name bound to the include resolver inside every placeholder
const INCLUDE_BINDING: &str = "include";

/// Positional parameter bindings for one render call
struct Scope<'a> {
    params: &'a [String],
    args: &'a [Value],
}

impl Scope<'_> {
    /// Parameters bind by position. Missing trailing arguments bind to
    /// `undefined`; surplus arguments are ignored.
    fn lookup(&self, name: &str) -> Option<Value> {
        self.params
            .iter()
            .position(|p| p == name)
            .map(|idx| self.args.get(idx).cloned().unwrap_or(Value::Undefined))
    }
}

pub(crate) fn render_segments(
    segments: &[Segment],
    params: &[String],
    args: &[Value],
    engine: &Engine,
) -> Result<String, RenderError> {
    let scope = Scope { params, args };
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(expr) => {
                let value = eval(&expr.node, &scope, engine)?;
                out.push_str(&value.to_string());
            }
        }
    }
    Ok(out)
}

fn eval(expr: &Expr, scope: &Scope, engine: &Engine) -> Result<Value, RenderError> {
    match expr {
        Expr::Undefined => Ok(Value::Undefined),
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),

        Expr::Ident(name) => match name.as_str() {
            // The bindings are call targets, not values
            HELPERS_BINDING | INCLUDE_BINDING => Err(RenderError::Eval {
                message: format!("`{}` cannot be used as a plain value", name),
            }),
            _ => scope.lookup(name).ok_or_else(|| RenderError::Eval {
                message: format!("unknown name `{}`", name),
            }),
        },

        Expr::Member { object, property } => {
            if ident_is(object, HELPERS_BINDING) {
                return Err(RenderError::Eval {
                    message: format!("helper `{}` must be called, not read", property),
                });
            }
            let value = eval(&object.node, scope, engine)?;
            member(&value, property)
        }

        Expr::Index { object, index } => {
            let value = eval(&object.node, scope, engine)?;
            let idx = eval(&index.node, scope, engine)?;
            index_value(&value, &idx)
        }

        Expr::Call { callee, args } => match &callee.node {
            Expr::Member { object, property } if ident_is(object, HELPERS_BINDING) => {
                let argv = eval_args(args, scope, engine)?;
                engine.call_helper(property, &argv)
            }
            Expr::Ident(name) if name == INCLUDE_BINDING => {
                if args.is_empty() {
                    return Err(RenderError::Eval {
                        message: "include requires a template name".to_string(),
                    });
                }
                let argv = eval_args(args, scope, engine)?;
                let name = match &argv[0] {
                    Value::Str(s) => s.clone(),
                    other => other.to_string(),
                };
                engine.include(&name, &argv[1..]).map(Value::Str)
            }
            _ => Err(RenderError::Eval {
                message: "only helpers.<name>(...) and include(...) can be called".to_string(),
            }),
        },

        Expr::Binary { op, left, right } => {
            let l = eval(&left.node, scope, engine)?;
            let r = eval(&right.node, scope, engine)?;
            Ok(match op {
                BinaryOp::Add => match (&l, &r) {
                    (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                    _ => Value::Str(format!("{}{}", l, r)),
                },
                BinaryOp::Eq => Value::Bool(l == r),
                BinaryOp::Ne => Value::Bool(l != r),
            })
        }

        Expr::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            if eval(&condition.node, scope, engine)?.is_truthy() {
                eval(&then_branch.node, scope, engine)
            } else {
                eval(&else_branch.node, scope, engine)
            }
        }
    }
}

fn eval_args(
    args: &[Spanned<Expr>],
    scope: &Scope,
    engine: &Engine,
) -> Result<Vec<Value>, RenderError> {
    args.iter().map(|a| eval(&a.node, scope, engine)).collect()
}

fn ident_is(expr: &Spanned<Expr>, name: &str) -> bool {
    matches!(&expr.node, Expr::Ident(id) if id == name)
}

/// Property access: absent members are `undefined`, but reading through
/// `undefined`/`null` itself is an error
fn member(value: &Value, property: &str) -> Result<Value, RenderError> {
    match value {
        Value::Undefined | Value::Null => Err(RenderError::Eval {
            message: format!("cannot read `{}` of {}", property, value),
        }),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Undefined)),
        Value::Str(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
        _ => Ok(Value::Undefined),
    }
}

fn index_value(value: &Value, idx: &Value) -> Result<Value, RenderError> {
    match value {
        Value::Undefined | Value::Null => Err(RenderError::Eval {
            message: format!("cannot index into {}", value),
        }),
        Value::Array(items) => {
            let Some(n) = idx.as_number() else {
                return Ok(Value::Undefined);
            };
            if n.fract() != 0.0 || n < 0.0 {
                return Ok(Value::Undefined);
            }
            Ok(items.get(n as usize).cloned().unwrap_or(Value::Undefined))
        }
        Value::Object(map) => match idx {
            Value::Str(key) => Ok(map.get(key).cloned().unwrap_or(Value::Undefined)),
            _ => Ok(Value::Undefined),
        },
        _ => Ok(Value::Undefined),
    }
}
