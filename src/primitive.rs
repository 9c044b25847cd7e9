//! Scalar-leaf reader (`spec.md` §4.1).
//!
//! The exclusive entry point for interpreting a JSON string/integer/boolean
//! found where an expression is expected. Grounded on
//! `json_parse_immediate_expr` in `parser_json.c`.

use serde_json::Value;

use crate::context::{ContextFlags, ParseContext};
use crate::error::ParseErrorKind;
use crate::expr::{Constant, ConstantKind, Expression};
use crate::registry;

/// Reads a scalar leaf (`string`, `integer`, `boolean`) into an
/// [`Expression`]. `real`/`null` are never passed in here; the caller
/// rejects those before delegating.
pub fn parse_primitive(ctx: &mut ParseContext, value: &Value) -> Option<Expression> {
    match value {
        Value::String(s) => Some(parse_string(ctx, s)),
        Value::Number(n) => {
            let Some(n) = n.as_i64() else {
                return ctx.error(ParseErrorKind::Structural(
                    "expected an integer".into(),
                ));
            };
            Some(Expression::String(n.to_string()))
        }
        Value::Bool(b) => {
            if !ctx.flags().contains(ContextFlags::RHS) {
                return ctx.error(ParseErrorKind::Context {
                    kind: "boolean immediate".into(),
                    context: format!("{}", ctx.flags()),
                });
            }
            Some(Expression::Constant(Constant {
                kind: ConstantKind::Boolean,
                bytes: vec![*b as u8],
            }))
        }
        Value::Null => ctx.error(ParseErrorKind::Structural(
            "null is not valid in an expression slot".into(),
        )),
        Value::Array(_) | Value::Object(_) => ctx.error(ParseErrorKind::Structural(
            "expected a scalar value".into(),
        )),
    }
}

fn parse_string(ctx: &mut ParseContext, s: &str) -> Expression {
    if let Some(name) = s.strip_prefix('@') {
        let _ = name;
        return Expression::String(s.to_string());
    }
    if ctx.flags().contains(ContextFlags::RHS) {
        if registry::is_keyword(s) {
            return Expression::String(s.to_string());
        }
        if let Some((dtype, byte)) = registry::lookup_constant(s) {
            let kind = match dtype {
                registry::ConstantDatatype::InetProtocol => ConstantKind::InetProtocol,
                registry::ConstantDatatype::IcmpType => ConstantKind::IcmpType,
            };
            return Expression::Constant(Constant {
                kind,
                bytes: vec![byte],
            });
        }
    }
    Expression::String(s.to_string())
}
