//! Statement dispatcher and builders (`spec.md` §4.3).
//!
//! Grounded on the `json_parse_*_stmt` functions and their dispatch table in
//! `parser_json.c`.

use std::collections::HashSet;

use serde_json::Value;

use crate::context::{ContextFlags, ParseContext, PathSegment};
use crate::error::ParseErrorKind;
use crate::expr_parser;
use crate::registry;
use crate::stmt::{
    AnonymousCounter, Counter, Dup, Flow, JumpTarget, Limit, Log, LogFlag, LogLevel, Mangle,
    Match, Meter, Operator, Queue, QueueFlag, Quota, Reject, RejectType, SetOp, Statement, NAT,
    NATFamily, NATFlag, Set as SetStmt, VerdictMap, FWD, FWDFamily,
};

type Builder = fn(&mut ParseContext, &Value) -> Option<Statement>;

const STMT_KINDS: &[(&str, Builder)] = &[
    ("match", build_match),
    ("counter", build_counter),
    ("accept", build_accept),
    ("drop", build_drop),
    ("continue", build_continue),
    ("return", build_return),
    ("jump", build_jump),
    ("goto", build_goto),
    ("mangle", build_mangle),
    ("quota", build_quota),
    ("limit", build_limit),
    ("fwd", build_fwd),
    ("flow", build_flow),
    ("notrack", build_notrack),
    ("dup", build_dup),
    ("snat", build_snat),
    ("dnat", build_dnat),
    ("masquerade", build_masquerade),
    ("redirect", build_redirect),
    ("reject", build_reject),
    ("set", build_set_update),
    ("log", build_log),
    ("meter", build_meter),
    ("queue", build_queue),
    ("ct helper", build_ct_helper),
    ("vmap", build_vmap),
];

/// Dispatches a single statement object (`spec.md` §4.3: "input is a one-key
/// object; the key selects a builder from the statement kind table").
pub fn dispatch(ctx: &mut ParseContext, node: &Value) -> Option<Statement> {
    let Some(obj) = node.as_object() else {
        return ctx.error(ParseErrorKind::Structural("statement must be an object".into()));
    };
    if obj.len() != 1 {
        return ctx.error(ParseErrorKind::Structural(
            "statement object must have exactly one key".into(),
        ));
    }
    let (key, operand) = obj.iter().next().unwrap();
    let Some((found_key, builder)) = STMT_KINDS.iter().find(|(k, _)| k == key) else {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "statement kind",
            name: key.clone(),
        });
    };
    ctx.with_path(PathSegment::Key(found_key), |ctx| builder(ctx, operand))
}

fn expr(ctx: &mut ParseContext, flags: ContextFlags, node: &Value) -> Option<crate::expr::Expression> {
    expr_parser::parse_scoped(ctx, flags, node)
}

fn build_match(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let left_node = field(ctx, operand, "left")?;
    let left = ctx.with_path(PathSegment::Key("left"), |ctx| {
        ctx.with_flags(ContextFlags::STMT, |ctx| expr_parser::dispatch(ctx, &left_node))
    })?;
    let right_node = field(ctx, operand, "right")?;
    let right = ctx.with_path(PathSegment::Key("right"), |ctx| expr(ctx, ContextFlags::RHS, &right_node))?;
    let op = match operand.get("op").and_then(Value::as_str) {
        Some(sym) => match op_from_symbol(sym) {
            Some(op) => op,
            None => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "relational operator",
                    name: sym.to_string(),
                })
            }
        },
        None => Operator::EQ,
    };
    Some(Statement::Match(Match { left, right, op }))
}

fn op_from_symbol(sym: &str) -> Option<Operator> {
    if !registry::RELATIONAL_OPERATORS.contains(&sym) {
        return None;
    }
    Some(match sym {
        "&" => Operator::AND,
        "|" => Operator::OR,
        "^" => Operator::XOR,
        "<<" => Operator::LSHIFT,
        ">>" => Operator::RSHIFT,
        "==" => Operator::EQ,
        "!=" => Operator::NEQ,
        ">" => Operator::GT,
        "<" => Operator::LT,
        "<=" => Operator::LEQ,
        ">=" => Operator::GEQ,
        "in" => Operator::IN,
        _ => return None,
    })
}

fn build_counter(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    match operand {
        Value::Null => Some(Statement::Counter(Counter::Anonymous(None))),
        Value::Object(_) => {
            let packets = operand.get("packets").and_then(Value::as_u64).map(|n| n as usize);
            let bytes = operand.get("bytes").and_then(Value::as_u64).map(|n| n as usize);
            Some(Statement::Counter(Counter::Anonymous(Some(AnonymousCounter {
                packets,
                bytes,
            }))))
        }
        Value::String(name) => Some(Statement::Counter(Counter::Named(name.clone()))),
        _ => ctx.error(ParseErrorKind::Structural(
            "counter expects null, an object, or a name string".into(),
        )),
    }
}

fn build_accept(_ctx: &mut ParseContext, _operand: &Value) -> Option<Statement> {
    Some(Statement::Accept(None))
}
fn build_drop(_ctx: &mut ParseContext, _operand: &Value) -> Option<Statement> {
    Some(Statement::Drop(None))
}
fn build_continue(_ctx: &mut ParseContext, _operand: &Value) -> Option<Statement> {
    Some(Statement::Continue(None))
}
fn build_return(_ctx: &mut ParseContext, _operand: &Value) -> Option<Statement> {
    Some(Statement::Return(None))
}
fn build_jump(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let target = require_str(ctx, operand)?;
    Some(Statement::Jump(JumpTarget { target }))
}
fn build_goto(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let target = require_str(ctx, operand)?;
    Some(Statement::Goto(JumpTarget { target }))
}

fn require_str(ctx: &mut ParseContext, operand: &Value) -> Option<String> {
    match operand.as_str() {
        Some(s) => Some(s.to_string()),
        None => ctx.error(ParseErrorKind::Structural("expected a string target".into())),
    }
}

fn build_mangle(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let left_node = field(ctx, operand, "left")?;
    let key = ctx.with_path(PathSegment::Key("left"), |ctx| {
        ctx.with_flags(ContextFlags::MANGLE, |ctx| expr_parser::dispatch(ctx, &left_node))
    })?;
    let is_valid_mangle_target = matches!(
        key,
        crate::expr::Expression::Named(
            crate::expr::NamedExpression::Exthdr(_)
                | crate::expr::NamedExpression::Payload(_)
                | crate::expr::NamedExpression::Meta(_)
                | crate::expr::NamedExpression::CT(_)
        )
    );
    if !is_valid_mangle_target {
        return ctx.error(ParseErrorKind::CrossField(
            "mangle left-hand side must be exthdr, payload, meta or ct".into(),
        ));
    }
    let right_node = field(ctx, operand, "right")?;
    let value = ctx.with_path(PathSegment::Key("right"), |ctx| expr(ctx, ContextFlags::RHS, &right_node))?;
    Some(Statement::Mangle(Mangle { key, value }))
}

// `val_unit`/`rate_unit`/`per`/`burst_unit` are kept as wire-faithful tags,
// not pre-multiplied into bytes/seconds; see DESIGN.md's "quota/limit
// units stay tagged" entry.
fn build_quota(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    if let Value::String(name) = operand {
        return Some(Statement::QuotaRef(name.clone()));
    }
    let val = require_u32(ctx, operand, "val")?;
    let val_unit = operand
        .get("val_unit")
        .and_then(Value::as_str)
        .unwrap_or("bytes")
        .to_string();
    let used = operand.get("used").and_then(Value::as_u64).map(|n| n as u32);
    let used_unit = operand.get("used_unit").and_then(Value::as_str).map(str::to_string);
    let inv = operand.get("inv").and_then(Value::as_bool);
    Some(Statement::Quota(Quota {
        val,
        val_unit,
        used,
        used_unit,
        inv,
    }))
}

fn build_limit(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let rate = require_u32(ctx, operand, "rate")?;
    let rate_unit = operand.get("rate_unit").and_then(Value::as_str).map(str::to_string);
    let per = operand.get("per").and_then(Value::as_str).map(str::to_string);
    let burst = operand.get("burst").and_then(Value::as_u64).map(|n| n as u32);
    let burst_unit = operand.get("burst_unit").and_then(Value::as_str).map(str::to_string);
    let inv = operand.get("inv").and_then(Value::as_bool);
    Some(Statement::Limit(Limit {
        rate,
        rate_unit,
        per,
        burst,
        burst_unit,
        inv,
    }))
}

fn build_fwd(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let dev = optional_expr(ctx, operand, "dev")?;
    let family = match operand.get("family").and_then(Value::as_str) {
        Some("ip") => Some(FWDFamily::IP),
        Some("ip6") => Some(FWDFamily::IP6),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "fwd family",
                name: other.to_string(),
            })
        }
        None => None,
    };
    let addr = optional_expr(ctx, operand, "addr")?;
    Some(Statement::FWD(Some(FWD { dev, family, addr })))
}

fn build_flow(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let op_s = operand.get("op").and_then(Value::as_str).unwrap_or("add");
    let op = match op_s {
        "add" => SetOp::Add,
        "update" => SetOp::Update,
        _ => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "flow operator",
                name: op_s.to_string(),
            })
        }
    };
    let flowtable = require_strfield(ctx, operand, "flowtable")?;
    Some(Statement::Flow(Flow { op, flowtable }))
}

fn build_notrack(_ctx: &mut ParseContext, _operand: &Value) -> Option<Statement> {
    Some(Statement::Notrack)
}

fn build_dup(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let addr_node = field(ctx, operand, "addr")?;
    let addr = ctx.with_path(PathSegment::Key("addr"), |ctx| expr(ctx, ContextFlags::STMT, &addr_node))?;
    let dev = optional_expr(ctx, operand, "dev")?;
    Some(Statement::Dup(Dup { addr, dev }))
}

fn build_nat(ctx: &mut ParseContext, operand: &Value) -> Option<NAT> {
    let addr = optional_expr(ctx, operand, "addr")?;
    let family = match operand.get("family").and_then(Value::as_str) {
        Some("ip") => Some(NATFamily::IP),
        Some("ip6") => Some(NATFamily::IP6),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "nat family",
                name: other.to_string(),
            })
        }
        None => None,
    };
    let port = operand.get("port").and_then(Value::as_u64).map(|n| n as u32);
    let flags = match operand.get("flags") {
        None => None,
        Some(v) => Some(parse_nat_flags(ctx, v)?),
    };
    Some(NAT {
        addr,
        family,
        port,
        flags,
    })
}

fn parse_nat_flags(ctx: &mut ParseContext, v: &Value) -> Option<HashSet<NATFlag>> {
    let names = match v {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect(),
        _ => return ctx.error(ParseErrorKind::Structural("flags must be a string or array".into())),
    };
    let mut out = HashSet::new();
    for name in names {
        out.insert(match name.as_str() {
            "random" => NATFlag::Random,
            "fully-random" => NATFlag::FullyRandom,
            "persistent" => NATFlag::Persistent,
            _ => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "nat flag",
                    name,
                })
            }
        });
    }
    Some(out)
}

fn build_snat(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    if operand.is_null() {
        return Some(Statement::SNAT(None));
    }
    Some(Statement::SNAT(Some(build_nat(ctx, operand)?)))
}
fn build_dnat(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    if operand.is_null() {
        return Some(Statement::DNAT(None));
    }
    Some(Statement::DNAT(Some(build_nat(ctx, operand)?)))
}
fn build_masquerade(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    if operand.is_null() {
        return Some(Statement::Masquerade(None));
    }
    Some(Statement::Masquerade(Some(build_nat(ctx, operand)?)))
}
fn build_redirect(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    if operand.is_null() {
        return Some(Statement::Redirect(None));
    }
    Some(Statement::Redirect(Some(build_nat(ctx, operand)?)))
}

fn build_reject(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    if operand.is_null() {
        return Some(Statement::Reject(None));
    }
    let type_s = operand.get("type").and_then(Value::as_str);
    let _type = match type_s {
        None => None,
        Some("tcp reset") => Some(RejectType::TCPReset),
        Some("icmpx") => Some(RejectType::ICMPX),
        Some("icmp") => Some(RejectType::ICMP),
        Some("icmpv6") => Some(RejectType::ICMPv6),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "reject type",
                name: other.to_string(),
            })
        }
    };
    if let Some(code_s) = operand.get("expr").and_then(Value::as_str) {
        let valid = match _type {
            Some(RejectType::ICMP) => registry::REJECT_CODES_ICMP.contains(&code_s),
            Some(RejectType::ICMPv6) => registry::REJECT_CODES_ICMPV6.contains(&code_s),
            Some(RejectType::ICMPX) | None => registry::REJECT_CODES_ICMPX.contains(&code_s),
            Some(RejectType::TCPReset) => false,
        };
        if !valid {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "reject code",
                name: code_s.to_string(),
            });
        }
    }
    let expr_val = match operand.get("expr") {
        None => None,
        Some(v) => Some(ctx.with_path(PathSegment::Key("expr"), |ctx| {
            ctx.with_flags(ContextFlags::RHS, |ctx| crate::primitive::parse_primitive(ctx, v))
        })?),
    };
    Some(Statement::Reject(Some(Reject::new(_type, expr_val))))
}

fn build_set_update(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let op_s = require_strfield(ctx, operand, "op")?;
    let op = match op_s.as_str() {
        "add" => SetOp::Add,
        "update" => SetOp::Update,
        _ => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "set operator",
                name: op_s,
            })
        }
    };
    let set = require_strfield(ctx, operand, "set")?;
    if !set.starts_with('@') {
        return ctx.error(ParseErrorKind::Structural("'set' must start with '@'".into()));
    }
    let elem_node = field(ctx, operand, "elem")?;
    let elem = ctx.with_path(PathSegment::Key("elem"), |ctx| expr(ctx, ContextFlags::SET_RHS, &elem_node))?;
    Some(Statement::Set(SetStmt { op, elem, set }))
}

fn build_log(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let prefix = operand.get("prefix").and_then(Value::as_str).map(str::to_string);
    let group = operand.get("group").and_then(Value::as_u64).map(|n| n as u32);
    let snaplen = operand.get("snaplen").and_then(Value::as_u64).map(|n| n as u32);
    let queue_threshold = operand
        .get("queue-threshold")
        .and_then(Value::as_u64)
        .map(|n| n as u32);
    let level = match operand.get("level").and_then(Value::as_str) {
        None => None,
        Some(l) => Some(match l {
            "emerg" => LogLevel::Emerg,
            "alert" => LogLevel::Alert,
            "crit" => LogLevel::Crit,
            "err" => LogLevel::Err,
            "warn" => LogLevel::Warn,
            "notice" => LogLevel::Notice,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "audit" => LogLevel::Audit,
            other => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "log level",
                    name: other.to_string(),
                })
            }
        }),
    };
    let flags = match operand.get("flags") {
        None => None,
        Some(v) => {
            let names: Vec<String> = match v {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect(),
                _ => return ctx.error(ParseErrorKind::Structural("flags must be a string or array".into())),
            };
            let mut out = HashSet::new();
            for name in names {
                out.insert(match name.as_str() {
                    "tcp sequence" => LogFlag::TCPSequence,
                    "tcp options" => LogFlag::TCPOptions,
                    "ip options" => LogFlag::IPOptions,
                    "skuid" => LogFlag::Skuid,
                    "ether" => LogFlag::Ether,
                    "all" => LogFlag::All,
                    _ => {
                        return ctx.error(ParseErrorKind::Vocabulary {
                            what: "log flag",
                            name,
                        })
                    }
                });
            }
            Some(out)
        }
    };
    Some(Statement::Log(Some(Log {
        prefix,
        group,
        snaplen,
        queue_threshold,
        level,
        flags,
    })))
}

fn build_meter(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let key_node = field(ctx, operand, "key")?;
    let key = ctx.with_path(PathSegment::Key("key"), |ctx| expr_parser::dispatch(ctx, &key_node))?;
    let stmt_node = field(ctx, operand, "stmt")?;
    let stmt = ctx.with_path(PathSegment::Key("stmt"), |ctx| dispatch(ctx, &stmt_node))?;
    let name = operand
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("__meter")
        .to_string();
    Some(Statement::Meter(Meter {
        name,
        key,
        stmt: Box::new(stmt),
    }))
}

fn build_queue(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let num = optional_expr(ctx, operand, "num")?.unwrap_or(crate::expr::Expression::Number(0));
    let flags = match operand.get("flags") {
        None => None,
        Some(v) => {
            let names: Vec<String> = match v {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect(),
                _ => return ctx.error(ParseErrorKind::Structural("flags must be a string or array".into())),
            };
            let mut out = HashSet::new();
            for name in names {
                out.insert(match name.as_str() {
                    "bypass" => QueueFlag::Bypass,
                    "fanout" => QueueFlag::Fanout,
                    _ => {
                        return ctx.error(ParseErrorKind::Vocabulary {
                            what: "queue flag",
                            name,
                        })
                    }
                });
            }
            Some(out)
        }
    };
    Some(Statement::Queue(Queue { num, flags }))
}

fn build_ct_helper(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let name = require_str(ctx, operand)?;
    Some(Statement::CTHelper(name))
}

fn build_vmap(ctx: &mut ParseContext, operand: &Value) -> Option<Statement> {
    let left_node = field(ctx, operand, "left")?;
    let key = ctx.with_path(PathSegment::Key("left"), |ctx| expr(ctx, ContextFlags::MAP, &left_node))?;
    let right_node = field(ctx, operand, "right")?;
    let data = ctx.with_path(PathSegment::Key("right"), |ctx| expr(ctx, ContextFlags::RHS, &right_node))?;
    Some(Statement::VerdictMap(VerdictMap { key, data }))
}

// --- field-access helpers -------------------------------------------------

fn field(ctx: &mut ParseContext, operand: &Value, name: &'static str) -> Option<Value> {
    match operand.get(name) {
        Some(v) => Some(v.clone()),
        None => ctx.error(ParseErrorKind::Structural(format!("missing required property '{name}'"))),
    }
}

fn require_u32(ctx: &mut ParseContext, operand: &Value, name: &'static str) -> Option<u32> {
    match operand.get(name).and_then(Value::as_u64) {
        Some(n) => Some(n as u32),
        None => ctx.error(ParseErrorKind::Structural(format!(
            "missing or non-integer property '{name}'"
        ))),
    }
}

fn require_strfield(ctx: &mut ParseContext, operand: &Value, name: &'static str) -> Option<String> {
    match operand.get(name).and_then(Value::as_str) {
        Some(s) => Some(s.to_string()),
        None => ctx.error(ParseErrorKind::Structural(format!(
            "missing or non-string property '{name}'"
        ))),
    }
}

fn optional_expr(
    ctx: &mut ParseContext,
    operand: &Value,
    name: &'static str,
) -> Option<Option<crate::expr::Expression>> {
    match operand.get(name) {
        None => Some(None),
        Some(v) => {
            let parsed = ctx.with_path(PathSegment::Key(name), |ctx| expr(ctx, ContextFlags::STMT, v))?;
            Some(Some(parsed))
        }
    }
}
