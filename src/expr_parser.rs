//! Expression dispatcher and builders (`spec.md` §4.2, §6's kind table).
//!
//! Grounded on `json_parse_expr`'s `cb_tbl` and the individual
//! `json_parse_*_expr` functions in `parser_json.c`.

use std::collections::HashSet;

use serde_json::Value;

use crate::context::{ContextFlags, ParseContext, PathSegment};
use crate::error::ParseErrorKind;
use crate::expr::{
    BinaryOperation, Constant, ConstantKind, CTFamily, CTDir, Exthdr, Expression, Fib, FibFlag,
    FibResult, JHash, Map as MapExpr, Meta, NamedExpression, Numgen, NgMode, Payload, PayloadBase,
    PayloadField, PayloadRaw, Prefix, Range, RT, RTFamily, SetItem, SymHash, TcpOption, Verdict,
    CT,
};
use crate::registry;
use crate::stmt::JumpTarget;

type Builder = fn(&mut ParseContext, &Value) -> Option<Expression>;

/// `(discriminator key, permitted context flags, builder)`. Compile-time
/// constant data, per Design Note §9 ("dispatcher tables... should be
/// compile-time-constant data").
const EXPR_KINDS: &[(&str, ContextFlags, Builder)] = {
    use ContextFlags as F;
    &[
        ("concat", F::RHS.union(F::STMT).union(F::DTYPE).union(F::SET_RHS).union(F::SES).union(F::MAP), build_concat),
        ("set", F::RHS.union(F::STMT), build_set),
        ("map", F::STMT.union(F::PRIMARY).union(F::SET_RHS), build_map),
        ("prefix", F::RHS.union(F::STMT), build_prefix),
        ("range", F::RHS.union(F::STMT), build_range),
        ("payload", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::MANGLE).union(F::SES).union(F::MAP), build_payload),
        ("exthdr", F::PRIMARY.union(F::SET_RHS).union(F::SES).union(F::MAP), build_exthdr),
        ("tcp option", F::PRIMARY.union(F::SET_RHS).union(F::MANGLE).union(F::SES), build_tcp_option),
        ("meta", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::MANGLE).union(F::SES).union(F::MAP), build_meta),
        ("rt", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_rt),
        ("ct", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::MANGLE).union(F::SES).union(F::MAP), build_ct),
        ("numgen", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_numgen),
        ("jhash", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_jhash),
        ("symhash", F::STMT.union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_symhash),
        ("fib", F::PRIMARY.union(F::SET_RHS).union(F::SES).union(F::MAP), build_fib),
        ("&", F::RHS.union(F::STMT).union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_and),
        ("|", F::RHS.union(F::STMT).union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_or),
        ("^", F::RHS.union(F::STMT).union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_xor),
        ("<<", F::RHS.union(F::STMT).union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_lshift),
        (">>", F::RHS.union(F::STMT).union(F::PRIMARY).union(F::SET_RHS).union(F::SES).union(F::MAP), build_rshift),
        ("accept", F::RHS.union(F::SET_RHS), build_verdict_accept),
        ("drop", F::RHS.union(F::SET_RHS), build_verdict_drop),
        ("continue", F::RHS.union(F::SET_RHS), build_verdict_continue),
        ("return", F::RHS.union(F::SET_RHS), build_verdict_return),
        ("jump", F::RHS.union(F::SET_RHS), build_verdict_jump),
        ("goto", F::RHS.union(F::SET_RHS), build_verdict_goto),
        ("elem", F::RHS.union(F::STMT).union(F::PRIMARY), build_elem),
    ]
};

/// Top-level expression dispatch (`json_parse_expr`). See `spec.md` §4.2 for
/// the full five-step algorithm.
pub fn dispatch(ctx: &mut ParseContext, node: &Value) -> Option<Expression> {
    let flags = ctx.flags();

    if let Value::Array(items) = node {
        if (flags.contains(ContextFlags::RHS) || flags.contains(ContextFlags::STMT))
            && !flags.contains(ContextFlags::PRIMARY)
        {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let parsed = ctx.with_path(PathSegment::Index(i), |ctx| dispatch(ctx, item))?;
                out.push(parsed);
            }
            return Some(Expression::List(out));
        }
        return ctx.error(ParseErrorKind::Structural(
            "array not allowed in this expression context".into(),
        ));
    }

    if let Value::String(s) = node {
        if s == "*" && (flags.contains(ContextFlags::RHS) || flags.contains(ContextFlags::STMT)) {
            return Some(build_wildcard());
        }
        if flags.contains(ContextFlags::DTYPE) {
            return resolve_dtype_scalar(ctx, s);
        }
    }

    if matches!(node, Value::String(_) | Value::Number(_) | Value::Bool(_))
        && flags.intersects(ContextFlags::RHS | ContextFlags::STMT | ContextFlags::PRIMARY)
    {
        return crate::primitive::parse_primitive(ctx, node);
    }

    let Some((key, operand)) = one_key_object(node) else {
        return ctx.error(ParseErrorKind::Structural(
            "expected a one-key object discriminating an expression kind".into(),
        ));
    };

    let Some((_, permitted, builder)) = EXPR_KINDS.iter().find(|(k, _, _)| *k == key) else {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "expression kind",
            name: key.to_string(),
        });
    };

    if !permitted.contains(flags) {
        return ctx.error(ParseErrorKind::Context {
            kind: key.to_string(),
            context: format!("{flags}"),
        });
    }

    ctx.with_path(PathSegment::Key(key_to_static(key)), |ctx| builder(ctx, operand))
}

/// Interned discriminator keys, so `PathSegment::Key` can stay `&'static str`.
fn key_to_static(key: &str) -> &'static str {
    EXPR_KINDS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(k, _, _)| *k)
        .unwrap_or("?")
}

fn one_key_object(node: &Value) -> Option<(&str, &Value)> {
    let obj = node.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.iter().next().map(|(k, v)| (k.as_str(), v))
}

/// Parses `node` as a sub-expression with exactly `flags` active for the
/// duration, restoring the caller's flags on return (the "flag-scoped
/// helper" `spec.md` §4.2 requires every builder to recurse through).
pub fn parse_scoped(ctx: &mut ParseContext, flags: ContextFlags, node: &Value) -> Option<Expression> {
    ctx.with_flags(flags, |ctx| dispatch(ctx, node))
}

fn resolve_dtype_scalar(ctx: &mut ParseContext, name: &str) -> Option<Expression> {
    let Some(dtype) = registry_datatype(name) else {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "datatype",
            name: name.to_string(),
        });
    };
    Some(Expression::Constant(Constant {
        kind: ConstantKind::Datatype(dtype),
        bytes: Vec::new(),
    }))
}

fn registry_datatype(name: &str) -> Option<crate::expr::DatatypeName> {
    use crate::expr::DatatypeName::*;
    Some(match name {
        "ipv4_addr" => Ipv4Addr,
        "ipv6_addr" => Ipv6Addr,
        "ether_addr" => EtherAddr,
        "inet_proto" => InetProto,
        "inet_service" => InetService,
        "mark" => Mark,
        "ifname" => Ifname,
        _ => return None,
    })
}

fn build_wildcard() -> Expression {
    Expression::Named(NamedExpression::Prefix(Prefix {
        addr: Box::new(Expression::Constant(Constant {
            kind: ConstantKind::Datatype(crate::expr::DatatypeName::Ipv4Addr),
            bytes: Vec::new(),
        })),
        len: 0,
    }))
}

fn build_concat(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let Value::Array(items) = operand else {
        return ctx.error(ParseErrorKind::Structural("concat expects an array".into()));
    };
    if items.len() < 2 {
        return ctx.error(ParseErrorKind::Structural(
            "concat requires at least two operands".into(),
        ));
    }
    let mut parts = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let part = ctx.with_path(PathSegment::Index(i), |ctx| {
            parse_scoped(ctx, ContextFlags::PRIMARY, item)
        })?;
        parts.push(part);
    }
    Some(Expression::Named(NamedExpression::Concat(parts)))
}

fn build_set(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let Value::Array(items) = operand else {
        // A bare scalar short-circuits: "@blocklist" resolves to a set-reference
        // immediate, anything else wraps as a single-element set (json_parse_set_expr).
        let scalar = parse_scoped(ctx, ContextFlags::RHS, operand)?;
        if matches!(&scalar, Expression::String(s) if s.starts_with('@')) {
            return Some(scalar);
        }
        return Some(Expression::Named(NamedExpression::Set(vec![SetItem::Element(scalar)])));
    };
    let mut elems = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let elem = ctx.with_path(PathSegment::Index(i), |ctx| build_set_item(ctx, item))?;
        elems.push(elem);
    }
    Some(Expression::Named(NamedExpression::Set(elems)))
}

fn build_set_item(ctx: &mut ParseContext, item: &Value) -> Option<SetItem> {
    if let Value::Array(pair) = item {
        if pair.len() == 2 {
            let key = parse_scoped(ctx, ContextFlags::RHS, &pair[0])?;
            let value = parse_scoped(ctx, ContextFlags::SET_RHS, &pair[1])?;
            return Some(SetItem::Mapping(key, value));
        }
    }
    if one_key_object(item).is_some() {
        let value = parse_scoped(ctx, ContextFlags::RHS, item)?;
        return Some(SetItem::Element(value));
    }
    let value = parse_scoped(ctx, ContextFlags::RHS, item)?;
    Some(SetItem::Element(value))
}

fn build_map(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let left = ctx.with_path(PathSegment::Key("left"), |ctx| {
        let node = get_field(ctx, operand, "left")?;
        parse_scoped(ctx, ContextFlags::MAP, &node)
    })?;
    let right = ctx.with_path(PathSegment::Key("right"), |ctx| {
        let node = get_field(ctx, operand, "right")?;
        parse_scoped(ctx, ContextFlags::RHS, &node)
    })?;
    Some(Expression::Named(NamedExpression::Map(Box::new(MapExpr {
        key: left,
        data: right,
    }))))
}

fn build_prefix(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let addr = ctx.with_path(PathSegment::Key("addr"), |ctx| {
        let node = get_field(ctx, operand, "addr")?;
        parse_scoped(ctx, ContextFlags::PRIMARY, &node)
    })?;
    let len = require_u32(ctx, operand, "len")?;
    Some(Expression::Named(NamedExpression::Prefix(Prefix {
        addr: Box::new(addr),
        len,
    })))
}

fn build_range(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let Value::Array(items) = operand else {
        return ctx.error(ParseErrorKind::Structural("range expects a 2-element array".into()));
    };
    if items.len() != 2 {
        return ctx.error(ParseErrorKind::Structural("range requires exactly 2 elements".into()));
    }
    let mut parts = Vec::with_capacity(2);
    for (i, item) in items.iter().enumerate() {
        let part = ctx.with_path(PathSegment::Index(i), |ctx| {
            parse_scoped(ctx, ContextFlags::PRIMARY, item)
        })?;
        parts.push(part);
    }
    Some(Expression::Range(Range { range: parts }))
}

fn build_payload(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let name = require_str(ctx, operand, "name")?;
    if name == "raw" {
        let base_s = require_str(ctx, operand, "base")?;
        let base = match base_s.as_str() {
            "ll" => PayloadBase::LL,
            "nh" => PayloadBase::NH,
            "th" => PayloadBase::TH,
            "ih" => PayloadBase::IH,
            _ => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "payload base",
                    name: base_s,
                })
            }
        };
        let offset = require_u32(ctx, operand, "offset")?;
        let len = require_u32(ctx, operand, "len")?;
        return Some(Expression::Named(NamedExpression::Payload(Payload::PayloadRaw(
            PayloadRaw { base, offset, len },
        ))));
    }
    let Some(proto) = registry::lookup_protocol(&name) else {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "protocol",
            name,
        });
    };
    let field = require_str(ctx, operand, "field")?;
    if !proto.fields.contains(&field.as_str()) {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "payload field",
            name: format!("{name}.{field}"),
        });
    }
    Some(Expression::Named(NamedExpression::Payload(Payload::PayloadField(
        PayloadField { protocol: name, field },
    ))))
}

fn build_exthdr(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let name = require_str(ctx, operand, "name")?;
    let Some(desc) = registry::lookup_exthdr(&name) else {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "extension header",
            name,
        });
    };
    let field = optional_str(ctx, operand, "field");
    if let Some(f) = &field {
        if !desc.fields.contains(&f.as_str()) {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "extension header field",
                name: format!("{name}.{f}"),
            });
        }
    }
    let offset = optional_u32(ctx, operand, "offset");
    if offset.is_some() && !desc.accepts_offset {
        return ctx.error(ParseErrorKind::CrossField(format!(
            "extension header '{name}' does not accept an offset"
        )));
    }
    Some(Expression::Named(NamedExpression::Exthdr(Exthdr {
        name,
        field,
        offset,
    })))
}

fn build_tcp_option(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let name = require_str(ctx, operand, "name")?;
    let Some(desc) = registry::lookup_tcp_option(&name) else {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "tcp option",
            name,
        });
    };
    let field = optional_str(ctx, operand, "field");
    if let Some(f) = &field {
        if !desc.fields.contains(&f.as_str()) {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "tcp option field",
                name: format!("{name}.{f}"),
            });
        }
    }
    Some(Expression::Named(NamedExpression::TcpOption(TcpOption { name, field })))
}

fn build_meta(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let Value::String(key) = operand else {
        return ctx.error(ParseErrorKind::Structural("meta expects a string key".into()));
    };
    let meta_key: crate::expr::MetaKey = match serde_json::from_value(Value::String(key.clone())) {
        Ok(k) => k,
        Err(_) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "meta key",
                name: key.clone(),
            })
        }
    };
    Some(Expression::Named(NamedExpression::Meta(Meta { key: meta_key })))
}

fn build_rt(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let key_s = require_str(ctx, operand, "key")?;
    let key: crate::expr::RTKey = match key_s.as_str() {
        "classid" => crate::expr::RTKey::ClassId,
        "nexthop" => crate::expr::RTKey::NextHop,
        "mtu" => crate::expr::RTKey::MTU,
        _ => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "rt key",
                name: key_s,
            })
        }
    };
    let family = match optional_str(ctx, operand, "family").as_deref() {
        Some("ip") => Some(RTFamily::IP),
        Some("ip6") => Some(RTFamily::IP6),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "rt family",
                name: other.to_string(),
            })
        }
        None => None,
    };
    // spec.md:78 requires `nexthop` to remap to an IPv6-distinct variant when
    // `family` is v6; the teacher's `RTKey` (expr.rs) carries no such variant.
    // `family` is recorded alongside `key` regardless, so a downstream
    // resolver still has what it needs to pick NFT_RT_NEXTHOP4 vs. _NEXTHOP6;
    // see DESIGN.md's known-gap entry for this.
    Some(Expression::Named(NamedExpression::RT(RT { key, family })))
}

fn build_ct(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let key = require_str(ctx, operand, "key")?;
    if !registry::ct_key_is_known(&key) {
        return ctx.error(ParseErrorKind::Vocabulary {
            what: "ct key",
            name: key,
        });
    }
    let family = match optional_str(ctx, operand, "family").as_deref() {
        Some("ip") => Some(CTFamily::IP),
        Some("ip6") => Some(CTFamily::IP6),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "ct family",
                name: other.to_string(),
            })
        }
        None => None,
    };
    let dir = match optional_str(ctx, operand, "dir").as_deref() {
        Some("original") => Some(CTDir::Original),
        Some("reply") => Some(CTDir::Reply),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "ct direction",
                name: other.to_string(),
            })
        }
        None => None,
    };
    if dir.is_some() && !registry::ct_key_is_directional(&key) {
        return ctx.error(ParseErrorKind::CrossField(format!(
            "ct key '{key}' does not support a direction"
        )));
    }
    Some(Expression::Named(NamedExpression::CT(CT { key, family, dir })))
}

fn build_numgen(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let mode_s = require_str(ctx, operand, "mode")?;
    let mode = match mode_s.as_str() {
        "inc" => NgMode::Inc,
        "random" => NgMode::Random,
        _ => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "numgen mode",
                name: mode_s,
            })
        }
    };
    let ng_mod = require_u32(ctx, operand, "mod")?;
    let offset = optional_u32(ctx, operand, "offset");
    Some(Expression::Named(NamedExpression::Numgen(Numgen {
        mode,
        ng_mod,
        offset,
    })))
}

fn build_jhash(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let hash_mod = require_u32(ctx, operand, "mod")?;
    let offset = optional_u32(ctx, operand, "offset");
    let seed = optional_u32(ctx, operand, "seed");
    let expr_node = get_field(ctx, operand, "expr")?;
    let expr = ctx.with_path(PathSegment::Key("expr"), |ctx| dispatch(ctx, &expr_node))?;
    Some(Expression::Named(NamedExpression::JHash(JHash {
        hash_mod,
        offset,
        expr: Box::new(expr),
        seed,
    })))
}

fn build_symhash(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let hash_mod = require_u32(ctx, operand, "mod")?;
    let offset = optional_u32(ctx, operand, "offset").unwrap_or(0);
    Some(Expression::Named(NamedExpression::SymHash(SymHash {
        hash_mod,
        offset: Some(offset),
    })))
}

fn build_fib(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let result_s = require_str(ctx, operand, "result")?;
    let result = match result_s.as_str() {
        "oif" => FibResult::Oif,
        "oifname" => FibResult::Oifname,
        "type" => FibResult::Type,
        _ => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "fib result",
                name: result_s,
            })
        }
    };
    let flag_strings = require_str_or_list(ctx, operand, "flags")?;
    let mut flags = HashSet::new();
    for f in &flag_strings {
        if !registry::FIB_FLAGS.contains(&f.as_str()) {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "fib flag",
                name: f.clone(),
            });
        }
        flags.insert(match f.as_str() {
            "saddr" => FibFlag::Saddr,
            "daddr" => FibFlag::Daddr,
            "mark" => FibFlag::Mark,
            "iif" => FibFlag::Iif,
            "oif" => FibFlag::Oif,
            _ => unreachable!(),
        });
    }
    let has_saddr = flags.contains(&FibFlag::Saddr);
    let has_daddr = flags.contains(&FibFlag::Daddr);
    if has_saddr == has_daddr {
        return ctx.error(ParseErrorKind::CrossField(
            "fib requires exactly one of saddr/daddr".into(),
        ));
    }
    if flags.contains(&FibFlag::Iif) && flags.contains(&FibFlag::Oif) {
        return ctx.error(ParseErrorKind::CrossField(
            "fib iif and oif are mutually exclusive".into(),
        ));
    }
    Some(Expression::Named(NamedExpression::Fib(Fib { result, flags })))
}

fn build_binop(ctx: &mut ParseContext, operand: &Value) -> Option<(Expression, Expression)> {
    let Value::Array(items) = operand else {
        return ctx.error(ParseErrorKind::Structural(
            "binary operation expects a 2-element array".into(),
        ));
    };
    if items.len() != 2 {
        return ctx.error(ParseErrorKind::Structural(
            "binary operation requires exactly 2 operands".into(),
        ));
    }
    let lhs = ctx.with_path(PathSegment::Index(0), |ctx| {
        parse_scoped(ctx, ContextFlags::PRIMARY, &items[0])
    })?;
    let rhs = ctx.with_path(PathSegment::Index(1), |ctx| {
        parse_scoped(ctx, ContextFlags::PRIMARY, &items[1])
    })?;
    Some((lhs, rhs))
}

fn build_and(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let (l, r) = build_binop(ctx, operand)?;
    Some(Expression::BinaryOperation(BinaryOperation::AND(Box::new(l), Box::new(r))))
}
fn build_or(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let (l, r) = build_binop(ctx, operand)?;
    Some(Expression::BinaryOperation(BinaryOperation::OR(Box::new(l), Box::new(r))))
}
fn build_xor(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let (l, r) = build_binop(ctx, operand)?;
    Some(Expression::BinaryOperation(BinaryOperation::XOR(Box::new(l), Box::new(r))))
}
fn build_lshift(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let (l, r) = build_binop(ctx, operand)?;
    Some(Expression::BinaryOperation(BinaryOperation::LSHIFT(Box::new(l), Box::new(r))))
}
fn build_rshift(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let (l, r) = build_binop(ctx, operand)?;
    Some(Expression::BinaryOperation(BinaryOperation::RSHIFT(Box::new(l), Box::new(r))))
}

fn build_verdict_accept(_ctx: &mut ParseContext, _operand: &Value) -> Option<Expression> {
    Some(Expression::Verdict(Verdict::Accept))
}
fn build_verdict_drop(_ctx: &mut ParseContext, _operand: &Value) -> Option<Expression> {
    Some(Expression::Verdict(Verdict::Drop))
}
fn build_verdict_continue(_ctx: &mut ParseContext, _operand: &Value) -> Option<Expression> {
    Some(Expression::Verdict(Verdict::Continue))
}
fn build_verdict_return(_ctx: &mut ParseContext, _operand: &Value) -> Option<Expression> {
    Some(Expression::Verdict(Verdict::Return))
}
fn build_verdict_jump(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let Value::String(target) = operand else {
        return ctx.error(ParseErrorKind::Structural("jump requires a string target".into()));
    };
    Some(Expression::Verdict(Verdict::Jump(JumpTarget {
        target: target.clone(),
    })))
}
fn build_verdict_goto(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let Value::String(target) = operand else {
        return ctx.error(ParseErrorKind::Structural("goto requires a string target".into()));
    };
    Some(Expression::Verdict(Verdict::Goto(JumpTarget {
        target: target.clone(),
    })))
}

fn build_elem(ctx: &mut ParseContext, operand: &Value) -> Option<Expression> {
    let val_node = get_field(ctx, operand, "val")?;
    let val = ctx.with_path(PathSegment::Key("val"), |ctx| dispatch(ctx, &val_node))?;
    let timeout = optional_u32(ctx, operand, "elem_timeout").map(|s| s.saturating_mul(1000));
    let expires = optional_u32(ctx, operand, "elem_expires").map(|s| s.saturating_mul(1000));
    let comment = optional_str(ctx, operand, "elem_comment");
    Some(Expression::Named(NamedExpression::Elem(crate::expr::Elem {
        val: Box::new(val),
        timeout,
        expires,
        comment,
        counter: None,
    })))
}

// --- field-access helpers -------------------------------------------------

fn get_field(ctx: &mut ParseContext, operand: &Value, field: &'static str) -> Option<Value> {
    match operand.get(field) {
        Some(v) => Some(v.clone()),
        None => ctx.error(ParseErrorKind::Structural(format!("missing required property '{field}'"))),
    }
}

fn require_str(ctx: &mut ParseContext, operand: &Value, field: &'static str) -> Option<String> {
    match operand.get(field).and_then(Value::as_str) {
        Some(s) => Some(s.to_string()),
        None => ctx.error(ParseErrorKind::Structural(format!(
            "missing or non-string property '{field}'"
        ))),
    }
}

fn optional_str(ctx: &mut ParseContext, operand: &Value, field: &'static str) -> Option<String> {
    let _ = ctx;
    operand.get(field).and_then(Value::as_str).map(str::to_string)
}

fn require_u32(ctx: &mut ParseContext, operand: &Value, field: &'static str) -> Option<u32> {
    match operand.get(field).and_then(Value::as_u64) {
        Some(n) => Some(n as u32),
        None => ctx.error(ParseErrorKind::Structural(format!(
            "missing or non-integer property '{field}'"
        ))),
    }
}

fn optional_u32(ctx: &mut ParseContext, operand: &Value, field: &'static str) -> Option<u32> {
    let _ = ctx;
    operand.get(field).and_then(Value::as_u64).map(|n| n as u32)
}

fn require_str_or_list(ctx: &mut ParseContext, operand: &Value, field: &'static str) -> Option<Vec<String>> {
    match operand.get(field) {
        Some(Value::String(s)) => Some(vec![s.clone()]),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => {
                        return ctx.error(ParseErrorKind::Structural(format!(
                            "'{field}' array elements must be strings"
                        )))
                    }
                }
            }
            Some(out)
        }
        _ => ctx.error(ParseErrorKind::Structural(format!(
            "missing property '{field}' (expected string or array of strings)"
        ))),
    }
}
