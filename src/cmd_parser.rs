//! Command parser (`spec.md` §4.4).
//!
//! Grounded on the `json_parse_cmd_add_*` functions and the per-operator
//! kind tables in `parser_json.c`.

use std::collections::HashSet;

use serde_json::Value;

use crate::context::{ContextFlags, ParseContext, PathSegment};
use crate::error::ParseErrorKind;
use crate::expr_parser;
use crate::registry;
use crate::schema::{
    Chain, Counter, CTHelper, Element, FlowTable, FlushObject, Limit, ListFilter, ListObject, Map,
    Meter, NfCmd, NfListObject, Quota, ResetObject, Rule, Set, SetFlag, SetPolicy, SetType,
    SetTypeValue, Table,
};
use crate::stmt_parser;

/// Parses one `{"nftables": [...]}` array element: `{operator: {kind: body}}`.
pub fn parse_command(ctx: &mut ParseContext, node: &Value) -> Option<NfCmd> {
    let Some(obj) = node.as_object() else {
        return ctx.error(ParseErrorKind::Structural("command must be an object".into()));
    };
    if obj.len() != 1 {
        return ctx.error(ParseErrorKind::Structural(
            "command object must have exactly one key".into(),
        ));
    }
    let (op, body) = obj.iter().next().unwrap();
    ctx.with_path(PathSegment::Key(op_to_static(op)), |ctx| match op.as_str() {
        "add" => parse_add_like(ctx, body, NfCmd::Add as fn(NfListObject) -> NfCmd, false),
        "create" => parse_add_like(ctx, body, NfCmd::Create as fn(NfListObject) -> NfCmd, false),
        "insert" => parse_add_like(ctx, body, NfCmd::Insert as fn(NfListObject) -> NfCmd, false),
        "delete" => parse_add_like(ctx, body, NfCmd::Delete as fn(NfListObject) -> NfCmd, true),
        "list" => parse_list(ctx, body),
        "replace" => parse_replace(ctx, body),
        "rename" => parse_rename(ctx, body),
        "reset" => parse_reset(ctx, body).map(NfCmd::Reset),
        "flush" => parse_flush(ctx, body).map(NfCmd::Flush),
        other => ctx.error(ParseErrorKind::Vocabulary {
            what: "command operator",
            name: other.to_string(),
        }),
    })
}

fn op_to_static(op: &str) -> &'static str {
    match op {
        "add" => "add",
        "create" => "create",
        "insert" => "insert",
        "delete" => "delete",
        "list" => "list",
        "replace" => "replace",
        "rename" => "rename",
        "reset" => "reset",
        "flush" => "flush",
        _ => "?",
    }
}

fn parse_add_like(
    ctx: &mut ParseContext,
    body: &Value,
    wrap: fn(NfListObject) -> NfCmd,
    minimal: bool,
) -> Option<NfCmd> {
    let Some(obj) = body.as_object() else {
        return ctx.error(ParseErrorKind::Structural("expected a one-key object kind".into()));
    };
    if obj.len() != 1 {
        return ctx.error(ParseErrorKind::Structural(
            "command body must have exactly one key (the object kind)".into(),
        ));
    }
    let (kind, payload) = obj.iter().next().unwrap();
    let obj = ctx.with_path(PathSegment::Key(kind_to_static(kind)), |ctx| {
        parse_object_kind(ctx, kind, payload, minimal)
    })?;
    Some(wrap(obj))
}

fn kind_to_static(kind: &str) -> &'static str {
    match kind {
        "table" => "table",
        "chain" => "chain",
        "rule" => "rule",
        "set" => "set",
        "map" => "map",
        "element" => "element",
        "flowtable" => "flowtable",
        "counter" => "counter",
        "quota" => "quota",
        "ct helper" => "ct helper",
        "limit" => "limit",
        _ => "?",
    }
}

fn parse_object_kind(ctx: &mut ParseContext, kind: &str, payload: &Value, minimal: bool) -> Option<NfListObject> {
    match kind {
        "table" => parse_table(ctx, payload, minimal).map(NfListObject::Table),
        "chain" => parse_chain(ctx, payload, minimal).map(NfListObject::Chain),
        "rule" => parse_rule(ctx, payload, minimal).map(NfListObject::Rule),
        "set" => parse_set(ctx, payload, minimal).map(NfListObject::Set),
        "map" => parse_map(ctx, payload, minimal).map(NfListObject::Map),
        "element" => parse_element(ctx, payload).map(NfListObject::Element),
        "flowtable" => parse_flowtable(ctx, payload, minimal).map(NfListObject::FlowTable),
        "counter" => parse_counter(ctx, payload, minimal).map(NfListObject::Counter),
        "quota" => parse_quota(ctx, payload, minimal).map(NfListObject::Quota),
        "ct helper" => parse_ct_helper(ctx, payload, minimal).map(NfListObject::CTHelper),
        "limit" => parse_limit(ctx, payload, minimal).map(NfListObject::Limit),
        other => ctx.error(ParseErrorKind::Vocabulary {
            what: "object kind",
            name: other.to_string(),
        }),
    }
}

fn family(ctx: &mut ParseContext, payload: &Value) -> Option<crate::types::NfFamily> {
    let s = str_field(ctx, payload, "family")?;
    registry::parse_family(&s).or_else(|| {
        ctx.error(ParseErrorKind::Vocabulary {
            what: "family",
            name: s,
        })
    })
}

fn str_field(ctx: &mut ParseContext, payload: &Value, name: &'static str) -> Option<String> {
    match payload.get(name).and_then(Value::as_str) {
        Some(s) => Some(s.to_string()),
        None => ctx.error(ParseErrorKind::Structural(format!("missing required property '{name}'"))),
    }
}

fn opt_str(payload: &Value, name: &str) -> Option<String> {
    payload.get(name).and_then(Value::as_str).map(str::to_string)
}

fn opt_u32(payload: &Value, name: &str) -> Option<u32> {
    payload.get(name).and_then(Value::as_u64).map(|n| n as u32)
}

fn parse_table(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<Table> {
    let fam = family(ctx, payload)?;
    let name = opt_str(payload, "name");
    let handle = opt_u32(payload, "handle");
    if !minimal && name.is_none() {
        return ctx.error(ParseErrorKind::Structural("table requires 'name'".into()));
    }
    if minimal && name.is_none() && handle.is_none() {
        return ctx.error(ParseErrorKind::CrossField(
            "delete table requires either 'name' or 'handle'".into(),
        ));
    }
    Some(Table {
        family: fam,
        name: name.unwrap_or_default(),
        handle,
    })
}

fn parse_chain(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<Chain> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = opt_str(payload, "name").unwrap_or_default();
    if !minimal && name.is_empty() {
        return ctx.error(ParseErrorKind::Structural("chain requires 'name'".into()));
    }
    let handle = opt_u32(payload, "handle");
    let _type = match payload.get("type").and_then(Value::as_str) {
        None => None,
        Some("filter") => Some(crate::types::NfChainType::Filter),
        Some("route") => Some(crate::types::NfChainType::Route),
        Some("nat") => Some(crate::types::NfChainType::NAT),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "chain type",
                name: other.to_string(),
            })
        }
    };
    let hook = match payload.get("hook").and_then(Value::as_str) {
        None => None,
        Some(h) => match registry::parse_hook(h) {
            Some(h) => Some(h),
            None => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "hook",
                    name: h.to_string(),
                })
            }
        },
    };
    if (_type.is_some() || hook.is_some()) && !(_type.is_some() && hook.is_some()) {
        return ctx.error(ParseErrorKind::CrossField(
            "base chains require both 'type' and 'hook'".into(),
        ));
    }
    let prio = payload.get("prio").and_then(Value::as_i64).map(|n| n as i32);
    let dev = opt_str(payload, "dev");
    let policy = match payload.get("policy").and_then(Value::as_str) {
        None => None,
        Some("accept") => Some(crate::types::NfChainPolicy::Accept),
        Some("drop") => Some(crate::types::NfChainPolicy::Drop),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "chain policy",
                name: other.to_string(),
            })
        }
    };
    Some(Chain {
        family: fam,
        table,
        name,
        newname: None,
        handle,
        _type,
        hook,
        prio,
        dev,
        policy,
    })
}

fn parse_rename(ctx: &mut ParseContext, body: &Value) -> Option<NfCmd> {
    let Some(payload) = body.get("chain") else {
        return ctx.error(ParseErrorKind::Structural("rename only applies to chains".into()));
    };
    let mut chain = ctx.with_path(PathSegment::Key("chain"), |ctx| parse_chain(ctx, payload, false))?;
    chain.newname = Some(str_field(ctx, payload, "newname")?);
    Some(NfCmd::Rename(chain))
}

fn parse_rule(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<Rule> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let chain = str_field(ctx, payload, "chain")?;
    if payload.get("rule").is_some() {
        return ctx.error(ParseErrorKind::Structural("unexpected property 'rule'".into()));
    }
    let handle = opt_u32(payload, "handle");
    if minimal {
        if handle.is_none() {
            return ctx.error(ParseErrorKind::CrossField("delete rule requires 'handle'".into()));
        }
        return Some(Rule {
            family: fam,
            table,
            chain,
            expr: Vec::new(),
            handle,
            index: None,
            comment: None,
        });
    }
    let Some(Value::Array(stmts)) = payload.get("expr") else {
        return ctx.error(ParseErrorKind::Structural("rule requires an 'expr' array".into()));
    };
    let mut expr = Vec::with_capacity(stmts.len());
    for (i, s) in stmts.iter().enumerate() {
        let stmt = ctx.with_path(PathSegment::Index(i), |ctx| stmt_parser::dispatch(ctx, s))?;
        expr.push(stmt);
    }
    let index = opt_u32(payload, "pos");
    let comment = opt_str(payload, "comment");
    Some(Rule {
        family: fam,
        table,
        chain,
        expr,
        handle,
        index,
        comment,
    })
}

fn parse_replace(ctx: &mut ParseContext, body: &Value) -> Option<NfCmd> {
    let Some(payload) = body.get("rule") else {
        return ctx.error(ParseErrorKind::Structural("replace only applies to rules".into()));
    };
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let chain = str_field(ctx, payload, "chain")?;
    let handle = opt_u32(payload, "handle");
    if handle.is_none() {
        return ctx.error(ParseErrorKind::CrossField("replace rule requires 'handle'".into()));
    }
    let Some(Value::Array(stmts)) = payload.get("expr") else {
        return ctx.error(ParseErrorKind::Structural("rule requires an 'expr' array".into()));
    };
    let mut expr = Vec::with_capacity(stmts.len());
    for (i, s) in stmts.iter().enumerate() {
        let stmt = ctx.with_path(PathSegment::Index(i), |ctx| stmt_parser::dispatch(ctx, s))?;
        expr.push(stmt);
    }
    Some(NfCmd::Replace(Rule {
        family: fam,
        table,
        chain,
        expr,
        handle,
        index: None,
        comment: opt_str(payload, "comment"),
    }))
}

fn parse_set_type(ctx: &mut ParseContext, value: &Value) -> Option<SetTypeValue> {
    match value {
        Value::String(s) => Some(SetTypeValue::Single(lookup_set_type(ctx, s)?)),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(s) = item.as_str() else {
                    return ctx.error(ParseErrorKind::Structural(
                        "concatenated set type entries must be strings".into(),
                    ));
                };
                out.push(lookup_set_type(ctx, s)?);
            }
            Some(SetTypeValue::Concatenated(out))
        }
        Value::Object(obj) if obj.len() == 1 && obj.contains_key("concat") => {
            parse_set_type(ctx, &obj["concat"])
        }
        _ => ctx.error(ParseErrorKind::Structural(
            "'type' must be a string, array of strings, or concat object".into(),
        )),
    }
}

fn lookup_set_type(ctx: &mut ParseContext, s: &str) -> Option<SetType> {
    match s {
        "ipv4_addr" => Some(SetType::Ipv4Addr),
        "ipv6_addr" => Some(SetType::Ipv6Addr),
        "ether_addr" => Some(SetType::EtherAddr),
        "inet_proto" => Some(SetType::InetProto),
        "inet_service" => Some(SetType::InetService),
        "mark" => Some(SetType::Mark),
        "ifname" => Some(SetType::Ifname),
        _ => ctx.error(ParseErrorKind::Vocabulary {
            what: "datatype",
            name: s.to_string(),
        }),
    }
}

fn parse_set_flags(ctx: &mut ParseContext, value: &Value) -> Option<HashSet<SetFlag>> {
    let names: Vec<String> = match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect(),
        _ => return ctx.error(ParseErrorKind::Structural("flags must be a string or array".into())),
    };
    let mut out = HashSet::new();
    for name in names {
        out.insert(match name.as_str() {
            "constant" => SetFlag::Constant,
            "interval" => SetFlag::Interval,
            "timeout" => SetFlag::Timeout,
            "dynamic" => SetFlag::Dynamic,
            _ => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "set flag",
                    name,
                })
            }
        });
    }
    Some(out)
}

fn parse_elem_list(ctx: &mut ParseContext, value: &Value) -> Option<Vec<crate::expr::Expression>> {
    let items: Vec<Value> = match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let parsed = ctx.with_path(PathSegment::Index(i), |ctx| {
            ctx.with_flags(ContextFlags::RHS, |ctx| expr_parser::dispatch(ctx, item))
        })?;
        out.push(parsed);
    }
    Some(out)
}

fn parse_set(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<Set> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    let handle = opt_u32(payload, "handle");
    if minimal {
        return Some(Set {
            family: fam,
            table,
            name,
            handle,
            set_type: SetTypeValue::Single(SetType::Ipv4Addr),
            policy: None,
            flags: None,
            elem: None,
            timeout: None,
            gc_interval: None,
            size: None,
            comment: None,
        });
    }
    let set_type = ctx.with_path(PathSegment::Key("type"), |ctx| {
        let t = payload.get("type")?;
        parse_set_type(ctx, t)
    })?;
    let policy = match payload.get("policy").and_then(Value::as_str) {
        None => None,
        Some("performance") => Some(SetPolicy::Performance),
        Some("memory") => Some(SetPolicy::Memory),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "set policy",
                name: other.to_string(),
            })
        }
    };
    let flags = match payload.get("flags") {
        None => None,
        Some(v) => Some(parse_set_flags(ctx, v)?),
    };
    let elem = match payload.get("elem") {
        None => None,
        Some(v) => Some(parse_elem_list(ctx, v)?),
    };
    let timeout = opt_u32(payload, "timeout").map(|s| s.saturating_mul(1000));
    let gc_interval = opt_u32(payload, "gc-interval").map(|s| s.saturating_mul(1000));
    let size = opt_u32(payload, "size");
    let comment = opt_str(payload, "comment");
    Some(Set {
        family: fam,
        table,
        name,
        handle,
        set_type,
        policy,
        flags,
        elem,
        timeout,
        gc_interval,
        size,
        comment,
    })
}

fn parse_map(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<Map> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    let handle = opt_u32(payload, "handle");
    if minimal {
        return Some(Map {
            family: fam,
            table,
            name,
            handle,
            set_type: SetTypeValue::Single(SetType::Ipv4Addr),
            map: SetTypeValue::Single(SetType::Ipv4Addr),
            policy: None,
            flags: None,
            elem: None,
            timeout: None,
            gc_interval: None,
            size: None,
            comment: None,
        });
    }
    let set_type = ctx.with_path(PathSegment::Key("type"), |ctx| {
        let t = payload.get("type")?;
        parse_set_type(ctx, t)
    })?;
    let map_type = ctx.with_path(PathSegment::Key("map"), |ctx| {
        let t = payload.get("map")?;
        parse_set_type(ctx, t)
    })?;
    let policy = match payload.get("policy").and_then(Value::as_str) {
        None => None,
        Some("performance") => Some(SetPolicy::Performance),
        Some("memory") => Some(SetPolicy::Memory),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "map policy",
                name: other.to_string(),
            })
        }
    };
    let flags = match payload.get("flags") {
        None => None,
        Some(v) => Some(parse_set_flags(ctx, v)?),
    };
    let elem = match payload.get("elem") {
        None => None,
        Some(v) => Some(parse_elem_list(ctx, v)?),
    };
    let timeout = opt_u32(payload, "timeout").map(|s| s.saturating_mul(1000));
    let gc_interval = opt_u32(payload, "gc-interval").map(|s| s.saturating_mul(1000));
    let size = opt_u32(payload, "size");
    let comment = opt_str(payload, "comment");
    Some(Map {
        family: fam,
        table,
        name,
        handle,
        set_type,
        map: map_type,
        policy,
        flags,
        elem,
        timeout,
        gc_interval,
        size,
        comment,
    })
}

fn parse_element(ctx: &mut ParseContext, payload: &Value) -> Option<Element> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    let elem_val = payload.get("elem")?;
    let elem = ctx.with_path(PathSegment::Key("elem"), |ctx| parse_elem_list(ctx, elem_val))?;
    Some(Element {
        family: fam,
        table,
        name,
        elem,
    })
}

fn parse_flowtable(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<FlowTable> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    let handle = opt_u32(payload, "handle");
    if minimal {
        return Some(FlowTable {
            family: fam,
            table,
            name,
            handle,
            hook: None,
            prio: None,
            dev: None,
        });
    }
    let hook = match payload.get("hook").and_then(Value::as_str) {
        None => return ctx.error(ParseErrorKind::Structural("flowtable requires 'hook'".into())),
        Some(h) => match registry::parse_hook(h) {
            Some(h) => Some(h),
            None => {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "hook",
                    name: h.to_string(),
                })
            }
        },
    };
    let prio = opt_u32(payload, "prio");
    if payload.get("prio").is_none() {
        return ctx.error(ParseErrorKind::Structural("flowtable requires 'prio'".into()));
    }
    let dev = match payload.get("dev") {
        Some(Value::String(s)) => Some(vec![s.clone()]),
        Some(Value::Array(items)) => Some(items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect()),
        _ => return ctx.error(ParseErrorKind::Structural("flowtable requires 'dev'".into())),
    };
    Some(FlowTable {
        family: fam,
        table,
        name,
        handle,
        hook,
        prio,
        dev,
    })
}

fn parse_counter(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<Counter> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    Some(Counter {
        family: fam,
        table,
        name,
        handle: opt_u32(payload, "handle"),
        packets: if minimal { None } else { opt_u32(payload, "packets") },
        bytes: opt_u32(payload, "bytes"),
    })
}

fn parse_quota(ctx: &mut ParseContext, payload: &Value, _minimal: bool) -> Option<Quota> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    Some(Quota {
        family: fam,
        table,
        name,
        handle: opt_u32(payload, "handle"),
        bytes: opt_u32(payload, "bytes"),
        used: opt_u32(payload, "used"),
        inv: payload.get("inv").and_then(Value::as_bool),
    })
}

fn parse_limit(ctx: &mut ParseContext, payload: &Value, _minimal: bool) -> Option<Limit> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    let per = match payload.get("per").and_then(Value::as_str) {
        None => None,
        Some("second") => Some(crate::types::NfTimeUnit::Second),
        Some("minute") => Some(crate::types::NfTimeUnit::Minute),
        Some("hour") => Some(crate::types::NfTimeUnit::Hour),
        Some("day") => Some(crate::types::NfTimeUnit::Day),
        Some("week") => Some(crate::types::NfTimeUnit::Week),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "time unit",
                name: other.to_string(),
            })
        }
    };
    let unit = match payload.get("unit").and_then(Value::as_str) {
        None => None,
        Some("packets") => Some(crate::schema::LimitUnit::Packets),
        Some("bytes") => Some(crate::schema::LimitUnit::Bytes),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "limit unit",
                name: other.to_string(),
            })
        }
    };
    Some(Limit {
        family: fam,
        table,
        name,
        handle: opt_u32(payload, "handle"),
        rate: opt_u32(payload, "rate"),
        per,
        burst: opt_u32(payload, "burst"),
        unit,
        inv: payload.get("inv").and_then(Value::as_bool),
    })
}

/// ct-helper `inv`: a dedicated boolean field on the ct-helper payload, not
/// folded into a general flags integer (`spec.md` §9, third open question).
fn parse_ct_helper(ctx: &mut ParseContext, payload: &Value, minimal: bool) -> Option<CTHelper> {
    let fam = family(ctx, payload)?;
    let table = str_field(ctx, payload, "table")?;
    let name = str_field(ctx, payload, "name")?;
    let handle = opt_u32(payload, "handle");
    if minimal {
        return Some(CTHelper {
            family: fam,
            table,
            name,
            handle,
            _type: String::new(),
            protocol: None,
            l3proto: None,
        });
    }
    let _type = str_field(ctx, payload, "type")?;
    if _type.len() > 16 {
        return ctx.error(ParseErrorKind::CrossField(
            "ct helper type name exceeds the maximum length".into(),
        ));
    }
    let protocol = match opt_str(payload, "protocol") {
        Some(p) if p == "tcp" || p == "udp" => Some(p),
        Some(other) => {
            return ctx.error(ParseErrorKind::Vocabulary {
                what: "ct helper protocol",
                name: other,
            })
        }
        None => None,
    };
    let l3proto = match opt_str(payload, "l3proto") {
        Some(fam_s) => {
            if registry::parse_family(&fam_s).is_none() {
                return ctx.error(ParseErrorKind::Vocabulary {
                    what: "family",
                    name: fam_s,
                });
            }
            Some(fam_s)
        }
        None => Some("ip".to_string()),
    };
    Some(CTHelper {
        family: fam,
        table,
        name,
        handle,
        _type,
        protocol,
        l3proto,
    })
}

/// Parses a `"counters"`/`"quotas"`-style reset payload: an array of
/// minimal object descriptors, a single bare descriptor, or `null` for
/// "every object of this kind" (left as an empty list for a downstream
/// evaluator to expand).
fn parse_named_list<T>(
    ctx: &mut ParseContext,
    payload: &Value,
    mut parse_one: impl FnMut(&mut ParseContext, &Value, bool) -> Option<T>,
) -> Option<Vec<T>> {
    match payload {
        Value::Null => Some(Vec::new()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let parsed = ctx.with_path(PathSegment::Index(i), |ctx| parse_one(ctx, item, true))?;
                out.push(parsed);
            }
            Some(out)
        }
        other => Some(vec![parse_one(ctx, other, true)?]),
    }
}

fn parse_reset(ctx: &mut ParseContext, body: &Value) -> Option<ResetObject> {
    let Some(obj) = body.as_object() else {
        return ctx.error(ParseErrorKind::Structural("reset body must be an object".into()));
    };
    let (kind, payload) = obj.iter().next()?;
    match kind.as_str() {
        "counter" => parse_counter(ctx, payload, true).map(ResetObject::Counter),
        "counters" => parse_named_list(ctx, payload, parse_counter).map(ResetObject::Counters),
        "quota" => parse_quota(ctx, payload, true).map(ResetObject::Quota),
        "quotas" => parse_named_list(ctx, payload, parse_quota).map(ResetObject::Quotas),
        other => ctx.error(ParseErrorKind::Vocabulary {
            what: "reset kind",
            name: other.to_string(),
        }),
    }
}

/// `key`/`stmt` go through the same expression/statement dispatch as every
/// other AST leaf; `stmt::Meter`'s wire shape is statement-level only (no
/// `family`/`table`/`handle`), see DESIGN.md's command-level `meter` gap.
fn parse_meter(ctx: &mut ParseContext, payload: &Value) -> Option<Meter> {
    let name = str_field(ctx, payload, "name")?;
    let Some(key_val) = payload.get("key") else {
        return ctx.error(ParseErrorKind::Structural("meter requires 'key'".into()));
    };
    let key = ctx.with_path(PathSegment::Key("key"), |ctx| {
        ctx.with_flags(ContextFlags::RHS, |ctx| expr_parser::dispatch(ctx, key_val))
    })?;
    let Some(stmt_val) = payload.get("stmt") else {
        return ctx.error(ParseErrorKind::Structural("meter requires 'stmt'".into()));
    };
    let stmt = ctx.with_path(PathSegment::Key("stmt"), |ctx| stmt_parser::dispatch(ctx, stmt_val))?;
    Some(Meter { name, key, stmt })
}

fn parse_flush(ctx: &mut ParseContext, body: &Value) -> Option<FlushObject> {
    let Some(obj) = body.as_object() else {
        return ctx.error(ParseErrorKind::Structural("flush body must be an object".into()));
    };
    let (kind, payload) = obj.iter().next()?;
    match kind.as_str() {
        "table" => parse_table(ctx, payload, true).map(FlushObject::Table),
        "chain" => parse_chain(ctx, payload, true).map(FlushObject::Chain),
        "set" => parse_set(ctx, payload, true).map(FlushObject::Set),
        "map" => parse_map(ctx, payload, true).map(FlushObject::Map),
        "meter" => parse_meter(ctx, payload).map(FlushObject::Meter),
        "ruleset" => Some(FlushObject::Ruleset(None)),
        other => ctx.error(ParseErrorKind::Vocabulary {
            what: "flush kind",
            name: other.to_string(),
        }),
    }
}

fn list_kind_to_static(kind: &str) -> &'static str {
    match kind {
        "table" => "table",
        "chain" => "chain",
        "set" => "set",
        "map" => "map",
        "flowtable" => "flowtable",
        "counter" => "counter",
        "quota" => "quota",
        "ct helper" => "ct helper",
        "limit" => "limit",
        "tables" => "tables",
        "chains" => "chains",
        "sets" => "sets",
        "maps" => "maps",
        "flowtables" => "flowtables",
        "counters" => "counters",
        "quotas" => "quotas",
        "ct helpers" => "ct helpers",
        "limits" => "limits",
        "meters" => "meters",
        "ruleset" => "ruleset",
        _ => "?",
    }
}

fn parse_list_filter(payload: &Value) -> ListFilter {
    ListFilter {
        family: payload.get("family").and_then(Value::as_str).and_then(registry::parse_family),
        table: opt_str(payload, "table"),
    }
}

fn parse_list_kind(ctx: &mut ParseContext, kind: &str, payload: &Value) -> Option<ListObject> {
    match kind {
        "table" => parse_table(ctx, payload, true).map(ListObject::Table),
        "chain" => parse_chain(ctx, payload, true).map(ListObject::Chain),
        "set" => parse_set(ctx, payload, true).map(ListObject::Set),
        "map" => parse_map(ctx, payload, true).map(ListObject::Map),
        "flowtable" => parse_flowtable(ctx, payload, true).map(ListObject::FlowTable),
        "counter" => parse_counter(ctx, payload, true).map(ListObject::Counter),
        "quota" => parse_quota(ctx, payload, true).map(ListObject::Quota),
        "ct helper" => parse_ct_helper(ctx, payload, true).map(ListObject::CTHelper),
        "limit" => parse_limit(ctx, payload, true).map(ListObject::Limit),
        "tables" => Some(ListObject::Tables(parse_list_filter(payload))),
        "chains" => Some(ListObject::Chains(parse_list_filter(payload))),
        "sets" => Some(ListObject::Sets(parse_list_filter(payload))),
        "maps" => Some(ListObject::Maps(parse_list_filter(payload))),
        "flowtables" => Some(ListObject::Flowtables(parse_list_filter(payload))),
        "counters" => Some(ListObject::Counters(parse_list_filter(payload))),
        "quotas" => Some(ListObject::Quotas(parse_list_filter(payload))),
        "ct helpers" => {
            let filter = parse_list_filter(payload);
            if filter.table.is_none() {
                return ctx.error(ParseErrorKind::CrossField(
                    "listing ct helpers requires a 'table'".into(),
                ));
            }
            Some(ListObject::CTHelpers(filter))
        }
        "limits" => Some(ListObject::Limits(parse_list_filter(payload))),
        "meters" => Some(ListObject::Meters(parse_list_filter(payload))),
        "ruleset" => Some(ListObject::Ruleset(None)),
        other => ctx.error(ParseErrorKind::Vocabulary {
            what: "list kind",
            name: other.to_string(),
        }),
    }
}

fn parse_list(ctx: &mut ParseContext, body: &Value) -> Option<NfCmd> {
    let Some(obj) = body.as_object() else {
        return ctx.error(ParseErrorKind::Structural("expected a one-key object kind".into()));
    };
    if obj.len() != 1 {
        return ctx.error(ParseErrorKind::Structural(
            "command body must have exactly one key (the object kind)".into(),
        ));
    }
    let (kind, payload) = obj.iter().next().unwrap();
    let obj = ctx.with_path(PathSegment::Key(list_kind_to_static(kind)), |ctx| {
        parse_list_kind(ctx, kind, payload)
    })?;
    Some(NfCmd::List(obj))
}
