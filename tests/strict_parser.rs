use nftables::context::{ContextFlags, ParseContext};
use nftables::evaluator::NoopEvaluator;
use nftables::expr_parser;
use nftables::schema::{FlushObject, ListObject, NfCmd, NfListObject, ResetObject};
use nftables::{parse_document, ParserOptions};

#[test]
fn adds_a_table() {
    let doc = serde_json::json!({"nftables":[{"add":{"table":{"family":"ip","name":"filter"}}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::Add(NfListObject::Table(t))] => {
            assert_eq!(t.name, "filter");
            assert_eq!(t.family, nftables::types::NfFamily::IP);
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn adds_a_base_chain() {
    let doc = serde_json::json!({"nftables":[{"add":{"chain":{
        "family":"inet","table":"t","name":"input",
        "type":"filter","hook":"input","prio":0,"policy":"accept"
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::Add(NfListObject::Chain(c))] => {
            assert_eq!(c.hook, Some(nftables::types::NfHook::Input));
            assert_eq!(c.policy, Some(nftables::types::NfChainPolicy::Accept));
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn rule_with_match_and_accept() {
    let doc = serde_json::json!({"nftables":[{"add":{"rule":{
        "family":"ip","table":"t","chain":"input",
        "expr":[
            {"match":{"left":{"payload":{"name":"tcp","field":"dport"}},"right":22,"op":"=="}},
            {"accept":null}
        ]
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::Add(NfListObject::Rule(r))] => {
            assert_eq!(r.expr.len(), 2);
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn set_timeout_is_converted_to_milliseconds() {
    let doc = serde_json::json!({"nftables":[{"add":{"set":{
        "family":"ip","table":"t","name":"s","type":"ipv4_addr",
        "flags":["interval","timeout"],"timeout":30,
        "elem":["10.0.0.1","10.0.0.2"]
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::Add(NfListObject::Set(s))] => {
            assert_eq!(s.timeout, Some(30_000));
            assert_eq!(s.elem.as_ref().unwrap().len(), 2);
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn raw_payload_expression() {
    let mut errors = Vec::new();
    let mut eval = NoopEvaluator;
    let mut ctx = ParseContext::new(&mut errors, &mut eval, 64);
    let node = serde_json::json!({"payload":{"name":"raw","base":"th","offset":16,"len":8}});
    let expr = ctx.with_flags(ContextFlags::RHS, |ctx| expr_parser::dispatch(ctx, &node));
    assert!(expr.is_some());
    assert!(errors.is_empty());
}

#[test]
fn fib_requires_exactly_one_of_saddr_or_daddr() {
    let mut errors = Vec::new();
    let mut eval = NoopEvaluator;
    let mut ctx = ParseContext::new(&mut errors, &mut eval, 64);
    let node = serde_json::json!({"fib":{"result":"type","flags":["saddr","mark"]}});
    let expr = ctx.with_flags(ContextFlags::PRIMARY, |ctx| expr_parser::dispatch(ctx, &node));
    assert!(expr.is_some());
    assert!(errors.is_empty());

    let mut errors2 = Vec::new();
    let mut eval2 = NoopEvaluator;
    let mut ctx2 = ParseContext::new(&mut errors2, &mut eval2, 64);
    let bad = serde_json::json!({"fib":{"result":"type","flags":["saddr","daddr"]}});
    let expr2 = ctx2.with_flags(ContextFlags::PRIMARY, |ctx| expr_parser::dispatch(ctx, &bad));
    assert!(expr2.is_none());
    assert_eq!(errors2.len(), 1);
}

#[test]
fn empty_document_yields_no_commands() {
    let doc = serde_json::json!({"nftables":[]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    assert!(cmds.is_empty());
}

#[test]
fn set_reference_string_is_not_wrapped() {
    let doc = serde_json::json!({"nftables":[{"add":{"rule":{
        "family":"ip","table":"t","chain":"input",
        "expr":[
            {"match":{"left":{"payload":{"name":"ip","field":"saddr"}},"right":"@blocklist","op":"=="}},
            {"drop":null}
        ]
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    assert_eq!(cmds.len(), 1);
}

#[test]
fn ct_directional_dir_on_non_directional_key_is_rejected() {
    let mut errors = Vec::new();
    let mut eval = NoopEvaluator;
    let mut ctx = ParseContext::new(&mut errors, &mut eval, 64);
    let node = serde_json::json!({"ct":{"key":"state","dir":"reply"}});
    let expr = ctx.with_flags(ContextFlags::RHS, |ctx| expr_parser::dispatch(ctx, &node));
    assert!(expr.is_none());
    assert_eq!(errors.len(), 1);
}

#[test]
fn one_key_object_with_two_keys_is_structural() {
    let doc = serde_json::json!({"nftables":[{"add":{"table":{"family":"ip","name":"filter"}},"extra":1}]});
    let mut eval = NoopEvaluator;
    let err = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap_err();
    assert_eq!(err.len(), 1);
}

#[test]
fn set_bare_scalar_wraps_as_single_element_set() {
    let doc = serde_json::json!({"nftables":[{"add":{"rule":{
        "family":"ip","table":"t","chain":"input",
        "expr":[
            {"match":{"left":{"payload":{"name":"ip","field":"saddr"}},"right":{"set":"10.0.0.1"},"op":"=="}},
            {"drop":null}
        ]
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    assert_eq!(cmds.len(), 1);
}

#[test]
fn set_bare_reference_is_not_wrapped() {
    let doc = serde_json::json!({"nftables":[{"add":{"rule":{
        "family":"ip","table":"t","chain":"input",
        "expr":[
            {"match":{"left":{"payload":{"name":"ip","field":"saddr"}},"right":{"set":"@blocklist"},"op":"=="}},
            {"drop":null}
        ]
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    assert_eq!(cmds.len(), 1);
}

#[test]
fn reject_code_goes_through_the_primitive_reader() {
    let doc = serde_json::json!({"nftables":[{"add":{"rule":{
        "family":"ip","table":"t","chain":"input",
        "expr":[{"reject":{"type":"icmpx","expr":"admin-prohibited"}}]
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    assert_eq!(cmds.len(), 1);
}

#[test]
fn negative_integer_primitive_is_accepted() {
    let mut errors = Vec::new();
    let mut eval = NoopEvaluator;
    let mut ctx = ParseContext::new(&mut errors, &mut eval, 64);
    let node = serde_json::json!(-5);
    let expr = ctx.with_flags(ContextFlags::RHS, |ctx| expr_parser::dispatch(ctx, &node));
    assert_eq!(expr, Some(nftables::expr::Expression::String("-5".to_string())));
    assert!(errors.is_empty());
}

#[test]
fn list_ruleset_is_accepted() {
    let doc = serde_json::json!({"nftables":[{"list":{"ruleset":null}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::List(ListObject::Ruleset(None))] => {}
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn list_tables_is_a_distinct_plural_kind() {
    let doc = serde_json::json!({"nftables":[{"list":{"tables":{"family":"ip"}}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::List(ListObject::Tables(filter))] => {
            assert_eq!(filter.family, Some(nftables::types::NfFamily::IP));
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn list_ct_helpers_without_table_is_rejected() {
    let doc = serde_json::json!({"nftables":[{"list":{"ct helpers":{"family":"ip"}}}]});
    let mut eval = NoopEvaluator;
    let err = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap_err();
    assert_eq!(err.len(), 1);
}

#[test]
fn reset_counters_parses_the_payload() {
    let doc = serde_json::json!({"nftables":[{"reset":{"counters":[
        {"family":"ip","table":"t","name":"c1"},
        {"family":"ip","table":"t","name":"c2"}
    ]}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::Reset(ResetObject::Counters(counters))] => {
            assert_eq!(counters.len(), 2);
            assert_eq!(counters[0].name, "c1");
            assert_eq!(counters[1].name, "c2");
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn flush_meter_is_accepted() {
    let doc = serde_json::json!({"nftables":[{"flush":{"meter":{
        "name":"m","key":"ip saddr",
        "stmt":{"accept":null}
    }}}]});
    let mut eval = NoopEvaluator;
    let cmds = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
    match &cmds[..] {
        [NfCmd::Flush(FlushObject::Meter(m))] => {
            assert_eq!(m.name, "m");
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}
