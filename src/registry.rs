//! Compile-time-constant lookup tables: families, hooks, protocol header
//! templates, extension headers, TCP options, ct/meta/rt keys, reserved
//! keywords/constants and reject codes.
//!
//! Grounded on `parser_json.c`'s `family_tbl`, `proto_tbl`, `exthdr_tbl`,
//! `tcpopthdr_protocols`, `rt_key_tbl`, `meta_key_parse`, `fib_result_tbl`,
//! `op_tbl`, `constant_tbl` and the keyword/constant arrays in
//! `is_keyword`/`is_constant`. Per Design Note §9 these are plain `const`
//! data, not scattered `if`-chains.

use crate::types::{NfFamily, NfHook};

/// `spec.md` §3: "Families are one of {ip, ip6, inet, arp, bridge, netdev}".
pub fn parse_family(name: &str) -> Option<NfFamily> {
    Some(match name {
        "ip" => NfFamily::IP,
        "ip6" => NfFamily::IP6,
        "inet" => NfFamily::INet,
        "arp" => NfFamily::ARP,
        "bridge" => NfFamily::Bridge,
        "netdev" => NfFamily::NetDev,
        _ => return None,
    })
}

pub fn parse_hook(name: &str) -> Option<NfHook> {
    Some(match name {
        "ingress" => NfHook::Ingress,
        "prerouting" => NfHook::Prerouting,
        "forward" => NfHook::Forward,
        "input" => NfHook::Input,
        "output" => NfHook::Output,
        "postrouting" => NfHook::Postrouting,
        "egress" => NfHook::Egress,
        _ => return None,
    })
}

/// `is_keyword()` in `parser_json.c`: bare symbols admissible in RHS
/// context without further type resolution.
pub const KEYWORDS: &[&str] = &[
    "ether", "ip", "ip6", "vlan", "arp", "dnat", "snat", "ecn", "reset", "original", "reply",
    "label",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// `is_constant()`/`constant_tbl` in `parser_json.c`. `inet_protocol_type`
/// constants carry the IANA protocol number; `redirect` is the lone
/// `icmp_type_type` constant (`ICMP_REDIRECT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantDatatype {
    InetProtocol,
    IcmpType,
}

pub fn lookup_constant(name: &str) -> Option<(ConstantDatatype, u8)> {
    use ConstantDatatype::*;
    Some(match name {
        "tcp" => (InetProtocol, 6),
        "udp" => (InetProtocol, 17),
        "udplite" => (InetProtocol, 136),
        "esp" => (InetProtocol, 50),
        "ah" => (InetProtocol, 51),
        "icmp" => (InetProtocol, 1),
        "icmpv6" => (InetProtocol, 58),
        "comp" => (InetProtocol, 108),
        "dccp" => (InetProtocol, 33),
        "sctp" => (InetProtocol, 132),
        "redirect" => (IcmpType, 5),
        _ => return None,
    })
}

pub fn is_constant(name: &str) -> bool {
    lookup_constant(name).is_some()
}

/// A named packet-header protocol's field template, keyed by `payload`'s
/// `field` property. Grounded on `proto_lookup_byname`/`proto_tbl`; the
/// concrete per-protocol template arrays live in `payload.c`, which is not
/// part of the retrieved original source, so the field lists below are the
/// well-known nftables header field names for each protocol.
pub struct ProtoDesc {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

pub const PROTOCOLS: &[ProtoDesc] = &[
    ProtoDesc { name: "ether", fields: &["daddr", "saddr", "type"] },
    ProtoDesc { name: "vlan", fields: &["id", "cfi", "pcp", "type"] },
    ProtoDesc {
        name: "arp",
        fields: &["htype", "ptype", "hlen", "plen", "operation", "saddr ether", "daddr ether", "saddr ip", "daddr ip"],
    },
    ProtoDesc {
        name: "ip",
        fields: &[
            "version", "hdrlength", "dscp", "ecn", "length", "id", "frag-off", "ttl", "protocol",
            "checksum", "saddr", "daddr",
        ],
    },
    ProtoDesc {
        name: "icmp",
        fields: &["type", "code", "checksum", "id", "sequence", "gateway", "mtu"],
    },
    ProtoDesc {
        name: "ip6",
        fields: &[
            "version", "dscp", "ecn", "flowlabel", "length", "nexthdr", "hoplimit", "saddr",
            "daddr",
        ],
    },
    ProtoDesc {
        name: "icmpv6",
        fields: &["type", "code", "checksum", "parameter-problem", "mtu", "id", "sequence"],
    },
    ProtoDesc { name: "ah", fields: &["nexthdr", "hdrlength", "reserved", "spi", "sequence"] },
    ProtoDesc { name: "esp", fields: &["spi", "sequence"] },
    ProtoDesc { name: "comp", fields: &["type", "flags", "cpi"] },
    ProtoDesc { name: "udp", fields: &["sport", "dport", "length", "checksum"] },
    ProtoDesc { name: "udplite", fields: &["sport", "dport", "csumcov", "checksum"] },
    ProtoDesc {
        name: "tcp",
        fields: &[
            "sport", "dport", "sequence", "ackseq", "doff", "reserved", "flags", "window",
            "checksum", "urgptr",
        ],
    },
    ProtoDesc { name: "dccp", fields: &["sport", "dport"] },
    ProtoDesc { name: "sctp", fields: &["sport", "dport", "vtag", "checksum"] },
];

pub fn lookup_protocol(name: &str) -> Option<&'static ProtoDesc> {
    PROTOCOLS.iter().find(|p| p.name == name)
}

/// Extension header registry (`exthdr_tbl`). `rt0`/`rt2` are the only
/// headers accepting the additional `offset` property (`spec.md` §4.2).
pub struct ExthdrDesc {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub accepts_offset: bool,
}

pub const EXTHDRS: &[ExthdrDesc] = &[
    ExthdrDesc { name: "hbh", fields: &["nexthdr", "hdrlength"], accepts_offset: false },
    ExthdrDesc { name: "rt", fields: &["nexthdr", "hdrlength", "type", "seg_left"], accepts_offset: false },
    ExthdrDesc { name: "rt0", fields: &["nexthdr", "hdrlength", "type", "seg_left", "addr"], accepts_offset: true },
    ExthdrDesc { name: "rt2", fields: &["nexthdr", "hdrlength", "type", "seg_left", "addr"], accepts_offset: true },
    ExthdrDesc { name: "frag", fields: &["nexthdr", "reserved", "frag_off", "more_fragments", "id"], accepts_offset: false },
    ExthdrDesc { name: "dst", fields: &["nexthdr", "hdrlength"], accepts_offset: false },
    ExthdrDesc { name: "mh", fields: &["nexthdr", "hdrlength", "type", "checksum"], accepts_offset: false },
];

pub fn lookup_exthdr(name: &str) -> Option<&'static ExthdrDesc> {
    EXTHDRS.iter().find(|e| e.name == name)
}

/// TCP option registry (`tcpopthdr_protocols`), including the `sack0`..
/// `sack3` special forms handled separately by `lookup_tcp_option`.
pub struct TcpOptDesc {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

pub const TCP_OPTIONS: &[TcpOptDesc] = &[
    TcpOptDesc { name: "eol", fields: &["kind"] },
    TcpOptDesc { name: "noop", fields: &["kind"] },
    TcpOptDesc { name: "maxseg", fields: &["kind", "length", "size"] },
    TcpOptDesc { name: "window", fields: &["kind", "length", "count"] },
    TcpOptDesc { name: "sack-permitted", fields: &["kind", "length"] },
    TcpOptDesc { name: "sack", fields: &["kind", "length", "left", "right"] },
    TcpOptDesc { name: "timestamp", fields: &["kind", "length", "tsval", "tsecr"] },
];

const SACK_FIELDS: &[&str] = &["kind", "length", "left", "right"];

pub fn lookup_tcp_option(name: &str) -> Option<TcpOptDesc> {
    if let Some(n) = name.strip_prefix("sack").and_then(|rest| rest.parse::<u32>().ok()) {
        if n < 4 {
            return Some(TcpOptDesc { name: "sack", fields: SACK_FIELDS });
        }
    }
    TCP_OPTIONS
        .iter()
        .find(|t| t.name == name)
        .map(|t| TcpOptDesc { name: t.name, fields: t.fields })
}

/// ct keys. Directional keys are the ones `dir` may qualify
/// (`spec.md` §4.2's `ct` contract).
pub const CT_DIRECTIONAL_KEYS: &[&str] = &[
    "l3proto", "saddr", "daddr", "protocol", "proto-src", "proto-dst", "packets", "bytes",
    "avgpkt", "zone",
];

pub const CT_NONDIRECTIONAL_KEYS: &[&str] = &[
    "state", "direction", "status", "mark", "expiration", "helper", "label", "count", "id",
    "event-mask", "secmark", "secpath",
];

pub fn ct_key_is_known(key: &str) -> bool {
    CT_DIRECTIONAL_KEYS.contains(&key) || CT_NONDIRECTIONAL_KEYS.contains(&key)
}

pub fn ct_key_is_directional(key: &str) -> bool {
    CT_DIRECTIONAL_KEYS.contains(&key)
}

/// fib lookup flags (`fib_flag_parse`).
pub const FIB_FLAGS: &[&str] = &["saddr", "daddr", "mark", "iif", "oif"];

/// Relational operator symbols (`op_tbl` for `match` statements).
pub const RELATIONAL_OPERATORS: &[&str] =
    &["&", "|", "^", "<<", ">>", "==", "!=", ">", "<", "<=", ">=", "in"];

/// Reject code names, by reject type (`spec.md` §4.3/§6.4).
pub const REJECT_CODES_ICMP: &[&str] = &[
    "net-unreachable", "host-unreachable", "prot-unreachable", "port-unreachable",
    "net-prohibited", "host-prohibited", "admin-prohibited",
];
pub const REJECT_CODES_ICMPV6: &[&str] =
    &["no-route", "admin-prohibited", "addr-unreachable", "port-unreachable"];
pub const REJECT_CODES_ICMPX: &[&str] =
    &["no-route", "port-unreachable", "host-unreachable", "admin-prohibited"];
