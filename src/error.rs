//! Error model for the JSON front-end.
//!
//! Builders never panic and never short-circuit via `Result`. They enqueue a
//! [`ParseError`] onto the caller-owned queue and return `None`; the nearest
//! parent detects the `None`, may enqueue a contextualising message, and
//! propagates `None` itself. See [`crate::context::ParseContext`].

use std::fmt;

use thiserror::Error;

/// An opaque location stamp attached to every enqueued error.
///
/// `serde_json::Value` does not retain byte/line/column positions once
/// parsed, so the stamp is a JSON-pointer-style breadcrumb trail instead,
/// accumulated by [`crate::context::ParseContext`] as it recurses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    /// A path from the document root, e.g. `/nftables/0/add/chain/hook`.
    Path(String),
    /// No path is available (e.g. an evaluator rejection keyed by index only).
    #[default]
    Internal,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(p) => write!(f, "{p}"),
            Location::Internal => write!(f, "<internal>"),
        }
    }
}

/// The six error kinds of `spec.md` §7.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Wrong structured-document shape: wrong type, wrong key count on a
    /// one-key object, missing required key.
    #[error("{0}")]
    Structural(String),

    /// Unknown family/hook/policy/kind/flag/operator name, or a name valid
    /// elsewhere but not in this context.
    #[error("unknown {what} '{name}'")]
    Vocabulary { what: &'static str, name: String },

    /// A syntactically valid expression/statement kind appears in a
    /// grammatical slot that does not admit it.
    #[error("{kind} not allowed in context {context}")]
    Context { kind: String, context: String },

    /// Semantic rules violated across fields (e.g. fib requires exactly one
    /// of saddr/daddr).
    #[error("{0}")]
    CrossField(String),

    /// Downstream allocation or registry lookup failure.
    #[error("{0}")]
    Resource(String),

    /// Reported by the external evaluator when a built command fails
    /// semantic checks.
    #[error("{0}")]
    Evaluator(String),
}

/// A single queued diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {kind}")]
pub struct ParseError {
    pub location: Location,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(location: Location, kind: ParseErrorKind) -> Self {
        ParseError { location, kind }
    }
}
