//! The context-flag word `F` and the parse context it is carried in.
//!
//! Mirrors `parser_json.c`'s `CTX_F_*` defines and `struct json_ctx`, per
//! Design Note §9's option (a): an explicit flag bitmask threaded through
//! recursive calls, scoped with guaranteed restore on every exit path.

use bitflags::bitflags;

use crate::error::{Location, ParseError, ParseErrorKind};
use crate::evaluator::RulesetEvaluator;

bitflags! {
    /// The grammatical position(s) currently being parsed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u16 {
        const RHS     = 1 << 0;
        const STMT    = 1 << 1;
        const PRIMARY = 1 << 2;
        const DTYPE   = 1 << 3;
        const SET_RHS = 1 << 4;
        const MANGLE  = 1 << 5;
        const SES     = 1 << 6;
        const MAP     = 1 << 7;
    }
}

impl std::fmt::Display for ContextFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One step of the location breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    OwnedKey(String),
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::OwnedKey(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Parse context: input-location breadcrumb, message sink, evaluator
/// handle and the active context-flag word. Scoped per `spec.md` §3.
pub struct ParseContext<'a> {
    path: Vec<PathSegment>,
    flags: ContextFlags,
    errors: &'a mut Vec<ParseError>,
    pub evaluator: &'a mut dyn RulesetEvaluator,
    pub max_depth: usize,
    depth: usize,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        errors: &'a mut Vec<ParseError>,
        evaluator: &'a mut dyn RulesetEvaluator,
        max_depth: usize,
    ) -> Self {
        ParseContext {
            path: Vec::new(),
            flags: ContextFlags::empty(),
            errors,
            evaluator,
            max_depth,
            depth: 0,
        }
    }

    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    /// Runs `f` with `flags` active for the duration of the call,
    /// restoring the previous flags on every return path (including
    /// early returns via `?` inside `f`, since this takes a closure).
    pub fn with_flags<T>(&mut self, flags: ContextFlags, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.flags;
        self.flags = flags;
        let result = f(self);
        self.flags = saved;
        result
    }

    /// Runs `f` with `segment` pushed onto the path, popping it back off
    /// on return. Also enforces the recursion-depth ceiling (`spec.md`
    /// §6's `ParserOptions`), guarding against pathological nesting in
    /// untrusted input.
    pub fn with_path<T>(
        &mut self,
        segment: PathSegment,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.depth >= self.max_depth {
            self.error(ParseErrorKind::Resource(format!(
                "nesting depth exceeds limit of {}",
                self.max_depth
            )));
            return None;
        }
        self.path.push(segment);
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.path.pop();
        result
    }

    pub fn location(&self) -> Location {
        if self.path.is_empty() {
            return Location::Internal;
        }
        let mut s = String::new();
        for seg in &self.path {
            s.push('/');
            s.push_str(&seg.to_string());
        }
        Location::Path(s)
    }

    /// Enqueues an error at the current location and returns `None`, so
    /// call sites can write `return ctx.error(..)` from a builder whose
    /// return type is `Option<_>`.
    pub fn error<T>(&mut self, kind: ParseErrorKind) -> Option<T> {
        self.errors.push(ParseError::new(self.location(), kind));
        None
    }

    /// Enqueues a contextualising message on top of an already-failed
    /// sub-parse, per `spec.md` §7's propagation policy.
    pub fn contextualize(&mut self, message: impl Into<String>) {
        self.errors.push(ParseError::new(
            self.location(),
            ParseErrorKind::Structural(message.into()),
        ));
    }
}
