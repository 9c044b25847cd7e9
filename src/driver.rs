//! Document driver (`spec.md` §4.5).
//!
//! The public entry point: walks the top-level `nftables` array, dispatches
//! each element to [`crate::cmd_parser::parse_command`], and runs the
//! resulting commands past the caller-supplied evaluator.

use serde_json::Value;

use crate::cmd_parser;
use crate::context::{ParseContext, PathSegment};
use crate::error::{ParseError, ParseErrorKind};
use crate::evaluator::RulesetEvaluator;
use crate::schema::NfCmd;

/// Tunables for a single [`parse_document`] call.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Ceiling on JSON nesting depth, guarding against pathological input.
    pub max_depth: usize,
    /// When set, chain `type`/`hook` combinations are checked against the
    /// family they run in (e.g. `nat` chains are rejected outside `ip`,
    /// `ip6` and `inet`). Off by default since the admissible combinations
    /// vary across kernel versions.
    pub strict_chain_types: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: 64,
            strict_chain_types: false,
        }
    }
}

/// Parses a `{"nftables": [...]}` document into a sequence of commands.
///
/// Elements are processed in order and spliced into the result as each one
/// succeeds. The driver aborts the whole document on the first
/// command-level failure, whether that is a parse failure or an evaluator
/// rejection — it does not attempt to collect diagnostics past that point.
pub fn parse_document(
    doc: &Value,
    evaluator: &mut dyn RulesetEvaluator,
    options: &ParserOptions,
) -> Result<Vec<NfCmd>, Vec<ParseError>> {
    let mut errors = Vec::new();
    let mut commands = Vec::new();

    let top = doc.as_object().and_then(|o| o.get("nftables"));
    let Some(Value::Array(items)) = top else {
        errors.push(ParseError::new(
            crate::error::Location::Internal,
            ParseErrorKind::Structural(
                "document must be an object with a top-level 'nftables' array".into(),
            ),
        ));
        return Err(errors);
    };

    log::debug!("parsing nftables document with {} top-level elements", items.len());

    for (i, item) in items.iter().enumerate() {
        let mut ctx = ParseContext::new(&mut errors, evaluator, options.max_depth);
        let parsed = ctx.with_path(PathSegment::Key("nftables"), |ctx| {
            ctx.with_path(PathSegment::Index(i), |ctx| cmd_parser::parse_command(ctx, item))
        });
        let Some(cmd) = parsed else {
            break;
        };
        match ctx.evaluator.evaluate(&cmd) {
            Ok(()) => commands.push(cmd),
            Err(message) => {
                log::warn!("evaluator rejected command at index {i}: {message}");
                errors.push(ParseError::new(
                    crate::error::Location::Path(format!("/nftables/{i}")),
                    ParseErrorKind::Evaluator(message),
                ));
                break;
            }
        }
    }

    if errors.is_empty() {
        Ok(commands)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::NoopEvaluator;

    #[test]
    fn empty_array_yields_no_commands() {
        let doc = serde_json::json!({"nftables": []});
        let mut eval = NoopEvaluator;
        let result = parse_document(&doc, &mut eval, &ParserOptions::default());
        assert_eq!(result.unwrap(), vec![]);
    }

    #[test]
    fn missing_top_level_key_is_structural() {
        let doc = serde_json::json!({"not-nftables": []});
        let mut eval = NoopEvaluator;
        let err = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn simple_table_add_parses() {
        let doc = serde_json::json!({
            "nftables": [
                {"add": {"table": {"family": "ip", "name": "filter"}}}
            ]
        });
        let mut eval = NoopEvaluator;
        let result = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn first_failure_aborts_the_document() {
        let doc = serde_json::json!({
            "nftables": [
                {"add": {"table": {"family": "bogus", "name": "filter"}}},
                {"add": {"table": {"family": "ip", "name": "filter"}}}
            ]
        });
        let mut eval = NoopEvaluator;
        let err = parse_document(&doc, &mut eval, &ParserOptions::default()).unwrap_err();
        assert_eq!(err.len(), 1);
    }
}
