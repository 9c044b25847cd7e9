//! The external evaluator seam.
//!
//! `spec.md` §1 places "later passes: semantic evaluation, address-family
//! cache, netlink serialisation, rule installation" explicitly out of
//! scope, while §3 and §4.5 require the parse context to carry "a shared
//! handle to the external evaluator/cache" and route every built command
//! through it before appending to the output list. [`RulesetEvaluator`] is
//! that handle: an opaque collaborator the driver calls but does not
//! implement.

use crate::schema::NfCmd;

/// Semantic evaluator for a single built command.
///
/// Implementations live downstream of this crate (address-family cache,
/// kernel-state diffing, netlink staging, ...). [`NoopEvaluator`] is the
/// trivial implementation used by tests and by callers who only want the
/// parsed AST without touching kernel state.
pub trait RulesetEvaluator {
    /// Called once per successfully parsed command, in document order.
    /// Returning `Err` aborts the whole document per `spec.md` §4.5 ("on
    /// evaluator rejection, release the command and abort the whole
    /// document with an error stamped with the element index").
    fn evaluate(&mut self, cmd: &NfCmd) -> Result<(), String>;
}

/// Accepts every command unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvaluator;

impl RulesetEvaluator for NoopEvaluator {
    fn evaluate(&mut self, _cmd: &NfCmd) -> Result<(), String> {
        Ok(())
    }
}
