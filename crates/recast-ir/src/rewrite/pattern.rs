//! Rewrite rule trait.
//!
//! A rule is stateless: everything it learns comes from the tree and the
//! options reachable through the rewriter.

use super::rewriter::Rewriter;
use crate::context::TreeContext;
use crate::refs::NodeRef;
use crate::walk::WalkAction;

/// A rule that can match and transform one syntax node.
///
/// # Arguments
///
/// - `ctx`: the tree. Rules may build new detached nodes and request moves,
///   but must not mutate the live tree directly.
/// - `node`: the node offered by the traversal.
/// - `rewriter`: accumulates edits (replace, remove, insert).
///
/// # Return Value
///
/// The traversal signal for `node`'s subtree. A rule that recorded edits
/// should return [`WalkAction::Skip`]; the applicator skips the rewritten
/// subtree regardless. A rule that records nothing and returns `Skip`
/// withdraws itself from the subtree; the other rules still visit it.
pub trait RewriteRule: Send + Sync {
    /// Attempt to match and rewrite a node.
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction;

    /// Name used in logs and in the catalog.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
