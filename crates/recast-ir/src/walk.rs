//! Pre-order traversal utilities.
//!
//! The visitor returns `ControlFlow<B, WalkAction>`: `Continue(Advance)`
//! descends into children, `Continue(Skip)` stays out of the current
//! subtree, and `Break(b)` interrupts the whole walk with `b`.

use std::ops::ControlFlow;

use crate::context::TreeContext;
use crate::node::NodeKind;
use crate::refs::NodeRef;

/// Controls whether to descend into children during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Continue walking and descend into children.
    Advance,
    /// Skip the children of the current node.
    Skip,
}

/// Walk a node and its descendants in pre-order.
pub fn walk_node<B>(
    ctx: &TreeContext,
    node: NodeRef,
    f: &mut dyn FnMut(NodeRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    match f(node) {
        ControlFlow::Break(b) => return ControlFlow::Break(b),
        ControlFlow::Continue(WalkAction::Skip) => return ControlFlow::Continue(()),
        ControlFlow::Continue(WalkAction::Advance) => {}
    }
    for child in ctx.children(node) {
        walk_node(ctx, child, f)?;
    }
    ControlFlow::Continue(())
}

/// Walk a statement without entering nested blocks.
///
/// The statement itself is visited even if it is a block; blocks below it
/// are neither visited nor descended into. Scans built on this only see the
/// statement list they were asked about.
pub fn walk_statement_scope<B>(
    ctx: &TreeContext,
    stmt: NodeRef,
    f: &mut dyn FnMut(NodeRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    walk_node(ctx, stmt, &mut |node| {
        if node != stmt && ctx.kind(node).is_block() {
            return ControlFlow::Continue(WalkAction::Skip);
        }
        f(node)
    })
}

/// `true` if `pred` holds for `node` or any descendant. Stops at the first hit.
pub fn any_node(ctx: &TreeContext, node: NodeRef, pred: impl Fn(&NodeKind) -> bool) -> bool {
    walk_node(ctx, node, &mut |n| {
        if pred(ctx.kind(n)) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(WalkAction::Advance)
        }
    })
    .is_break()
}
