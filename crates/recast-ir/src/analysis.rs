//! Side-effect and liveness analyses.
//!
//! Everything here is conservative: an answer of "passive" or "not
//! referenced" is a proof, anything uncertain comes back as the unsafe
//! answer so the calling rule declines.

use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::context::TreeContext;
use crate::node::{Literal, NodeKind};
use crate::refs::{BindingId, NodeRef};
use crate::walk::{WalkAction, walk_node, walk_statement_scope};

/// `true` if evaluating `expr` can have no observable side effect.
///
/// Method calls are never passive, since nothing is known about what they
/// do. Neither are assignments or increments.
pub fn is_passive(ctx: &TreeContext, expr: NodeRef) -> bool {
    match ctx.kind(expr) {
        NodeKind::Literal(_) | NodeKind::Name { .. } | NodeKind::QualifiedName { .. } => true,
        NodeKind::FieldAccess { target, .. } => is_passive(ctx, *target),
        NodeKind::Parenthesized { expr } => is_passive(ctx, *expr),
        NodeKind::Prefix { op, operand } => !op.has_side_effect() && is_passive(ctx, *operand),
        NodeKind::Infix { operands, .. } => operands.iter().all(|o| is_passive(ctx, *o)),
        _ => false,
    }
}

/// `true` if `node` or anything below it names one of `bindings`.
pub fn references_any(ctx: &TreeContext, node: NodeRef, bindings: &HashSet<BindingId>) -> bool {
    if bindings.is_empty() {
        return false;
    }
    walk_node(ctx, node, &mut |n| match ctx.kind(n) {
        NodeKind::Name {
            binding: Some(b), ..
        } if bindings.contains(b) => ControlFlow::Break(()),
        _ => ControlFlow::Continue(WalkAction::Advance),
    })
    .is_break()
}

/// Bindings of the locals a statement declares into its enclosing
/// statement list. Declarations inside blocks (including `stmt` itself
/// when it is a block) are scoped to that block and not included.
///
/// `None` if a declaration has no resolved binding.
pub fn declared_locals(ctx: &TreeContext, stmt: NodeRef) -> Option<Vec<BindingId>> {
    let mut locals = Vec::new();
    let flow = walk_statement_scope(ctx, stmt, &mut |n| match ctx.kind(n) {
        NodeKind::Block { .. } => ControlFlow::Continue(WalkAction::Skip),
        NodeKind::VarDecl { binding: None, .. } => ControlFlow::Break(()),
        NodeKind::VarDecl {
            binding: Some(b), ..
        } => {
            locals.push(*b);
            ControlFlow::Continue(WalkAction::Advance)
        }
        _ => ControlFlow::Continue(WalkAction::Advance),
    });
    match flow {
        ControlFlow::Break(()) => None,
        ControlFlow::Continue(()) => Some(locals),
    }
}

/// `true` if `stmt` contains a `break;` that targets a switch or loop
/// enclosing `stmt`. Breaks inside nested loops and switches target those.
pub fn contains_unlabeled_break(ctx: &TreeContext, stmt: NodeRef) -> bool {
    walk_node(ctx, stmt, &mut |n| match ctx.kind(n) {
        NodeKind::Break { label: None } => ControlFlow::Break(()),
        NodeKind::While { .. } | NodeKind::Switch { .. } => {
            ControlFlow::Continue(WalkAction::Skip)
        }
        _ => ControlFlow::Continue(WalkAction::Advance),
    })
    .is_break()
}

/// `true` if control can never fall out of the bottom of `stmt`.
pub fn ends_with_jump(ctx: &TreeContext, stmt: NodeRef) -> bool {
    match ctx.kind(stmt) {
        NodeKind::Break { .. }
        | NodeKind::Continue { .. }
        | NodeKind::Return { .. }
        | NodeKind::Throw { .. } => true,
        NodeKind::Block { stmts } => stmts.last().is_some_and(|s| ends_with_jump(ctx, *s)),
        NodeKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => ends_with_jump(ctx, *then_branch) && ends_with_jump(ctx, *else_branch),
        _ => false,
    }
}

/// Floating-point type names; orderings over them do not invert under NaN.
const FLOATING: &[&str] = &["float", "double", "java.lang.Float", "java.lang.Double"];

/// `true` if `expr` is a two-operand comparison whose logical negation is
/// the inverse operator.
///
/// `==`/`!=` always qualify. An ordering qualifies only when both operand
/// types are known and neither is floating point: `!(x < y)` holds for NaN
/// while `x >= y` does not.
pub fn is_invertible_comparison(ctx: &TreeContext, expr: NodeRef) -> bool {
    let NodeKind::Infix { op, operands } = ctx.kind(ctx.unparenthesized(expr)) else {
        return false;
    };
    if operands.len() != 2 || op.inverse_comparison().is_none() {
        return false;
    }
    if !op.is_ordering() {
        return true;
    }
    operands
        .iter()
        .all(|o| ctx.type_of(*o).is_some_and(|ty| !ty.is_one_of(FLOATING)))
}

/// Value of a boolean literal, looking through parentheses.
pub fn boolean_literal(ctx: &TreeContext, expr: NodeRef) -> Option<bool> {
    match ctx.kind(ctx.unparenthesized(expr)) {
        NodeKind::Literal(Literal::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// Value of an integer literal, looking through parentheses.
pub fn int_literal_value(ctx: &TreeContext, expr: NodeRef) -> Option<i64> {
    match ctx.kind(ctx.unparenthesized(expr)) {
        NodeKind::Literal(Literal::Int(i)) => Some(*i),
        _ => None,
    }
}

/// `true` for a missing branch or a block with no statements.
pub fn is_empty_statement(ctx: &TreeContext, stmt: Option<NodeRef>) -> bool {
    match stmt {
        None => true,
        Some(s) => matches!(ctx.kind(s), NodeKind::Block { stmts } if stmts.is_empty()),
    }
}
