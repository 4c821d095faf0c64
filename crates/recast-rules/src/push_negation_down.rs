//! Push `!` down into its operand.
//!
//! - `!!x` → `x`
//! - `!true` → `false`
//! - `!(a < b)` → `a >= b`
//! - `!(a && b)` → `(!a || !b)`, recursively through every operand
//!
//! `&`/`|` under `!` are boolean and follow the same laws. `^` is left alone.

use recast_ir::analysis::{boolean_literal, is_invertible_comparison};
use recast_ir::{
    Child, InfixOp, NodeKind, NodeRef, PrefixOp, RewriteRule, Rewriter, TreeContext, WalkAction,
};

pub struct PushNegationDown;

impl PushNegationDown {
    pub const NAME: &'static str = "PushNegationDown";
}

impl RewriteRule for PushNegationDown {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        let NodeKind::Prefix {
            op: PrefixOp::Not,
            operand,
        } = *ctx.kind(node)
        else {
            return WalkAction::Advance;
        };
        if !is_covered(ctx, operand) {
            return WalkAction::Advance;
        }

        let moved = ctx.take(operand);
        let pushed = push_down(ctx, moved.into());
        let result = ctx.parenthesize_for_parent(pushed, node);
        tracing::trace!(node = %node, "pushing negation down");
        let child = ctx.as_child(result);
        rewriter.replace(node, child);
        WalkAction::Skip
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// `true` if `!operand` has a form this rule rewrites.
fn is_covered(ctx: &TreeContext, operand: NodeRef) -> bool {
    let inner = ctx.unparenthesized(operand);
    match ctx.kind(inner) {
        NodeKind::Prefix {
            op: PrefixOp::Not, ..
        } => true,
        NodeKind::Infix { op, .. } if op.de_morgan_dual().is_some() => true,
        NodeKind::Infix { .. } => is_invertible_comparison(ctx, inner),
        _ => boolean_literal(ctx, inner).is_some(),
    }
}

/// The negation of `expr`, with `!` pushed as far down as it goes.
fn push_down(ctx: &mut TreeContext, expr: Child) -> NodeRef {
    let expr = without_parens(ctx, expr);
    let inner = expr.node();
    let dual = match ctx.kind(inner) {
        NodeKind::Infix { op, operands } => {
            op.de_morgan_dual().map(|dual| (dual, operands.clone()))
        }
        _ => None,
    };
    if let Some((dual, operands)) = dual {
        let parts = ctx.dissolve(expr, &operands);
        let negated: Vec<Child> = parts
            .into_iter()
            .map(|part| Child::Fresh(push_down(ctx, part)))
            .collect();
        let chain = ctx.infix_chain(dual, negated);
        return ctx.paren(chain);
    }
    let invert = is_invertible_comparison(ctx, inner);
    ctx.negate(expr, invert)
}

/// `expr` with its enclosing parentheses dropped. `negate` puts back the
/// ones the result still needs.
fn without_parens(ctx: &mut TreeContext, expr: Child) -> Child {
    let inner = ctx.unparenthesized(expr.node());
    if inner == expr.node() {
        return expr;
    }
    ctx.dissolve(expr, &[inner])
        .pop()
        .expect("dissolve hands back one child per part")
}
