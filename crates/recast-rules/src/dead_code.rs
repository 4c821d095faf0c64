//! Dead code elimination on `if` and `while`.
//!
//! ```text
//! if (b) { run(); } else {}      →  if (b) { run(); }
//! if (b) {} else { run(); }      →  if (!b) { run(); }
//! if (b) {}                      →  (removed)
//! if (col.add(x)) {}             →  col.add(x);
//! if (true) { run(); } else ...  →  { run(); }
//! while (false) { ... }          →  (removed)
//! ```

use recast_ir::analysis::{
    boolean_literal, is_empty_statement, is_invertible_comparison, is_passive,
};
use recast_ir::{Child, NodeKind, NodeRef, RewriteRule, Rewriter, TreeContext, WalkAction};

pub struct DeadCodeElimination;

impl DeadCodeElimination {
    pub const NAME: &'static str = "DeadCodeElimination";
}

impl RewriteRule for DeadCodeElimination {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        match *ctx.kind(node) {
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => rewrite_if(ctx, rewriter, node, cond, then_branch, else_branch),
            NodeKind::While { cond, .. } if boolean_literal(ctx, cond) == Some(false) => {
                crate::remove_statement(ctx, rewriter, node);
                WalkAction::Skip
            }
            _ => WalkAction::Advance,
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

fn rewrite_if(
    ctx: &mut TreeContext,
    rewriter: &mut Rewriter,
    node: NodeRef,
    cond: NodeRef,
    then_branch: NodeRef,
    else_branch: Option<NodeRef>,
) -> WalkAction {
    if let Some(value) = boolean_literal(ctx, cond) {
        let taken = if value { Some(then_branch) } else { else_branch };
        match taken {
            Some(branch) => {
                let moved = ctx.take(branch);
                rewriter.replace(node, moved);
            }
            None => crate::remove_statement(ctx, rewriter, node),
        }
        return WalkAction::Skip;
    }

    let then_empty = is_empty_statement(ctx, Some(then_branch));
    let else_empty = is_empty_statement(ctx, else_branch);

    if then_empty && else_empty {
        return remove_empty_if(ctx, rewriter, node, cond);
    }
    match else_branch {
        Some(else_branch) if else_empty => {
            rewriter.remove(else_branch);
            WalkAction::Skip
        }
        // if (c) {} else S  →  if (!c) S
        Some(else_branch) if then_empty => {
            let invert = is_invertible_comparison(ctx, cond);
            let cond = ctx.take(cond);
            let negated = ctx.negate(cond, invert);
            let moved = ctx.take(else_branch);
            let body: Child = if ctx.kind(else_branch).is_block() {
                moved.into()
            } else {
                ctx.block(vec![moved.into()]).into()
            };
            let inverted = ctx.if_stmt(negated, body, None);
            rewriter.replace(node, inverted);
            WalkAction::Skip
        }
        _ => WalkAction::Advance,
    }
}

/// `if (c) {}` goes away entirely when `c` is passive and becomes `c;`
/// when `c` is a single call or assignment.
fn remove_empty_if(
    ctx: &mut TreeContext,
    rewriter: &mut Rewriter,
    node: NodeRef,
    cond: NodeRef,
) -> WalkAction {
    if is_passive(ctx, cond) {
        crate::remove_statement(ctx, rewriter, node);
        return WalkAction::Skip;
    }
    let expr = ctx.unparenthesized(cond);
    match ctx.kind(expr) {
        NodeKind::MethodCall { .. } | NodeKind::Assignment { .. } => {
            let moved = ctx.take(expr);
            let stmt = ctx.expr_stmt(moved);
            rewriter.replace(node, stmt);
            WalkAction::Skip
        }
        _ => {
            tracing::trace!(node = %node, "empty if keeps a compound side effect");
            WalkAction::Advance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_rule;
    use insta::assert_snapshot;
    use recast_ir::fixture::TreeFixture;
    use recast_ir::{InfixOp, RewriteOptions, TypeDescriptor};

    /// Run the rule over `stmt; after();`.
    fn run(fx: &mut TreeFixture, stmt: NodeRef) -> (usize, String) {
        let after = fx.call_stmt("after", vec![]);
        let root = fx.ctx.unit(vec![stmt.into(), after.into()]);
        let (result, text) =
            run_rule(&mut fx.ctx, root, DeadCodeElimination, RewriteOptions::default());
        (result.total_changes, text)
    }

    fn run_block(fx: &mut TreeFixture) -> NodeRef {
        let run = fx.call_stmt("run", vec![]);
        fx.ctx.block(vec![run.into()])
    }

    #[test]
    fn empty_else_is_removed() {
        let mut fx = TreeFixture::new();
        let b = fx.var("b");
        let then_branch = run_block(&mut fx);
        let empty = fx.ctx.block(vec![]);
        let if_stmt = fx.ctx.if_stmt(b, then_branch, Some(empty.into()));

        let (_, text) = run(&mut fx, if_stmt);
        assert_snapshot!(text, @r"
        if (b) {
            run();
        }
        after();
        ");
    }

    #[test]
    fn empty_then_inverts_the_condition() {
        let mut fx = TreeFixture::new();
        let b = fx.var("b");
        let empty = fx.ctx.block(vec![]);
        let else_branch = run_block(&mut fx);
        let if_stmt = fx.ctx.if_stmt(b, empty, Some(else_branch.into()));

        let (_, text) = run(&mut fx, if_stmt);
        assert_snapshot!(text, @r"
        if (!b) {
            run();
        }
        after();
        ");

        let mut fx = TreeFixture::new();
        let i = fx.typed_var("i", TypeDescriptor::primitive("int"));
        let n = fx.typed_var("n", TypeDescriptor::primitive("int"));
        let lt = fx.ctx.infix(InfixOp::Less, vec![i.into(), n.into()]);
        let empty = fx.ctx.block(vec![]);
        let flag = fx.var("flag");
        let inner_then = run_block(&mut fx);
        let else_if = fx.ctx.if_stmt(flag, inner_then, None);
        let if_stmt = fx.ctx.if_stmt(lt, empty, Some(else_if.into()));

        let (_, text) = run(&mut fx, if_stmt);
        assert_snapshot!(text, @r"
        if (i >= n) {
            if (flag) {
                run();
            }
        }
        after();
        ");
    }

    #[test]
    fn empty_if_with_passive_condition_is_removed() {
        let mut fx = TreeFixture::new();
        let b = fx.var("b");
        let empty = fx.ctx.block(vec![]);
        let if_stmt = fx.ctx.if_stmt(b, empty, None);

        let (changes, text) = run(&mut fx, if_stmt);
        assert_eq!(changes, 1);
        assert_snapshot!(text, @"after();");
    }

    #[test]
    fn empty_if_keeps_side_effecting_condition() {
        let mut fx = TreeFixture::new();
        let col = fx.var("col");
        let one = fx.ctx.int_lit(1);
        let add = fx.method(col, "add", vec![one.into()]);
        let empty = fx.ctx.block(vec![]);
        let if_stmt = fx.ctx.if_stmt(add, empty, None);

        let (_, text) = run(&mut fx, if_stmt);
        assert_snapshot!(text, @r"
        col.add(1);
        after();
        ");
    }

    #[test]
    fn empty_if_with_compound_side_effects_declines() {
        let mut fx = TreeFixture::new();
        let first = fx.ctx.call(None, "first", vec![]);
        let second = fx.ctx.call(None, "second", vec![]);
        let and = fx
            .ctx
            .infix(InfixOp::ConditionalAnd, vec![first.into(), second.into()]);
        let empty = fx.ctx.block(vec![]);
        let if_stmt = fx.ctx.if_stmt(and, empty, None);

        let (changes, _) = run(&mut fx, if_stmt);
        assert_eq!(changes, 0);
    }

    #[test]
    fn constant_conditions_pick_a_branch() {
        let mut fx = TreeFixture::new();
        let t = fx.ctx.bool_lit(true);
        let then_branch = run_block(&mut fx);
        let skip = fx.call_stmt("skip", vec![]);
        let else_branch = fx.ctx.block(vec![skip.into()]);
        let if_stmt = fx.ctx.if_stmt(t, then_branch, Some(else_branch.into()));
        let (_, text) = run(&mut fx, if_stmt);
        assert_snapshot!(text, @r"
        {
            run();
        }
        after();
        ");

        let mut fx = TreeFixture::new();
        let f = fx.ctx.bool_lit(false);
        let then_branch = run_block(&mut fx);
        let if_stmt = fx.ctx.if_stmt(f, then_branch, None);
        let (_, text) = run(&mut fx, if_stmt);
        assert_snapshot!(text, @"after();");
    }

    #[test]
    fn loop_that_never_runs_is_removed() {
        let mut fx = TreeFixture::new();
        let f = fx.ctx.bool_lit(false);
        let body = run_block(&mut fx);
        let loop_stmt = fx.ctx.while_stmt(f, body);

        let (_, text) = run(&mut fx, loop_stmt);
        assert_snapshot!(text, @"after();");
    }
}
