//! Use the boolean result of `Set.add`/`Set.remove` instead of testing
//! `contains` first.
//!
//! ```text
//! if (!set.contains(x)) {          if (set.add(x)) {
//!     set.add(x);          →           log(x);
//!     log(x);                      }
//! }
//! ```

use recast_ir::analysis::{is_empty_statement, is_passive};
use recast_ir::matcher::matches;
use recast_ir::{NodeKind, NodeRef, PrefixOp, RewriteRule, Rewriter, TreeContext, WalkAction};

const SET_TYPE: &str = "java.util.Set";

pub struct UpdateSetRatherThanTestingFirst;

impl UpdateSetRatherThanTestingFirst {
    pub const NAME: &'static str = "UpdateSetRatherThanTestingFirst";
}

/// `receiver.<method>(argument)` on a set.
#[derive(Clone, Copy)]
struct SetCall {
    receiver: NodeRef,
    argument: NodeRef,
}

impl RewriteRule for UpdateSetRatherThanTestingFirst {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        let NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } = *ctx.kind(node)
        else {
            return WalkAction::Advance;
        };

        let test = ctx.unparenthesized(cond);
        let (contains, negated) = match *ctx.kind(test) {
            NodeKind::Prefix {
                op: PrefixOp::Not,
                operand,
            } => (set_call(ctx, operand, "contains"), true),
            _ => (set_call(ctx, test, "contains"), false),
        };
        let Some(contains) = contains else {
            return WalkAction::Advance;
        };
        if !is_passive(ctx, contains.receiver) || !is_passive(ctx, contains.argument) {
            tracing::trace!(node = %node, "contains operands have side effects");
            return WalkAction::Advance;
        }

        // `add` runs where the element was absent, `remove` where it was present.
        let (absent, present) = if negated {
            (Some(then_branch), else_branch)
        } else {
            (else_branch, Some(then_branch))
        };
        let candidates = [
            ("add", absent, present, !negated),
            ("remove", present, absent, negated),
        ];
        for (method, branch, opposite, negate) in candidates {
            let Some(branch) = branch else {
                continue;
            };
            let rewritten = rewrite_branch(
                ctx, rewriter, node, cond, contains, method, branch, opposite, negate,
            );
            if rewritten {
                return WalkAction::Skip;
            }
        }
        WalkAction::Advance
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// `receiver.<method>(argument)` where the receiver is typed as a set.
fn set_call(ctx: &TreeContext, expr: NodeRef, method: &str) -> Option<SetCall> {
    let NodeKind::MethodCall {
        receiver: Some(receiver),
        name,
        args,
    } = ctx.kind(ctx.unparenthesized(expr))
    else {
        return None;
    };
    if *name != method || args.len() != 1 {
        return None;
    }
    if !ctx.type_of(*receiver)?.is_subtype_of(SET_TYPE) {
        return None;
    }
    Some(SetCall {
        receiver: *receiver,
        argument: args[0],
    })
}

/// Try to fold `branch`'s leading `set.<method>(x);` into the `if`.
#[allow(clippy::too_many_arguments)]
fn rewrite_branch(
    ctx: &mut TreeContext,
    rewriter: &mut Rewriter,
    if_stmt: NodeRef,
    cond: NodeRef,
    contains: SetCall,
    method: &str,
    branch: NodeRef,
    opposite: Option<NodeRef>,
    negate: bool,
) -> bool {
    let stmts = ctx.statements_of(Some(branch));
    let Some(&first) = stmts.first() else {
        return false;
    };
    let NodeKind::ExprStmt { expr: call } = *ctx.kind(first) else {
        return false;
    };
    let Some(update) = set_call(ctx, call, method) else {
        return false;
    };
    if !matches(ctx, contains.receiver, update.receiver)
        || !matches(ctx, contains.argument, update.argument)
    {
        return false;
    }

    tracing::trace!(node = %if_stmt, method, "updating set directly");
    if stmts.len() == 1 && is_empty_statement(ctx, opposite) {
        let moved = ctx.take(first);
        rewriter.replace(if_stmt, moved);
    } else {
        let moved = ctx.take(call);
        let new_cond = if negate {
            ctx.not(moved)
        } else {
            moved.node()
        };
        let new_cond = ctx.as_child(new_cond);
        // The condition edit places the call before the statement that held it is dropped.
        rewriter.replace(cond, new_cond);
        crate::remove_statement(ctx, rewriter, first);
    }
    true
}
