//! `switch` with at most two case groups → `if`/`else`.
//!
//! ```text
//! switch (k) {                 if (k == 1) {
//!     case 1:                      a();
//!         a();          →      } else {
//!         break;                   b();
//!     default:                 }
//!         b();
//! }
//! ```

use std::collections::HashSet;

use recast_ir::analysis::{
    contains_unlabeled_break, declared_locals, ends_with_jump, is_passive, references_any,
};
use recast_ir::{
    Child, InfixOp, NodeKind, NodeRef, RewriteRule, Rewriter, TreeContext, TypeKind, WalkAction,
    precedence,
};

pub struct IfRatherThanTwoSwitchCases;

impl IfRatherThanTwoSwitchCases {
    pub const NAME: &'static str = "IfRatherThanTwoSwitchCases";
}

/// One or more case labels sharing a statement run.
#[derive(Debug, Default)]
struct CaseGroup {
    labels: Vec<NodeRef>,
    stmts: Vec<NodeRef>,
    is_default: bool,
}

impl RewriteRule for IfRatherThanTwoSwitchCases {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        let NodeKind::Switch { discriminant, body } = ctx.kind(node).clone() else {
            return WalkAction::Advance;
        };
        if body.is_empty() || !is_passive(ctx, discriminant) {
            return WalkAction::Advance;
        }
        let Some(mut groups) = collect_groups(ctx, &body) else {
            tracing::trace!(node = %node, "switch cannot become an if");
            return WalkAction::Advance;
        };
        if !strip_trailing_breaks(ctx, &mut groups) {
            tracing::trace!(node = %node, "switch group exits early");
            return WalkAction::Advance;
        }

        if let Some(pos) = groups.iter().position(|g| g.is_default) {
            let default = groups.remove(pos);
            groups.push(default);
        }

        let replacement = fold_groups(ctx, discriminant, groups);
        match replacement {
            Some(stmt) => rewriter.replace(node, stmt),
            None => crate::remove_statement(ctx, rewriter, node),
        }
        WalkAction::Skip
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Split a switch body into case groups.
///
/// `None` if there are more than two groups, if a statement precedes the
/// first label, or if a group reads a local declared by an earlier group.
fn collect_groups(ctx: &TreeContext, body: &[NodeRef]) -> Option<Vec<CaseGroup>> {
    let mut groups: Vec<CaseGroup> = Vec::new();
    let mut current: Option<CaseGroup> = None;
    let mut previous_locals: HashSet<_> = HashSet::new();
    let mut case_locals = Vec::new();
    let mut previous_was_case = false;

    for &item in body {
        if let NodeKind::SwitchCase { label } = ctx.kind(item) {
            if !previous_was_case {
                if let Some(done) = current.take() {
                    groups.push(done);
                    if groups.len() >= 2 {
                        return None;
                    }
                }
                previous_locals.extend(case_locals.drain(..));
            }
            let group = current.get_or_insert_with(CaseGroup::default);
            match label {
                Some(label) => group.labels.push(*label),
                None => group.is_default = true,
            }
            previous_was_case = true;
        } else {
            let group = current.as_mut()?;
            if references_any(ctx, item, &previous_locals) {
                return None;
            }
            case_locals.extend(declared_locals(ctx, item)?);
            group.stmts.push(item);
            previous_was_case = false;
        }
    }

    groups.extend(current);
    Some(groups)
}

/// Drop each group's trailing `break;`.
///
/// Returns `false` if a group other than the last (in source order) could
/// fall into the next one, or if a `break;` remains that would retarget to
/// an enclosing loop once the switch is gone.
fn strip_trailing_breaks(ctx: &TreeContext, groups: &mut [CaseGroup]) -> bool {
    let last = groups.len() - 1;
    for (i, group) in groups.iter_mut().enumerate() {
        if i != last && !group.stmts.last().is_some_and(|s| ends_with_jump(ctx, *s)) {
            return false;
        }
        let trailing_break = group
            .stmts
            .last()
            .is_some_and(|s| matches!(ctx.kind(*s), NodeKind::Break { label: None }));
        if trailing_break {
            group.stmts.pop();
        }
        if group.stmts.iter().any(|s| contains_unlabeled_break(ctx, *s)) {
            return false;
        }
    }
    true
}

/// Build the replacement, innermost (last) group first.
///
/// `None` when every group is empty.
fn fold_groups(
    ctx: &mut TreeContext,
    discriminant: NodeRef,
    groups: Vec<CaseGroup>,
) -> Option<NodeRef> {
    let mut acc: Option<NodeRef> = None;
    for group in groups.into_iter().rev() {
        let stmts: Vec<Child> = group.stmts.iter().map(|s| ctx.take(*s).into()).collect();
        acc = match acc {
            Some(else_branch) => {
                let cond = condition(ctx, discriminant, &group.labels);
                let then_branch = ctx.block(stmts);
                Some(ctx.if_stmt(cond, then_branch, Some(else_branch.into())))
            }
            // An empty last group contributes nothing, not even an else.
            None if stmts.is_empty() => None,
            None if group.is_default => Some(ctx.block(stmts)),
            None => {
                let cond = condition(ctx, discriminant, &group.labels);
                let then_branch = ctx.block(stmts);
                Some(ctx.if_stmt(cond, then_branch, None))
            }
        };
    }
    acc
}

/// `label1-test || label2-test || ...` against a copy of the discriminant.
fn condition(ctx: &mut TreeContext, discriminant: NodeRef, labels: &[NodeRef]) -> NodeRef {
    let tests: Vec<Child> = labels
        .iter()
        .map(|label| equality(ctx, discriminant, *label).into())
        .collect();
    ctx.infix_chain(InfixOp::ConditionalOr, tests)
}

fn equality(ctx: &mut TreeContext, discriminant: NodeRef, label: NodeRef) -> NodeRef {
    let label_type = ctx.type_of(label).cloned();
    let copy = ctx.deep_copy(discriminant);
    let value = ctx.take(label);
    match label_type {
        Some(ty) if ty.kind == TypeKind::Boxed || ty.name == "java.lang.String" => {
            ctx.call(Some(value.into()), "equals", vec![copy.into()])
        }
        Some(ty) if ty.kind == TypeKind::Enum => {
            let qualifier = ctx.type_name(ty.name);
            let constant = ctx.qualified_name(qualifier, value);
            ctx.infix(InfixOp::Equals, vec![copy.into(), constant.into()])
        }
        _ => {
            let lhs = ctx.parenthesize_if_needed(copy, precedence::EQUALITY);
            ctx.infix(InfixOp::Equals, vec![lhs.into(), value.into()])
        }
    }
}
