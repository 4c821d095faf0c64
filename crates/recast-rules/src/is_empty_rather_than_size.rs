//! `size()`/`length()` compared with 0 or 1 → `isEmpty()`.
//!
//! ```text
//! list.size() == 0    →  list.isEmpty()
//! 0 < list.size()     →  !list.isEmpty()
//! list.size() >= 0    →  true
//! ```

use recast_ir::analysis::{int_literal_value, is_passive};
use recast_ir::{InfixOp, NodeKind, NodeRef, RewriteRule, Rewriter, TreeContext, WalkAction};

/// `String.isEmpty()` first appeared in Java 6.
const STRING_IS_EMPTY_SINCE: u32 = 6;

const SIZED_TYPES: &[&str] = &["java.util.Collection", "java.util.Map"];

pub struct IsEmptyRatherThanSize;

impl IsEmptyRatherThanSize {
    pub const NAME: &'static str = "IsEmptyRatherThanSize";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Literal(bool),
    IsEmpty,
    NotEmpty,
}

/// What `size() <op> literal` reduces to, with the call on the left.
fn lookup(op: InfixOp, literal: i64) -> Option<Outcome> {
    use InfixOp::*;
    Some(match (literal, op) {
        (0, GreaterEquals) => Outcome::Literal(true),
        (0, Less) => Outcome::Literal(false),
        (0, Equals | LessEquals) => Outcome::IsEmpty,
        (0, NotEquals | Greater) => Outcome::NotEmpty,
        (1, GreaterEquals) => Outcome::NotEmpty,
        (1, Less) => Outcome::IsEmpty,
        _ => return None,
    })
}

impl RewriteRule for IsEmptyRatherThanSize {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        let NodeKind::Infix { op, operands } = ctx.kind(node) else {
            return WalkAction::Advance;
        };
        if operands.len() != 2 || !op.is_comparison() {
            return WalkAction::Advance;
        }
        let (op, left, right) = (*op, operands[0], operands[1]);
        let language_level = rewriter.options().language_level;

        let found = [(op, left, right), (op.mirrored(), right, left)]
            .into_iter()
            .find_map(|(op, call, literal)| {
                let receiver = sized_receiver(ctx, call, language_level)?;
                let outcome = lookup(op, int_literal_value(ctx, literal)?)?;
                Some((receiver, outcome))
            });
        let Some((receiver, outcome)) = found else {
            return WalkAction::Advance;
        };

        let replacement = match outcome {
            // The receiver is no longer evaluated.
            Outcome::Literal(_) if !is_passive(ctx, receiver) => {
                tracing::trace!(node = %node, "size receiver has side effects");
                return WalkAction::Advance;
            }
            Outcome::Literal(value) => ctx.bool_lit(value),
            Outcome::IsEmpty | Outcome::NotEmpty => {
                let receiver = ctx.take(receiver);
                let call = ctx.call(Some(receiver.into()), "isEmpty", vec![]);
                if outcome == Outcome::NotEmpty {
                    ctx.not(call)
                } else {
                    call
                }
            }
        };
        let replacement = ctx.parenthesize_for_parent(replacement, node);
        rewriter.replace(node, replacement);
        WalkAction::Skip
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Receiver of `call` if it is `size()` on a collection or map, or
/// `length()` on a string where the language level has `isEmpty()`.
fn sized_receiver(ctx: &TreeContext, call: NodeRef, language_level: u32) -> Option<NodeRef> {
    let NodeKind::MethodCall {
        receiver: Some(receiver),
        name,
        args,
    } = ctx.kind(ctx.unparenthesized(call))
    else {
        return None;
    };
    if !args.is_empty() {
        return None;
    }
    let ty = ctx.type_of(*receiver)?;
    let eligible = if *name == "size" {
        SIZED_TYPES.iter().any(|t| ty.is_subtype_of(t))
    } else if *name == "length" {
        ty.name == "java.lang.String" && language_level >= STRING_IS_EMPTY_SINCE
    } else {
        false
    };
    eligible.then_some(*receiver)
}
