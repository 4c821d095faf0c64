//! Semantic matcher.
//!
//! Decides whether two expressions are interchangeable for a rewrite
//! precondition ("same receiver", "same argument"). Parentheses are
//! ignored and names compare by resolved binding, never by spelling. A
//! qualified name matches only a qualified name whose every segment
//! resolves to the same binding. Anything that cannot be proven equal is
//! unequal.

use crate::analysis::is_passive;
use crate::context::TreeContext;
use crate::node::NodeKind;
use crate::refs::NodeRef;

/// `true` if `a` and `b` denote the same computation.
pub fn matches(ctx: &TreeContext, a: NodeRef, b: NodeRef) -> bool {
    let a = ctx.unparenthesized(a);
    let b = ctx.unparenthesized(b);
    if a == b {
        return true;
    }
    match (ctx.kind(a), ctx.kind(b)) {
        (NodeKind::Literal(x), NodeKind::Literal(y)) => x == y,
        (
            NodeKind::Name { binding: Some(x), .. },
            NodeKind::Name { binding: Some(y), .. },
        ) => x == y,
        (
            NodeKind::QualifiedName {
                qualifier: q1,
                name: n1,
            },
            NodeKind::QualifiedName {
                qualifier: q2,
                name: n2,
            },
        ) => matches(ctx, *n1, *n2) && matches(ctx, *q1, *q2),
        (
            NodeKind::FieldAccess {
                target: t1,
                name: n1,
            },
            NodeKind::FieldAccess {
                target: t2,
                name: n2,
            },
        ) => n1 == n2 && matches(ctx, *t1, *t2),
        (
            NodeKind::Prefix {
                op: o1,
                operand: x,
            },
            NodeKind::Prefix {
                op: o2,
                operand: y,
            },
        ) => o1 == o2 && matches(ctx, *x, *y),
        (
            NodeKind::Postfix {
                op: o1,
                operand: x,
            },
            NodeKind::Postfix {
                op: o2,
                operand: y,
            },
        ) => o1 == o2 && matches(ctx, *x, *y),
        (
            NodeKind::Infix {
                op: o1,
                operands: xs,
            },
            NodeKind::Infix {
                op: o2,
                operands: ys,
            },
        ) => {
            if o1 == o2 && all_match(ctx, xs, ys) {
                return true;
            }
            // a < b is b > a, a == b is b == a; only when reordering the
            // evaluation of the operands is unobservable
            xs.len() == 2
                && ys.len() == 2
                && o1.is_comparison()
                && *o2 == o1.mirrored()
                && xs.iter().chain(ys.iter()).all(|o| is_passive(ctx, *o))
                && matches(ctx, xs[0], ys[1])
                && matches(ctx, xs[1], ys[0])
        }
        (
            NodeKind::Assignment {
                op: o1,
                target: t1,
                value: v1,
            },
            NodeKind::Assignment {
                op: o2,
                target: t2,
                value: v2,
            },
        ) => o1 == o2 && matches(ctx, *t1, *t2) && matches(ctx, *v1, *v2),
        (
            NodeKind::MethodCall {
                receiver: r1,
                name: n1,
                args: a1,
            },
            NodeKind::MethodCall {
                receiver: r2,
                name: n2,
                args: a2,
            },
        ) => {
            let receivers = match (r1, r2) {
                (None, None) => true,
                (Some(x), Some(y)) => matches(ctx, *x, *y),
                _ => false,
            };
            n1 == n2 && receivers && all_match(ctx, a1, a2)
        }
        _ => false,
    }
}

fn all_match(ctx: &TreeContext, xs: &[NodeRef], ys: &[NodeRef]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| matches(ctx, *x, *y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::TreeFixture;
    use crate::node::InfixOp;

    #[test]
    fn names_compare_by_binding() {
        let mut fx = TreeFixture::new();
        let a1 = fx.var("a");
        let a2 = fx.var("a");
        let b = fx.var("b");
        assert!(matches(&fx.ctx, a1, a2));
        assert!(!matches(&fx.ctx, a1, b));

        let u1 = fx.unresolved("u");
        let u2 = fx.unresolved("u");
        assert!(!matches(&fx.ctx, u1, u2));
    }

    /// `<owner>.<field>` with both segments resolved.
    fn qualified(fx: &mut TreeFixture, owner: &'static str, field: &'static str) -> NodeRef {
        let owner = fx.var(owner);
        let field = fx.var(field);
        fx.ctx.qualified_name(owner, field)
    }

    #[test]
    fn qualified_names_compare_every_segment() {
        let mut fx = TreeFixture::new();
        let a_set = qualified(&mut fx, "a", "set");
        let a_set_again = qualified(&mut fx, "a", "set");
        let b_set = qualified(&mut fx, "b", "set");
        assert!(matches(&fx.ctx, a_set, a_set_again));
        assert!(!matches(&fx.ctx, a_set, b_set));

        // `s` is not `other.s`, even though the last segments agree.
        let s = fx.var("s");
        let other_s = qualified(&mut fx, "other", "s");
        assert!(!matches(&fx.ctx, s, other_s));
        assert!(!matches(&fx.ctx, other_s, s));
    }

    #[test]
    fn unresolved_qualifier_never_matches() {
        let mut fx = TreeFixture::new();
        let mut through_unresolved = || {
            let owner = fx.unresolved("Config");
            let field = fx.var("limit");
            fx.ctx.qualified_name(owner, field)
        };
        let first = through_unresolved();
        let second = through_unresolved();
        assert!(!matches(&fx.ctx, first, second));
    }

    #[test]
    fn parentheses_are_ignored() {
        let mut fx = TreeFixture::new();
        let x1 = fx.var("x");
        let paren = fx.ctx.paren(x1);
        let x2 = fx.var("x");
        assert!(matches(&fx.ctx, paren, x2));
    }

    #[test]
    fn comparisons_are_canonicalized() {
        let mut fx = TreeFixture::new();
        let a = fx.var("a");
        let b = fx.var("b");
        let lt = fx.ctx.infix(InfixOp::Less, vec![a.into(), b.into()]);
        let b2 = fx.var("b");
        let a2 = fx.var("a");
        let gt = fx.ctx.infix(InfixOp::Greater, vec![b2.into(), a2.into()]);
        assert!(matches(&fx.ctx, lt, gt));

        let a3 = fx.var("a");
        let b3 = fx.var("b");
        let le = fx.ctx.infix(InfixOp::LessEquals, vec![b3.into(), a3.into()]);
        assert!(!matches(&fx.ctx, lt, le));
    }

    #[test]
    fn calls_never_commute() {
        let mut fx = TreeFixture::new();
        let f1 = fx.ctx.call(None, "f", vec![]);
        let g1 = fx.ctx.call(None, "g", vec![]);
        let eq1 = fx.ctx.infix(InfixOp::Equals, vec![f1.into(), g1.into()]);
        let g2 = fx.ctx.call(None, "g", vec![]);
        let f2 = fx.ctx.call(None, "f", vec![]);
        let eq2 = fx.ctx.infix(InfixOp::Equals, vec![g2.into(), f2.into()]);
        assert!(!matches(&fx.ctx, eq1, eq2));

        let f3 = fx.ctx.call(None, "f", vec![]);
        assert!(matches(&fx.ctx, f1, f3));
    }

    #[test]
    fn method_calls_compare_receiver_and_arguments() {
        let mut fx = TreeFixture::new();
        let set1 = fx.var("set");
        let x1 = fx.var("x");
        let c1 = fx.method(set1, "contains", vec![x1.into()]);
        let set2 = fx.var("set");
        let x2 = fx.var("x");
        let c2 = fx.method(set2, "contains", vec![x2.into()]);
        let other = fx.var("other");
        let x3 = fx.var("x");
        let c3 = fx.method(other, "contains", vec![x3.into()]);
        assert!(matches(&fx.ctx, c1, c2));
        assert!(!matches(&fx.ctx, c1, c3));
    }
}
