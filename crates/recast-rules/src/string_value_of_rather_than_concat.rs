//! `"" + x` → `String.valueOf(x)`.

use recast_ir::{
    InfixOp, Literal, NodeKind, NodeRef, RewriteRule, Rewriter, TreeContext, WalkAction,
};

/// Operand types `String.valueOf` would not convert the way concatenation does.
const EXCLUDED_TYPES: &[&str] = &["java.lang.String", "char[]"];

pub struct StringValueOfRatherThanConcat;

impl StringValueOfRatherThanConcat {
    pub const NAME: &'static str = "StringValueOfRatherThanConcat";
}

impl RewriteRule for StringValueOfRatherThanConcat {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        let NodeKind::Infix {
            op: InfixOp::Plus,
            operands,
        } = ctx.kind(node)
        else {
            return WalkAction::Advance;
        };
        let [left, right] = operands[..] else {
            return WalkAction::Advance;
        };

        let value = if is_empty_string(ctx, left) {
            right
        } else if is_empty_string(ctx, right) {
            left
        } else {
            return WalkAction::Advance;
        };
        match ctx.type_of(value) {
            Some(ty) if !ty.is_one_of(EXCLUDED_TYPES) => {}
            _ => return WalkAction::Advance,
        }

        let value = ctx.take(value);
        let string = ctx.name("String", None, None);
        let call = ctx.call(Some(string.into()), "valueOf", vec![value.into()]);
        rewriter.replace(node, call);
        WalkAction::Skip
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

fn is_empty_string(ctx: &TreeContext, expr: NodeRef) -> bool {
    matches!(ctx.kind(expr), NodeKind::Literal(Literal::Str(s)) if s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_rule;
    use insta::assert_snapshot;
    use recast_ir::fixture::TreeFixture;
    use recast_ir::{Child, RewriteOptions, TypeDescriptor};

    fn rewrite(fx: &mut TreeFixture, operands: Vec<NodeRef>) -> String {
        let concat = fx
            .ctx
            .infix(InfixOp::Plus, operands.into_iter().map(Child::from).collect());
        let ret = fx.ctx.return_stmt(Some(concat.into()));
        let root = fx.ctx.unit(vec![ret.into()]);
        let (_, text) = run_rule(
            &mut fx.ctx,
            root,
            StringValueOfRatherThanConcat,
            RewriteOptions::default(),
        );
        text
    }

    #[test]
    fn empty_prefix() {
        let mut fx = TreeFixture::new();
        let empty = fx.ctx.string_lit("");
        let count = fx.typed_var("count", TypeDescriptor::primitive("int"));
        assert_snapshot!(rewrite(&mut fx, vec![empty, count]), @"return String.valueOf(count);");
    }

    #[test]
    fn empty_suffix() {
        let mut fx = TreeFixture::new();
        let obj = fx.typed_var("obj", TypeDescriptor::class("java.lang.Object"));
        let empty = fx.ctx.string_lit("");
        assert_snapshot!(rewrite(&mut fx, vec![obj, empty]), @"return String.valueOf(obj);");
    }

    #[test]
    fn strings_and_char_arrays_are_left_alone() {
        let mut fx = TreeFixture::new();
        let empty = fx.ctx.string_lit("");
        let s = fx.typed_var("s", TypeDescriptor::class("java.lang.String"));
        assert_snapshot!(rewrite(&mut fx, vec![empty, s]), @r#"return "" + s;"#);

        let mut fx = TreeFixture::new();
        let empty = fx.ctx.string_lit("");
        let chars = fx.typed_var("chars", TypeDescriptor::array("char[]"));
        assert_snapshot!(rewrite(&mut fx, vec![empty, chars]), @r#"return "" + chars;"#);
    }

    #[test]
    fn untyped_or_longer_concatenations_decline() {
        let mut fx = TreeFixture::new();
        let empty = fx.ctx.string_lit("");
        let null = fx.ctx.null_lit();
        assert_snapshot!(rewrite(&mut fx, vec![empty, null]), @r#"return "" + null;"#);

        let mut fx = TreeFixture::new();
        let empty = fx.ctx.string_lit("");
        let a = fx.typed_var("a", TypeDescriptor::primitive("int"));
        let b = fx.typed_var("b", TypeDescriptor::primitive("int"));
        assert_snapshot!(rewrite(&mut fx, vec![empty, a, b]), @r#"return "" + a + b;"#);

        let mut fx = TreeFixture::new();
        let label = fx.ctx.string_lit("n=");
        let n = fx.typed_var("n", TypeDescriptor::primitive("int"));
        assert_snapshot!(rewrite(&mut fx, vec![label, n]), @r#"return "n=" + n;"#);
    }
}
