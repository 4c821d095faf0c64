//! Node constructors used by rules and fixtures.
//!
//! Every constructor takes its children as `impl Into<Child>`: a plain
//! `NodeRef` for freshly built or copied nodes, or a [`Moved`] handle for a
//! subtree relocated from the live tree. Constructors attach the obvious
//! result type (`boolean` for comparisons and negations, `int` for integer
//! literals, and so on) so later rules can still reason about new nodes.
//!
//! [`Moved`]: crate::context::Moved

use smallvec::SmallVec;

use crate::context::{Child, TreeContext};
use crate::node::{InfixOp, Literal, NodeKind, PrefixOp, precedence};
use crate::refs::{BindingId, NodeRef, TypeRef};
use crate::symbol::Symbol;
use crate::types::TypeDescriptor;

impl TreeContext {
    fn boolean_type(&mut self) -> TypeRef {
        self.intern_type(TypeDescriptor::primitive("boolean"))
    }

    // === Literals and names ===

    pub fn bool_lit(&mut self, value: bool) -> NodeRef {
        let ty = self.boolean_type();
        self.create(NodeKind::Literal(Literal::Bool(value)), Some(ty))
    }

    pub fn int_lit(&mut self, value: i64) -> NodeRef {
        let ty = self.intern_type(TypeDescriptor::primitive("int"));
        self.create(NodeKind::Literal(Literal::Int(value)), Some(ty))
    }

    pub fn char_lit(&mut self, value: char) -> NodeRef {
        let ty = self.intern_type(TypeDescriptor::primitive("char"));
        self.create(NodeKind::Literal(Literal::Char(value)), Some(ty))
    }

    pub fn string_lit(&mut self, value: impl Into<String>) -> NodeRef {
        let ty = self.intern_type(TypeDescriptor::class("java.lang.String"));
        self.create(NodeKind::Literal(Literal::Str(value.into())), Some(ty))
    }

    pub fn null_lit(&mut self) -> NodeRef {
        self.create(NodeKind::Literal(Literal::Null), None)
    }

    pub fn name(
        &mut self,
        name: impl Into<Symbol>,
        binding: Option<BindingId>,
        ty: Option<TypeRef>,
    ) -> NodeRef {
        self.create(
            NodeKind::Name {
                name: name.into(),
                binding,
            },
            ty,
        )
    }

    /// `qualifier.name`, e.g. `Color.RED` for an enum constant.
    pub fn qualified_name(
        &mut self,
        qualifier: impl Into<Child>,
        name: impl Into<Child>,
    ) -> NodeRef {
        let qualifier = qualifier.into().node();
        let name = name.into().node();
        let ty = self.node(name).ty;
        self.create(NodeKind::QualifiedName { qualifier, name }, ty)
    }

    /// A type spelled out by its dotted name, e.g. `com.example.Color`.
    /// No segment carries a binding.
    pub fn type_name(&mut self, dotted: Symbol) -> NodeRef {
        let dotted = dotted.with_str(str::to_owned);
        let mut segments = dotted.split('.');
        let first = segments.next().expect("str::split yields at least one segment");
        let mut node = self.name(Symbol::from_dynamic(first), None, None);
        for segment in segments {
            let simple = self.name(Symbol::from_dynamic(segment), None, None);
            node = self.qualified_name(node, simple);
        }
        node
    }

    pub fn field_access(
        &mut self,
        target: impl Into<Child>,
        name: impl Into<Symbol>,
        ty: Option<TypeRef>,
    ) -> NodeRef {
        self.create(
            NodeKind::FieldAccess {
                target: target.into().node(),
                name: name.into(),
            },
            ty,
        )
    }

    // === Operators ===

    pub fn paren(&mut self, expr: impl Into<Child>) -> NodeRef {
        let expr = expr.into().node();
        let ty = self.node(expr).ty;
        self.create(NodeKind::Parenthesized { expr }, ty)
    }

    pub fn prefix(&mut self, op: PrefixOp, operand: impl Into<Child>) -> NodeRef {
        let operand = operand.into().node();
        let ty = match op {
            PrefixOp::Not => Some(self.boolean_type()),
            _ => self.node(operand).ty,
        };
        self.create(NodeKind::Prefix { op, operand }, ty)
    }

    /// `!operand`, parenthesizing the operand when it binds looser than `!`.
    pub fn not(&mut self, operand: impl Into<Child>) -> NodeRef {
        let operand = self.parenthesize_if_needed(operand, precedence::PREFIX);
        self.prefix(PrefixOp::Not, operand)
    }

    /// An infix chain of at least two operands.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two operands are given.
    pub fn infix(&mut self, op: InfixOp, operands: Vec<Child>) -> NodeRef {
        assert!(
            operands.len() >= 2,
            "infix: `{}` needs at least two operands",
            op.as_str()
        );
        let operands: SmallVec<[NodeRef; 4]> = operands.iter().map(Child::node).collect();
        let ty = if op.is_comparison()
            || matches!(op, InfixOp::ConditionalAnd | InfixOp::ConditionalOr)
        {
            Some(self.boolean_type())
        } else {
            self.node(operands[0]).ty
        };
        self.create(NodeKind::Infix { op, operands }, ty)
    }

    /// Like [`infix`](Self::infix), but a single operand is returned as is
    /// and each operand is parenthesized where the chain needs it.
    ///
    /// # Panics
    ///
    /// Panics if `operands` is empty.
    pub fn infix_chain(&mut self, op: InfixOp, operands: Vec<Child>) -> NodeRef {
        assert!(!operands.is_empty(), "infix_chain: no operands");
        if operands.len() == 1 {
            return operands[0].node();
        }
        let operands = operands
            .into_iter()
            .map(|operand| Child::Fresh(self.parenthesize_if_needed(operand, op.precedence())))
            .collect();
        self.infix(op, operands)
    }

    pub fn assign(&mut self, target: impl Into<Child>, value: impl Into<Child>) -> NodeRef {
        let target = target.into().node();
        let value = value.into().node();
        let ty = self.node(target).ty;
        self.create(
            NodeKind::Assignment {
                op: None,
                target,
                value,
            },
            ty,
        )
    }

    /// `receiver.name(args)`, or `name(args)` without a receiver.
    pub fn call(
        &mut self,
        receiver: Option<Child>,
        name: impl Into<Symbol>,
        args: Vec<Child>,
    ) -> NodeRef {
        let receiver = receiver.map(|r| self.parenthesize_if_needed(r, precedence::PRIMARY));
        let name = name.into();
        let ty = if name == "isEmpty" || name == "equals" {
            Some(self.boolean_type())
        } else if name == "valueOf" {
            Some(self.intern_type(TypeDescriptor::class("java.lang.String")))
        } else {
            None
        };
        self.create(
            NodeKind::MethodCall {
                receiver,
                name,
                args: args.iter().map(Child::node).collect(),
            },
            ty,
        )
    }

    /// `new T(args)` where `ty` is `T`.
    pub fn new_object(&mut self, ty: TypeRef, args: Vec<Child>) -> NodeRef {
        let args = args.iter().map(Child::node).collect();
        self.create(NodeKind::New { args }, Some(ty))
    }

    // === Statements ===

    pub fn expr_stmt(&mut self, expr: impl Into<Child>) -> NodeRef {
        let expr = expr.into().node();
        self.create(NodeKind::ExprStmt { expr }, None)
    }

    pub fn var_decl(
        &mut self,
        name: impl Into<Symbol>,
        binding: Option<BindingId>,
        ty: Option<TypeRef>,
        init: Option<Child>,
    ) -> NodeRef {
        self.create(
            NodeKind::VarDecl {
                name: name.into(),
                binding,
                init: init.map(|c| c.node()),
            },
            ty,
        )
    }

    pub fn block(&mut self, stmts: Vec<Child>) -> NodeRef {
        let stmts = stmts.iter().map(Child::node).collect();
        self.create(NodeKind::Block { stmts }, None)
    }

    pub fn if_stmt(
        &mut self,
        cond: impl Into<Child>,
        then_branch: impl Into<Child>,
        else_branch: Option<Child>,
    ) -> NodeRef {
        let cond = cond.into().node();
        let then_branch = then_branch.into().node();
        self.create(
            NodeKind::If {
                cond,
                then_branch,
                else_branch: else_branch.map(|c| c.node()),
            },
            None,
        )
    }

    pub fn while_stmt(&mut self, cond: impl Into<Child>, body: impl Into<Child>) -> NodeRef {
        let cond = cond.into().node();
        let body = body.into().node();
        self.create(NodeKind::While { cond, body }, None)
    }

    pub fn switch_stmt(&mut self, discriminant: impl Into<Child>, body: Vec<Child>) -> NodeRef {
        let discriminant = discriminant.into().node();
        let body = body.iter().map(Child::node).collect();
        self.create(NodeKind::Switch { discriminant, body }, None)
    }

    /// `case label:`; `None` builds `default:`.
    pub fn case(&mut self, label: Option<Child>) -> NodeRef {
        self.create(
            NodeKind::SwitchCase {
                label: label.map(|c| c.node()),
            },
            None,
        )
    }

    pub fn break_stmt(&mut self, label: Option<Symbol>) -> NodeRef {
        self.create(NodeKind::Break { label }, None)
    }

    pub fn continue_stmt(&mut self, label: Option<Symbol>) -> NodeRef {
        self.create(NodeKind::Continue { label }, None)
    }

    pub fn return_stmt(&mut self, value: Option<Child>) -> NodeRef {
        self.create(
            NodeKind::Return {
                value: value.map(|c| c.node()),
            },
            None,
        )
    }

    pub fn throw_stmt(&mut self, expr: impl Into<Child>) -> NodeRef {
        let expr = expr.into().node();
        self.create(NodeKind::Throw { expr }, None)
    }

    pub fn unit(&mut self, members: Vec<Child>) -> NodeRef {
        let members = members.iter().map(Child::node).collect();
        self.create(NodeKind::Unit { members }, None)
    }

    // === Precedence ===

    /// Wrap `expr` in parentheses if it binds looser than a slot of
    /// precedence `outer`.
    ///
    /// Equal precedence also gets parentheses below the prefix level, which
    /// keeps right-nested chains like `a - (b - c)` intact.
    pub fn parenthesize_if_needed(&mut self, expr: impl Into<Child>, outer: u8) -> NodeRef {
        let expr = expr.into();
        let inner = self.kind(expr.node()).precedence().unwrap_or(precedence::PRIMARY);
        if inner < outer || (inner == outer && inner < precedence::PREFIX) {
            self.paren(expr)
        } else {
            expr.node()
        }
    }

    /// Parenthesize `expr` for the slot `target` currently occupies.
    ///
    /// Used when `expr` is about to replace `target`.
    pub fn parenthesize_for_parent(&mut self, expr: impl Into<Child>, target: NodeRef) -> NodeRef {
        let outer = self.slot_precedence(target);
        match outer {
            Some(outer) => self.parenthesize_if_needed(expr, outer),
            None => expr.into().node(),
        }
    }

    /// Binding strength required of whatever sits in `target`'s slot.
    ///
    /// `None` when the slot accepts any expression (statement slots,
    /// arguments, parentheses).
    pub fn slot_precedence(&self, target: NodeRef) -> Option<u8> {
        let parent = self.parent(target)?;
        match self.kind(parent) {
            NodeKind::Infix { op, .. } => Some(op.precedence()),
            NodeKind::Prefix { .. } => Some(precedence::PREFIX),
            NodeKind::Postfix { .. } => Some(precedence::POSTFIX),
            NodeKind::FieldAccess { .. } => Some(precedence::PRIMARY),
            NodeKind::MethodCall { receiver, .. } if *receiver == Some(target) => {
                Some(precedence::PRIMARY)
            }
            NodeKind::Assignment { target: lhs, .. } if *lhs == target => {
                Some(precedence::PRIMARY)
            }
            _ => None,
        }
    }

    // === Negation ===

    /// The logical negation of a boolean expression.
    ///
    /// Double negation collapses, literals flip, and a plain comparison gets
    /// its inverse operator instead of a `!` wrapper. Everything else is
    /// wrapped in `!`, parenthesized as needed. Comparisons that must not be
    /// inverted (floating-point orderings) should be excluded by the caller
    /// through `invert_comparison = false`.
    pub fn negate(&mut self, expr: impl Into<Child>, invert_comparison: bool) -> NodeRef {
        let expr = expr.into();
        let inner = self.unparenthesized(expr.node());
        match self.kind(inner).clone() {
            NodeKind::Prefix {
                op: PrefixOp::Not,
                operand,
            } => {
                self.dissolve(expr, &[operand]);
                operand
            }
            NodeKind::Literal(Literal::Bool(value)) => {
                self.release(expr);
                self.bool_lit(!value)
            }
            NodeKind::Infix { op, operands } if invert_comparison && operands.len() == 2 => {
                match op.inverse_comparison() {
                    Some(inverse) => {
                        let parts = self.dissolve(expr, &operands);
                        self.infix(inverse, parts)
                    }
                    None => self.not(expr),
                }
            }
            _ => self.not(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fixture::TreeFixture;
    use crate::node::InfixOp;
    use crate::printer::print_node;
    use insta::assert_snapshot;

    #[test]
    fn not_parenthesizes_infix_operand() {
        let mut fx = TreeFixture::new();
        let a = fx.var("a");
        let b = fx.var("b");
        let and = fx.ctx.infix(InfixOp::ConditionalAnd, vec![a.into(), b.into()]);
        let not = fx.ctx.not(and);
        assert_snapshot!(print_node(&fx.ctx, not), @"!(a && b)");
    }

    #[test]
    fn negate_inverts_comparison() {
        let mut fx = TreeFixture::new();
        let a = fx.var("a");
        let b = fx.var("b");
        let lt = fx.ctx.infix(InfixOp::Less, vec![a.into(), b.into()]);
        let negated = fx.ctx.negate(lt, true);
        assert_snapshot!(print_node(&fx.ctx, negated), @"a >= b");
        assert!(fx.ctx.is_erased(lt));
        assert_eq!(fx.ctx.parent(a), Some(negated));
    }

    #[test]
    fn negate_keeps_comparison_when_asked() {
        let mut fx = TreeFixture::new();
        let a = fx.var("a");
        let b = fx.var("b");
        let lt = fx.ctx.infix(InfixOp::Less, vec![a.into(), b.into()]);
        let negated = fx.ctx.negate(lt, false);
        assert_snapshot!(print_node(&fx.ctx, negated), @"!(a < b)");
    }

    #[test]
    fn negate_collapses_double_negation() {
        let mut fx = TreeFixture::new();
        let a = fx.var("a");
        let not = fx.ctx.not(a);
        let negated = fx.ctx.negate(not, true);
        assert_eq!(negated, a);
        assert_eq!(fx.ctx.parent(a), None);
    }

    #[test]
    fn infix_chain_parenthesizes_looser_operands() {
        let mut fx = TreeFixture::new();
        let a = fx.var("a");
        let b = fx.var("b");
        let c = fx.var("c");
        let or = fx.ctx.infix(InfixOp::ConditionalOr, vec![a.into(), b.into()]);
        let and = fx.ctx.infix_chain(InfixOp::ConditionalAnd, vec![or.into(), c.into()]);
        assert_snapshot!(print_node(&fx.ctx, and), @"(a || b) && c");
    }
}
