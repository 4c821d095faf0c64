//! Node kinds and operators.
//!
//! `NodeKind` is a closed union: every analysis and rule matches on it
//! exhaustively, so adding a kind forces each of them to be revisited.

use smallvec::SmallVec;

use crate::refs::{BindingId, NodeRef};
use crate::symbol::Symbol;

// ============================================================================
// Operators
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrefixOp {
    Not,
    Minus,
    Plus,
    Complement,
    Increment,
    Decrement,
}

impl PrefixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOp::Not => "!",
            PrefixOp::Minus => "-",
            PrefixOp::Plus => "+",
            PrefixOp::Complement => "~",
            PrefixOp::Increment => "++",
            PrefixOp::Decrement => "--",
        }
    }

    pub fn has_side_effect(self) -> bool {
        matches!(self, PrefixOp::Increment | PrefixOp::Decrement)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Times,
    Divide,
    Remainder,
    Plus,
    Minus,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    Equals,
    NotEquals,
    And,
    Xor,
    Or,
    ConditionalAnd,
    ConditionalOr,
}

impl InfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Times => "*",
            InfixOp::Divide => "/",
            InfixOp::Remainder => "%",
            InfixOp::Plus => "+",
            InfixOp::Minus => "-",
            InfixOp::LeftShift => "<<",
            InfixOp::RightShift => ">>",
            InfixOp::UnsignedRightShift => ">>>",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
            InfixOp::LessEquals => "<=",
            InfixOp::GreaterEquals => ">=",
            InfixOp::Equals => "==",
            InfixOp::NotEquals => "!=",
            InfixOp::And => "&",
            InfixOp::Xor => "^",
            InfixOp::Or => "|",
            InfixOp::ConditionalAnd => "&&",
            InfixOp::ConditionalOr => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            InfixOp::ConditionalOr => precedence::CONDITIONAL_OR,
            InfixOp::ConditionalAnd => precedence::CONDITIONAL_AND,
            InfixOp::Or => precedence::OR,
            InfixOp::Xor => precedence::XOR,
            InfixOp::And => precedence::AND,
            InfixOp::Equals | InfixOp::NotEquals => precedence::EQUALITY,
            InfixOp::Less | InfixOp::Greater | InfixOp::LessEquals | InfixOp::GreaterEquals => {
                precedence::RELATIONAL
            }
            InfixOp::LeftShift | InfixOp::RightShift | InfixOp::UnsignedRightShift => {
                precedence::SHIFT
            }
            InfixOp::Plus | InfixOp::Minus => precedence::ADDITIVE,
            InfixOp::Times | InfixOp::Divide | InfixOp::Remainder => precedence::MULTIPLICATIVE,
        }
    }

    /// `==`, `!=`, `<`, `>`, `<=`, `>=`.
    pub fn is_comparison(self) -> bool {
        self.precedence() == precedence::EQUALITY || self.precedence() == precedence::RELATIONAL
    }

    /// `<`, `>`, `<=`, `>=`.
    pub fn is_ordering(self) -> bool {
        self.precedence() == precedence::RELATIONAL
    }

    /// The comparison whose result is the logical negation of this one.
    pub fn inverse_comparison(self) -> Option<InfixOp> {
        Some(match self {
            InfixOp::Equals => InfixOp::NotEquals,
            InfixOp::NotEquals => InfixOp::Equals,
            InfixOp::Less => InfixOp::GreaterEquals,
            InfixOp::GreaterEquals => InfixOp::Less,
            InfixOp::Greater => InfixOp::LessEquals,
            InfixOp::LessEquals => InfixOp::Greater,
            _ => return None,
        })
    }

    /// The operator to use when the two operands swap sides.
    pub fn mirrored(self) -> InfixOp {
        match self {
            InfixOp::Less => InfixOp::Greater,
            InfixOp::Greater => InfixOp::Less,
            InfixOp::LessEquals => InfixOp::GreaterEquals,
            InfixOp::GreaterEquals => InfixOp::LessEquals,
            other => other,
        }
    }

    /// The De Morgan dual of a boolean connective.
    pub fn de_morgan_dual(self) -> Option<InfixOp> {
        Some(match self {
            InfixOp::ConditionalAnd => InfixOp::ConditionalOr,
            InfixOp::ConditionalOr => InfixOp::ConditionalAnd,
            InfixOp::And => InfixOp::Or,
            InfixOp::Or => InfixOp::And,
            _ => return None,
        })
    }
}

/// Expression precedence levels, Java order. Higher binds tighter.
pub mod precedence {
    pub const ASSIGNMENT: u8 = 1;
    pub const CONDITIONAL_OR: u8 = 3;
    pub const CONDITIONAL_AND: u8 = 4;
    pub const OR: u8 = 5;
    pub const XOR: u8 = 6;
    pub const AND: u8 = 7;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const PREFIX: u8 = 13;
    pub const POSTFIX: u8 = 14;
    pub const PRIMARY: u8 = 15;
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Char(char),
    Str(String),
    Null,
}

// ============================================================================
// NodeKind
// ============================================================================

/// A syntax node. Child slots hold `NodeRef`s owned by this node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // === Expressions ===
    Literal(Literal),
    Name {
        name: Symbol,
        binding: Option<BindingId>,
    },
    /// `qualifier.name`, where `qualifier` is a `Name` or another
    /// `QualifiedName` and `name` a simple `Name`.
    QualifiedName {
        qualifier: NodeRef,
        name: NodeRef,
    },
    FieldAccess {
        target: NodeRef,
        name: Symbol,
    },
    Parenthesized {
        expr: NodeRef,
    },
    Prefix {
        op: PrefixOp,
        operand: NodeRef,
    },
    Postfix {
        op: PostfixOp,
        operand: NodeRef,
    },
    /// Left-associative chain `operands[0] op operands[1] op ...`, at least two operands.
    Infix {
        op: InfixOp,
        operands: SmallVec<[NodeRef; 4]>,
    },
    /// `target = value`, or `target op= value` when `op` is set.
    Assignment {
        op: Option<InfixOp>,
        target: NodeRef,
        value: NodeRef,
    },
    MethodCall {
        receiver: Option<NodeRef>,
        name: Symbol,
        args: SmallVec<[NodeRef; 4]>,
    },
    /// `new T(args)`; the instantiated class `T` is the node's `ty`.
    New {
        args: SmallVec<[NodeRef; 4]>,
    },

    // === Statements ===
    ExprStmt {
        expr: NodeRef,
    },
    /// Local variable declaration; the declared type is the node's `ty`.
    VarDecl {
        name: Symbol,
        binding: Option<BindingId>,
        init: Option<NodeRef>,
    },
    Block {
        stmts: Vec<NodeRef>,
    },
    If {
        cond: NodeRef,
        then_branch: NodeRef,
        else_branch: Option<NodeRef>,
    },
    While {
        cond: NodeRef,
        body: NodeRef,
    },
    /// Flat body of `SwitchCase` labels interleaved with statements.
    Switch {
        discriminant: NodeRef,
        body: Vec<NodeRef>,
    },
    /// `case label:`, or `default:` when `label` is `None`.
    SwitchCase {
        label: Option<NodeRef>,
    },
    Break {
        label: Option<Symbol>,
    },
    Continue {
        label: Option<Symbol>,
    },
    Return {
        value: Option<NodeRef>,
    },
    Throw {
        expr: NodeRef,
    },

    // === Root ===
    Unit {
        members: Vec<NodeRef>,
    },
}

impl NodeKind {
    /// Child nodes in source order.
    pub fn children(&self) -> SmallVec<[NodeRef; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Literal(_)
            | NodeKind::Name { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. } => {}
            NodeKind::QualifiedName { qualifier, name } => {
                out.push(*qualifier);
                out.push(*name);
            }
            NodeKind::FieldAccess { target, .. } => out.push(*target),
            NodeKind::Parenthesized { expr } => out.push(*expr),
            NodeKind::Prefix { operand, .. } | NodeKind::Postfix { operand, .. } => {
                out.push(*operand)
            }
            NodeKind::Infix { operands, .. } => out.extend(operands.iter().copied()),
            NodeKind::Assignment { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
            NodeKind::MethodCall { receiver, args, .. } => {
                out.extend(*receiver);
                out.extend(args.iter().copied());
            }
            NodeKind::New { args } => out.extend(args.iter().copied()),
            NodeKind::ExprStmt { expr } | NodeKind::Throw { expr } => out.push(*expr),
            NodeKind::VarDecl { init, .. } => out.extend(*init),
            NodeKind::Block { stmts } => out.extend(stmts.iter().copied()),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.extend(*else_branch);
            }
            NodeKind::While { cond, body } => {
                out.push(*cond);
                out.push(*body);
            }
            NodeKind::Switch { discriminant, body } => {
                out.push(*discriminant);
                out.extend(body.iter().copied());
            }
            NodeKind::SwitchCase { label } => out.extend(*label),
            NodeKind::Return { value } => out.extend(*value),
            NodeKind::Unit { members } => out.extend(members.iter().copied()),
        }
        out
    }

    /// Rebuild this kind with every child passed through `f`.
    pub fn map_children(&self, f: &mut impl FnMut(NodeRef) -> NodeRef) -> NodeKind {
        match self {
            NodeKind::Literal(_)
            | NodeKind::Name { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. } => self.clone(),
            NodeKind::QualifiedName { qualifier, name } => {
                let qualifier = f(*qualifier);
                NodeKind::QualifiedName {
                    qualifier,
                    name: f(*name),
                }
            }
            NodeKind::FieldAccess { target, name } => NodeKind::FieldAccess {
                target: f(*target),
                name: *name,
            },
            NodeKind::Parenthesized { expr } => NodeKind::Parenthesized { expr: f(*expr) },
            NodeKind::Prefix { op, operand } => NodeKind::Prefix {
                op: *op,
                operand: f(*operand),
            },
            NodeKind::Postfix { op, operand } => NodeKind::Postfix {
                op: *op,
                operand: f(*operand),
            },
            NodeKind::Infix { op, operands } => NodeKind::Infix {
                op: *op,
                operands: operands.iter().map(|o| f(*o)).collect(),
            },
            NodeKind::Assignment { op, target, value } => {
                let target = f(*target);
                NodeKind::Assignment {
                    op: *op,
                    target,
                    value: f(*value),
                }
            }
            NodeKind::MethodCall {
                receiver,
                name,
                args,
            } => {
                let receiver = receiver.map(&mut *f);
                NodeKind::MethodCall {
                    receiver,
                    name: *name,
                    args: args.iter().map(|a| f(*a)).collect(),
                }
            }
            NodeKind::New { args } => NodeKind::New {
                args: args.iter().map(|a| f(*a)).collect(),
            },
            NodeKind::ExprStmt { expr } => NodeKind::ExprStmt { expr: f(*expr) },
            NodeKind::Throw { expr } => NodeKind::Throw { expr: f(*expr) },
            NodeKind::VarDecl {
                name,
                binding,
                init,
            } => NodeKind::VarDecl {
                name: *name,
                binding: *binding,
                init: init.map(&mut *f),
            },
            NodeKind::Block { stmts } => NodeKind::Block {
                stmts: stmts.iter().map(|s| f(*s)).collect(),
            },
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = f(*cond);
                let then_branch = f(*then_branch);
                NodeKind::If {
                    cond,
                    then_branch,
                    else_branch: else_branch.map(&mut *f),
                }
            }
            NodeKind::While { cond, body } => {
                let cond = f(*cond);
                NodeKind::While {
                    cond,
                    body: f(*body),
                }
            }
            NodeKind::Switch { discriminant, body } => {
                let discriminant = f(*discriminant);
                NodeKind::Switch {
                    discriminant,
                    body: body.iter().map(|s| f(*s)).collect(),
                }
            }
            NodeKind::SwitchCase { label } => NodeKind::SwitchCase {
                label: label.map(&mut *f),
            },
            NodeKind::Return { value } => NodeKind::Return {
                value: value.map(&mut *f),
            },
            NodeKind::Unit { members } => NodeKind::Unit {
                members: members.iter().map(|m| f(*m)).collect(),
            },
        }
    }

    /// Point the slot holding `old` at `new`. Returns `false` if `old` is not a child.
    pub(crate) fn replace_child(&mut self, old: NodeRef, new: NodeRef) -> bool {
        let mut found = false;
        let mut swap = |slot: NodeRef| {
            if slot == old && !found {
                found = true;
                new
            } else {
                slot
            }
        };
        *self = self.map_children(&mut swap);
        found
    }

    /// Drop `child` from a statement list or an optional slot.
    ///
    /// Returns `None` if `child` is not a child, `Some(false)` if it sits in
    /// a required slot that cannot be emptied.
    pub(crate) fn remove_child(&mut self, child: NodeRef) -> Option<bool> {
        match self {
            NodeKind::Block { stmts: list }
            | NodeKind::Switch { body: list, .. }
            | NodeKind::Unit { members: list } => {
                if let Some(pos) = list.iter().position(|c| *c == child) {
                    list.remove(pos);
                    return Some(true);
                }
            }
            NodeKind::If { else_branch, .. } if *else_branch == Some(child) => {
                *else_branch = None;
                return Some(true);
            }
            NodeKind::VarDecl { init, .. } if *init == Some(child) => {
                *init = None;
                return Some(true);
            }
            NodeKind::Return { value } if *value == Some(child) => {
                *value = None;
                return Some(true);
            }
            _ => {}
        }
        if self.children().contains(&child) {
            Some(false)
        } else {
            None
        }
    }

    /// Insert `new` next to `anchor` in a statement list.
    pub(crate) fn insert_child(&mut self, anchor: NodeRef, new: NodeRef, after: bool) -> bool {
        match self {
            NodeKind::Block { stmts: list }
            | NodeKind::Switch { body: list, .. }
            | NodeKind::Unit { members: list } => {
                let Some(pos) = list.iter().position(|c| *c == anchor) else {
                    return false;
                };
                list.insert(if after { pos + 1 } else { pos }, new);
                true
            }
            _ => false,
        }
    }

    /// Precedence of an expression kind, `None` for statements.
    pub fn precedence(&self) -> Option<u8> {
        Some(match self {
            NodeKind::Literal(_)
            | NodeKind::Name { .. }
            | NodeKind::QualifiedName { .. }
            | NodeKind::FieldAccess { .. }
            | NodeKind::Parenthesized { .. }
            | NodeKind::MethodCall { .. }
            | NodeKind::New { .. } => precedence::PRIMARY,
            NodeKind::Postfix { .. } => precedence::POSTFIX,
            NodeKind::Prefix { .. } => precedence::PREFIX,
            NodeKind::Infix { op, .. } => op.precedence(),
            NodeKind::Assignment { .. } => precedence::ASSIGNMENT,
            _ => return None,
        })
    }

    pub fn is_expression(&self) -> bool {
        self.precedence().is_some()
    }

    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Block { .. })
    }
}
