//! Java-like debug text for syntax trees.
//!
//! Used by tests and log output only; the production pretty-printer lives
//! outside this crate.
//!
//! ```text
//! if (k == 1) {
//!     a();
//! } else {
//!     b();
//! }
//! ```

use std::fmt::{self, Write};

use crate::context::TreeContext;
use crate::node::{Literal, NodeKind};
use crate::refs::NodeRef;

const INDENT: &str = "    ";

// ============================================================================
// Public API
// ============================================================================

/// Print a node (expression or statement) as text, without a trailing newline.
pub fn print_node(ctx: &TreeContext, node: NodeRef) -> String {
    let mut out = String::new();
    let result = if ctx.kind(node).is_expression() {
        write_expr(ctx, &mut out, node)
    } else {
        write_stmt(ctx, &mut out, node, 0)
    };
    result.expect("fmt::Write to String never fails");
    out
}

// ============================================================================
// Expressions
// ============================================================================

fn write_literal(f: &mut impl Write, lit: &Literal) -> fmt::Result {
    match lit {
        Literal::Bool(b) => write!(f, "{b}"),
        Literal::Int(i) => write!(f, "{i}"),
        Literal::Char(c) => write!(f, "'{}'", c.escape_default()),
        Literal::Str(s) => {
            f.write_char('"')?;
            for c in s.chars() {
                match c {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    c => f.write_char(c)?,
                }
            }
            f.write_char('"')
        }
        Literal::Null => f.write_str("null"),
    }
}

fn write_expr(ctx: &TreeContext, f: &mut impl Write, node: NodeRef) -> fmt::Result {
    match ctx.kind(node) {
        NodeKind::Literal(lit) => write_literal(f, lit),
        NodeKind::Name { name, .. } => write!(f, "{name}"),
        NodeKind::QualifiedName { qualifier, name } => {
            write_expr(ctx, f, *qualifier)?;
            f.write_char('.')?;
            write_expr(ctx, f, *name)
        }
        NodeKind::FieldAccess { target, name } => {
            write_expr(ctx, f, *target)?;
            write!(f, ".{name}")
        }
        NodeKind::Parenthesized { expr } => {
            f.write_char('(')?;
            write_expr(ctx, f, *expr)?;
            f.write_char(')')
        }
        NodeKind::Prefix { op, operand } => {
            f.write_str(op.as_str())?;
            write_expr(ctx, f, *operand)
        }
        NodeKind::Postfix { op, operand } => {
            write_expr(ctx, f, *operand)?;
            f.write_str(op.as_str())
        }
        NodeKind::Infix { op, operands } => {
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op.as_str())?;
                }
                write_expr(ctx, f, *operand)?;
            }
            Ok(())
        }
        NodeKind::Assignment { op, target, value } => {
            write_expr(ctx, f, *target)?;
            match op {
                Some(op) => write!(f, " {}= ", op.as_str())?,
                None => f.write_str(" = ")?,
            }
            write_expr(ctx, f, *value)
        }
        NodeKind::MethodCall {
            receiver,
            name,
            args,
        } => {
            if let Some(receiver) = receiver {
                write_expr(ctx, f, *receiver)?;
                f.write_char('.')?;
            }
            write!(f, "{name}")?;
            write_args(ctx, f, args)
        }
        NodeKind::New { args } => {
            match ctx.type_of(node) {
                Some(ty) => write!(f, "new {}", ty.simple_name())?,
                None => f.write_str("new <unknown>")?,
            }
            write_args(ctx, f, args)
        }
        other => write!(f, "<statement {other:?}>"),
    }
}

fn write_args(ctx: &TreeContext, f: &mut impl Write, args: &[NodeRef]) -> fmt::Result {
    f.write_char('(')?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_expr(ctx, f, *arg)?;
    }
    f.write_char(')')
}

// ============================================================================
// Statements
// ============================================================================

fn write_indent(f: &mut impl Write, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        f.write_str(INDENT)?;
    }
    Ok(())
}

/// Write a statement whose first line is already indented.
fn write_stmt(ctx: &TreeContext, f: &mut impl Write, node: NodeRef, indent: usize) -> fmt::Result {
    match ctx.kind(node) {
        NodeKind::ExprStmt { expr } => {
            write_expr(ctx, f, *expr)?;
            f.write_char(';')
        }
        NodeKind::VarDecl { name, init, .. } => {
            match ctx.type_of(node) {
                Some(ty) => write!(f, "{} {name}", ty.simple_name())?,
                None => write!(f, "var {name}")?,
            }
            if let Some(init) = init {
                f.write_str(" = ")?;
                write_expr(ctx, f, *init)?;
            }
            f.write_char(';')
        }
        NodeKind::Block { stmts } => {
            if stmts.is_empty() {
                return f.write_str("{}");
            }
            f.write_str("{\n")?;
            for stmt in stmts {
                write_indent(f, indent + 1)?;
                write_stmt(ctx, f, *stmt, indent + 1)?;
                f.write_char('\n')?;
            }
            write_indent(f, indent)?;
            f.write_char('}')
        }
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            f.write_str("if (")?;
            write_expr(ctx, f, *cond)?;
            f.write_char(')')?;
            write_branch(ctx, f, *then_branch, indent)?;
            if let Some(else_branch) = else_branch {
                if ctx.kind(*then_branch).is_block() {
                    f.write_char(' ')?;
                } else {
                    f.write_char('\n')?;
                    write_indent(f, indent)?;
                }
                f.write_str("else")?;
                if matches!(ctx.kind(*else_branch), NodeKind::If { .. }) {
                    f.write_char(' ')?;
                    write_stmt(ctx, f, *else_branch, indent)?;
                } else {
                    write_branch(ctx, f, *else_branch, indent)?;
                }
            }
            Ok(())
        }
        NodeKind::While { cond, body } => {
            f.write_str("while (")?;
            write_expr(ctx, f, *cond)?;
            f.write_char(')')?;
            write_branch(ctx, f, *body, indent)
        }
        NodeKind::Switch { discriminant, body } => {
            f.write_str("switch (")?;
            write_expr(ctx, f, *discriminant)?;
            f.write_str(") {\n")?;
            for item in body {
                if let NodeKind::SwitchCase { .. } = ctx.kind(*item) {
                    write_indent(f, indent + 1)?;
                    write_stmt(ctx, f, *item, indent + 1)?;
                } else {
                    write_indent(f, indent + 2)?;
                    write_stmt(ctx, f, *item, indent + 2)?;
                }
                f.write_char('\n')?;
            }
            write_indent(f, indent)?;
            f.write_char('}')
        }
        NodeKind::SwitchCase { label } => match label {
            Some(label) => {
                f.write_str("case ")?;
                write_expr(ctx, f, *label)?;
                f.write_char(':')
            }
            None => f.write_str("default:"),
        },
        NodeKind::Break { label } => match label {
            Some(label) => write!(f, "break {label};"),
            None => f.write_str("break;"),
        },
        NodeKind::Continue { label } => match label {
            Some(label) => write!(f, "continue {label};"),
            None => f.write_str("continue;"),
        },
        NodeKind::Return { value } => match value {
            Some(value) => {
                f.write_str("return ")?;
                write_expr(ctx, f, *value)?;
                f.write_char(';')
            }
            None => f.write_str("return;"),
        },
        NodeKind::Throw { expr } => {
            f.write_str("throw ")?;
            write_expr(ctx, f, *expr)?;
            f.write_char(';')
        }
        NodeKind::Unit { members } => {
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    f.write_char('\n')?;
                }
                write_indent(f, indent)?;
                write_stmt(ctx, f, *member, indent)?;
            }
            Ok(())
        }
        _ => write_expr(ctx, f, node),
    }
}

/// Body of `if`/`else`/`while`: a block stays on the same line, anything
/// else goes on its own indented line.
fn write_branch(
    ctx: &TreeContext,
    f: &mut impl Write,
    node: NodeRef,
    indent: usize,
) -> fmt::Result {
    if ctx.kind(node).is_block() {
        f.write_char(' ')?;
        write_stmt(ctx, f, node, indent)
    } else {
        f.write_char('\n')?;
        write_indent(f, indent + 1)?;
        write_stmt(ctx, f, node, indent + 1)
    }
}
