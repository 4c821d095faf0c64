//! Ownership validation for syntax trees.
//!
//! Checks the single-owner invariant the rewrite machinery relies on:
//! every node reachable from the root sits in exactly one parent slot, its
//! parent link points back at that slot's owner, and nothing reachable has
//! been erased. Run after commits in tests and debug tooling.

use std::collections::HashSet;
use std::fmt;

use crate::context::TreeContext;
use crate::refs::NodeRef;

// ============================================================================
// Error types
// ============================================================================

/// Describes one ownership violation.
#[derive(Clone, PartialEq, Eq)]
pub enum TreeError {
    /// An erased node is still reachable.
    Erased { node: NodeRef, parent: NodeRef },
    /// A child's parent link does not point at the node holding it.
    ParentMismatch {
        node: NodeRef,
        holder: NodeRef,
        recorded: Option<NodeRef>,
    },
    /// A node is reachable through more than one slot (shared or cyclic).
    Shared { node: NodeRef },
    /// A move was requested but never committed or discarded.
    PendingMoves,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Erased { node, parent } => {
                write!(f, "erased node {node} is still a child of {parent}")
            }
            TreeError::ParentMismatch {
                node,
                holder,
                recorded,
            } => match recorded {
                Some(recorded) => write!(
                    f,
                    "node {node} is held by {holder} but records parent {recorded}"
                ),
                None => write!(f, "node {node} is held by {holder} but records no parent"),
            },
            TreeError::Shared { node } => write!(f, "node {node} is reachable more than once"),
            TreeError::PendingMoves => f.write_str("moves are still pending"),
        }
    }
}

impl fmt::Debug for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Result of validation.
pub struct ValidationResult {
    pub errors: Vec<TreeError>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "validation passed");
        }
        writeln!(f, "{} ownership error(s) found:", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "  - {}", err)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate ownership of every node reachable from `root`.
pub fn validate_tree(ctx: &TreeContext, root: NodeRef) -> ValidationResult {
    let mut errors = Vec::new();
    if ctx.has_pending_moves() {
        errors.push(TreeError::PendingMoves);
    }

    let mut seen = HashSet::new();
    seen.insert(root);
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for child in ctx.children(node) {
            if !seen.insert(child) {
                errors.push(TreeError::Shared { node: child });
                continue;
            }
            if ctx.is_erased(child) {
                errors.push(TreeError::Erased {
                    node: child,
                    parent: node,
                });
            }
            let recorded = ctx.parent(child);
            if recorded != Some(node) {
                errors.push(TreeError::ParentMismatch {
                    node: child,
                    holder: node,
                    recorded,
                });
            }
            stack.push(child);
        }
    }

    ValidationResult { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::TreeFixture;

    #[test]
    fn built_tree_is_valid() {
        let mut fx = TreeFixture::new();
        let stmt = fx.call_stmt("run", vec![]);
        let root = fx.ctx.unit(vec![stmt.into()]);
        let result = validate_tree(&fx.ctx, root);
        assert!(result.is_ok(), "{result}");
    }

    #[test]
    fn pending_move_is_reported() {
        let mut fx = TreeFixture::new();
        let stmt = fx.call_stmt("run", vec![]);
        let root = fx.ctx.unit(vec![stmt.into()]);
        let _moved = fx.ctx.take(stmt);
        let result = validate_tree(&fx.ctx, root);
        assert_eq!(result.errors, vec![TreeError::PendingMoves]);
        fx.ctx.discard_pending_moves();
        assert!(validate_tree(&fx.ctx, root).is_ok());
    }
}
