//! Rewriter: accumulates the edits a rule wants to make.
//!
//! Rules build replacement subtrees with the `TreeContext` constructors and
//! record what to do with them here. Nothing in the live tree changes until
//! the `PatternApplicator` commits the edits after the rule returns.

use std::fmt;

use crate::context::{Child, TreeContext};
use crate::refs::NodeRef;

use super::RewriteOptions;

/// How a subtree placed by an edit came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    /// Newly built or deep-copied; the original tree is untouched.
    Fresh,
    /// Relocated from the live tree; its old slot is invalidated.
    Moved,
}

impl Provenance {
    fn of(child: &Child) -> Self {
        match child {
            Child::Fresh(_) => Provenance::Fresh,
            Child::Moved(_) => Provenance::Moved,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKind {
    Replace(NodeRef, Provenance),
    Remove,
    InsertBefore(NodeRef, Provenance),
    InsertAfter(NodeRef, Provenance),
}

/// One recorded change to the live tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub target: NodeRef,
    pub kind: EditKind,
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EditKind::Replace(with, p) => write!(f, "replace {} with {with} ({p:?})", self.target),
            EditKind::Remove => write!(f, "remove {}", self.target),
            EditKind::InsertBefore(new, p) => {
                write!(f, "insert {new} ({p:?}) before {}", self.target)
            }
            EditKind::InsertAfter(new, p) => {
                write!(f, "insert {new} ({p:?}) after {}", self.target)
            }
        }
    }
}

/// Edit recorder handed to each rule invocation.
pub struct Rewriter<'a> {
    options: &'a RewriteOptions,
    edits: Vec<Edit>,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(options: &'a RewriteOptions) -> Self {
        Self {
            options,
            edits: Vec::new(),
        }
    }

    /// Options of the current run.
    pub fn options(&self) -> &RewriteOptions {
        self.options
    }

    // === Mutations ===

    /// Replace `target` with `replacement`.
    pub fn replace(&mut self, target: NodeRef, replacement: impl Into<Child>) {
        let replacement = replacement.into();
        let provenance = Provenance::of(&replacement);
        self.edits.push(Edit {
            target,
            kind: EditKind::Replace(replacement.node(), provenance),
        });
    }

    /// Remove `target` from its statement list or optional slot.
    pub fn remove(&mut self, target: NodeRef) {
        self.edits.push(Edit {
            target,
            kind: EditKind::Remove,
        });
    }

    pub fn insert_before(&mut self, anchor: NodeRef, new: impl Into<Child>) {
        let new = new.into();
        let provenance = Provenance::of(&new);
        self.edits.push(Edit {
            target: anchor,
            kind: EditKind::InsertBefore(new.node(), provenance),
        });
    }

    pub fn insert_after(&mut self, anchor: NodeRef, new: impl Into<Child>) {
        let new = new.into();
        let provenance = Provenance::of(&new);
        self.edits.push(Edit {
            target: anchor,
            kind: EditKind::InsertAfter(new.node(), provenance),
        });
    }

    // === Query ===

    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub(crate) fn take_edits(self) -> Vec<Edit> {
        self.edits
    }
}

/// Apply recorded edits to the live tree, in recording order.
///
/// Moves claimed by new parents settle first, so erasing an edit's old
/// target never takes a relocated subtree with it.
pub(crate) fn apply_edits(ctx: &mut TreeContext, edits: &[Edit]) {
    ctx.settle_claimed_moves();
    for edit in edits {
        match edit.kind {
            EditKind::Replace(with, _) => ctx.replace(edit.target, with),
            EditKind::Remove => ctx.remove(edit.target),
            EditKind::InsertBefore(new, _) => ctx.insert_beside(edit.target, new, false),
            EditKind::InsertAfter(new, _) => ctx.insert_beside(edit.target, new, true),
        }
    }
    debug_assert!(
        !ctx.has_pending_moves(),
        "apply_edits: a moved subtree was never placed"
    );
    ctx.discard_pending_moves();
}
