//! TreeContext: arena-backed mutable syntax tree.
//!
//! All nodes of one compilation unit live in a `PrimaryMap` owned by
//! `TreeContext`. Every node records its parent, so "owned by exactly one
//! parent slot" is checkable at any time (see `validation`).
//!
//! Subtrees are reused in two ways:
//!
//! - **copy** (`deep_copy`): allocates fresh slots; the original is untouched.
//! - **move** (`take`): returns a consume-once [`Moved`] handle. The subtree
//!   stays where it is until the edit that uses it commits; then it is
//!   re-parented and the rest of its old surroundings is erased.

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::node::NodeKind;
use crate::refs::{NodeRef, TypeRef};
use crate::types::{TypeDescriptor, TypeInterner};

// ============================================================================
// Entity data
// ============================================================================

/// Data for a single node in the arena.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Resolved type of an expression, or the declared type of a `VarDecl`.
    pub ty: Option<TypeRef>,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) erased: bool,
}

/// A subtree scheduled to move to a new position.
///
/// Neither `Copy` nor `Clone`: handing it to a builder consumes it, so a
/// moved subtree can be placed at most once.
#[must_use = "a moved subtree must be placed somewhere"]
#[derive(Debug)]
pub struct Moved(NodeRef);

impl Moved {
    /// The node being moved.
    pub fn node(&self) -> NodeRef {
        self.0
    }
}

/// A child handed to a node constructor.
#[derive(Debug)]
pub enum Child {
    /// A detached node (new, or a copy).
    Fresh(NodeRef),
    /// A live subtree relocated by the pending edit.
    Moved(Moved),
}

impl From<NodeRef> for Child {
    fn from(node: NodeRef) -> Self {
        Child::Fresh(node)
    }
}

impl From<Moved> for Child {
    fn from(moved: Moved) -> Self {
        Child::Moved(moved)
    }
}

impl Child {
    pub fn node(&self) -> NodeRef {
        match self {
            Child::Fresh(n) => *n,
            Child::Moved(m) => m.0,
        }
    }
}

// ============================================================================
// TreeContext
// ============================================================================

/// Arena-based syntax tree of one compilation unit.
pub struct TreeContext {
    nodes: PrimaryMap<NodeRef, NodeData>,
    pub types: TypeInterner,
    /// Moved subtrees of the edit being built: node → claiming parent.
    ///
    /// `None` means the move has been requested but no constructor has
    /// claimed it yet (it may still become an edit's direct replacement).
    pending_moves: HashMap<NodeRef, Option<NodeRef>>,
}

impl TreeContext {
    pub fn new() -> Self {
        Self {
            nodes: PrimaryMap::new(),
            types: TypeInterner::new(),
            pending_moves: HashMap::new(),
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a node whose children are given as plain refs.
    ///
    /// Children must be detached. Used by the front end and by builders once
    /// `Child` values have been resolved.
    ///
    /// # Panics
    ///
    /// Panics if a child already has a parent and is not a pending move.
    pub fn create(&mut self, kind: NodeKind, ty: Option<TypeRef>) -> NodeRef {
        let children = kind.children();
        let node = self.nodes.push(NodeData {
            kind,
            ty,
            parent: None,
            erased: false,
        });
        for child in children {
            self.adopt(node, child);
        }
        node
    }

    fn adopt(&mut self, parent: NodeRef, child: NodeRef) {
        assert!(
            !self.nodes[child].erased,
            "create: child {child} has been erased"
        );
        match self.nodes[child].parent {
            None => {
                self.pending_moves.remove(&child);
                self.nodes[child].parent = Some(parent);
            }
            Some(owner) => match self.pending_moves.get_mut(&child) {
                Some(claim @ None) => *claim = Some(parent),
                Some(Some(other)) => {
                    panic!("create: moved node {child} was already placed under {other}")
                }
                None => panic!(
                    "create: node {child} is owned by {owner}; copy it or take it before reuse"
                ),
            },
        }
    }

    /// Intern a type descriptor.
    pub fn intern_type(&mut self, descriptor: TypeDescriptor) -> TypeRef {
        self.types.intern(descriptor)
    }

    /// Attach a resolved type to a node.
    pub fn set_type(&mut self, node: NodeRef, ty: TypeRef) {
        self.nodes[node].ty = Some(ty);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn node(&self, node: NodeRef) -> &NodeData {
        &self.nodes[node]
    }

    pub fn kind(&self, node: NodeRef) -> &NodeKind {
        &self.nodes[node].kind
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node].parent
    }

    pub fn is_erased(&self, node: NodeRef) -> bool {
        self.nodes[node].erased
    }

    pub fn children(&self, node: NodeRef) -> SmallVec<[NodeRef; 4]> {
        self.nodes[node].kind.children()
    }

    /// Resolved type descriptor of a node, if the front end supplied one.
    pub fn type_of(&self, node: NodeRef) -> Option<&TypeDescriptor> {
        self.nodes[node].ty.map(|ty| self.types.get(ty))
    }

    /// Number of arena slots ever allocated (live or erased).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Skip any number of parentheses around an expression.
    pub fn unparenthesized(&self, mut node: NodeRef) -> NodeRef {
        while let NodeKind::Parenthesized { expr } = self.kind(node) {
            node = *expr;
        }
        node
    }

    /// Statements of a branch: a block's statements, or the statement itself.
    pub fn statements_of(&self, stmt: Option<NodeRef>) -> Vec<NodeRef> {
        match stmt {
            None => Vec::new(),
            Some(s) => match self.kind(s) {
                NodeKind::Block { stmts } => stmts.clone(),
                _ => vec![s],
            },
        }
    }

    /// `true` if `node` sits in a statement list or an optional slot, so
    /// removing it leaves a well-formed parent.
    pub fn can_remove(&self, node: NodeRef) -> bool {
        match self.parent(node) {
            Some(parent) => self.kind(parent).clone().remove_child(node) == Some(true),
            None => false,
        }
    }

    // ========================================================================
    // Copy / move
    // ========================================================================

    /// Deep-duplicate a subtree into fresh, detached slots.
    pub fn deep_copy(&mut self, node: NodeRef) -> NodeRef {
        let data = self.nodes[node].clone();
        let kind = data.kind.map_children(&mut |child| self.deep_copy(child));
        self.create(kind, data.ty)
    }

    /// Schedule `node` to move to wherever the returned handle is placed.
    ///
    /// Nothing in the live tree changes until the edit commits.
    pub fn take(&mut self, node: NodeRef) -> Moved {
        assert!(
            !self.pending_moves.contains_key(&node),
            "take: node {node} is already being moved"
        );
        self.pending_moves.insert(node, None);
        Moved(node)
    }

    /// Wrap a builder result as a child, recovering its move handle if it is
    /// a pending move that nothing has claimed yet.
    pub fn as_child(&self, node: NodeRef) -> Child {
        match self.pending_moves.get(&node) {
            Some(None) => Child::Moved(Moved(node)),
            _ => Child::Fresh(node),
        }
    }

    /// Forget moves requested by a rule that ended up not editing.
    pub fn discard_pending_moves(&mut self) {
        self.pending_moves.clear();
    }

    pub fn has_pending_moves(&self) -> bool {
        !self.pending_moves.is_empty()
    }

    /// Re-parent every claimed pending move. Unclaimed moves stay pending
    /// for the edit that uses them as a direct replacement.
    pub(crate) fn settle_claimed_moves(&mut self) {
        let claimed: Vec<(NodeRef, NodeRef)> = self
            .pending_moves
            .iter()
            .filter_map(|(node, claim)| claim.map(|parent| (*node, parent)))
            .collect();
        for (node, parent) in claimed {
            self.pending_moves.remove(&node);
            self.nodes[node].parent = Some(parent);
        }
    }

    /// Give up on a child without placing it.
    ///
    /// A moved subtree simply stays where it is; a fresh one is erased.
    pub fn release(&mut self, child: Child) {
        match child {
            Child::Moved(m) => {
                self.pending_moves.remove(&m.0);
            }
            Child::Fresh(node) => self.erase_subtree(node),
        }
    }

    /// Break `whole` apart, handing out `parts` (descendants of `whole`) as
    /// children for new nodes. The rest of `whole` is never placed.
    pub fn dissolve(&mut self, whole: Child, parts: &[NodeRef]) -> Vec<Child> {
        match whole {
            Child::Moved(m) => {
                self.pending_moves.remove(&m.0);
                parts
                    .iter()
                    .map(|&part| Child::Moved(self.take(part)))
                    .collect()
            }
            Child::Fresh(node) => {
                for &part in parts {
                    self.nodes[part].parent = None;
                }
                self.erase_subtree(node);
                parts.iter().map(|&part| Child::Fresh(part)).collect()
            }
        }
    }

    // ========================================================================
    // Mutation (used by the applicator when an edit commits)
    // ========================================================================

    /// Place `child` into a slot of `parent`, settling it if it is a pending move.
    fn place(&mut self, parent: NodeRef, child: NodeRef) {
        if self.pending_moves.remove(&child).is_some() {
            self.nodes[child].parent = Some(parent);
        } else {
            self.adopt(parent, child);
        }
    }

    /// Replace `target` in its parent slot with `replacement`.
    ///
    /// The old subtree is erased, except for parts that moved elsewhere.
    ///
    /// # Panics
    ///
    /// Panics if `target` is the root or is not found in its parent.
    pub fn replace(&mut self, target: NodeRef, replacement: NodeRef) {
        let parent = self.nodes[target]
            .parent
            .unwrap_or_else(|| panic!("replace: {target} has no parent"));
        let found = self.nodes[parent].kind.replace_child(target, replacement);
        assert!(found, "replace: {target} not found in parent {parent}");
        self.place(parent, replacement);
        self.erase_owned(target, parent);
    }

    /// Remove `target` from its parent's statement list or optional slot.
    ///
    /// # Panics
    ///
    /// Panics if `target` occupies a required slot.
    pub fn remove(&mut self, target: NodeRef) {
        let parent = self.nodes[target]
            .parent
            .unwrap_or_else(|| panic!("remove: {target} has no parent"));
        match self.nodes[parent].kind.remove_child(target) {
            Some(true) => {}
            Some(false) => panic!("remove: {target} occupies a required slot of {parent}"),
            None => panic!("remove: {target} not found in parent {parent}"),
        }
        self.erase_owned(target, parent);
    }

    /// Insert `new` before or after `anchor` in its parent's statement list.
    ///
    /// # Panics
    ///
    /// Panics if `anchor`'s parent is not a statement list.
    pub fn insert_beside(&mut self, anchor: NodeRef, new: NodeRef, after: bool) {
        let parent = self.nodes[anchor]
            .parent
            .unwrap_or_else(|| panic!("insert: {anchor} has no parent"));
        let ok = self.nodes[parent].kind.insert_child(anchor, new, after);
        assert!(ok, "insert: parent {parent} of {anchor} is not a statement list");
        self.place(parent, new);
    }

    /// Erase `node` and its subtree if `node` is still owned by `former_parent`.
    ///
    /// Children that were moved out (their parent link points elsewhere)
    /// survive.
    fn erase_owned(&mut self, node: NodeRef, former_parent: NodeRef) {
        if self.nodes[node].parent != Some(former_parent) {
            return;
        }
        self.erase_subtree(node);
    }

    fn erase_subtree(&mut self, node: NodeRef) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let children = self.nodes[n].kind.children();
            let data = &mut self.nodes[n];
            data.erased = true;
            data.parent = None;
            for child in children {
                if self.nodes[child].parent == Some(n) {
                    stack.push(child);
                }
            }
        }
    }
}

impl Default for TreeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{InfixOp, Literal};
    use crate::symbol::Symbol;
    use smallvec::smallvec;

    fn name(ctx: &mut TreeContext, text: &'static str) -> NodeRef {
        ctx.create(
            NodeKind::Name {
                name: Symbol::new(text),
                binding: None,
            },
            None,
        )
    }

    fn eq(ctx: &mut TreeContext, a: NodeRef, b: NodeRef) -> NodeRef {
        ctx.create(
            NodeKind::Infix {
                op: InfixOp::Equals,
                operands: smallvec![a, b],
            },
            None,
        )
    }

    #[test]
    fn create_links_parents() {
        let mut ctx = TreeContext::new();
        let a = name(&mut ctx, "a");
        let b = name(&mut ctx, "b");
        let e = eq(&mut ctx, a, b);
        assert_eq!(ctx.parent(a), Some(e));
        assert_eq!(ctx.parent(b), Some(e));
        assert_eq!(ctx.parent(e), None);
    }

    #[test]
    #[should_panic(expected = "copy it or take it before reuse")]
    fn create_rejects_owned_child() {
        let mut ctx = TreeContext::new();
        let a = name(&mut ctx, "a");
        let b = name(&mut ctx, "b");
        eq(&mut ctx, a, b);
        eq(&mut ctx, a, b);
    }

    #[test]
    fn deep_copy_leaves_original() {
        let mut ctx = TreeContext::new();
        let a = name(&mut ctx, "a");
        let one = ctx.create(NodeKind::Literal(Literal::Int(1)), None);
        let e = eq(&mut ctx, a, one);
        let copy = ctx.deep_copy(e);
        assert_ne!(copy, e);
        assert_eq!(ctx.parent(copy), None);
        assert_eq!(ctx.kind(a), &NodeKind::Name { name: Symbol::new("a"), binding: None });
        let copied_children = ctx.children(copy);
        assert_ne!(copied_children[0], a);
        assert_eq!(ctx.parent(copied_children[0]), Some(copy));
        assert_eq!(ctx.parent(a), Some(e));
    }

    #[test]
    fn replace_with_moved_grandchild_erases_the_rest() {
        let mut ctx = TreeContext::new();
        let x = name(&mut ctx, "x");
        let paren = ctx.create(NodeKind::Parenthesized { expr: x }, None);
        let stmt = ctx.create(NodeKind::ExprStmt { expr: paren }, None);
        let _unit = ctx.create(NodeKind::Unit { members: vec![stmt] }, None);

        let moved = ctx.take(x);
        let node = moved.node();
        ctx.replace(paren, node);

        assert_eq!(ctx.parent(x), Some(stmt));
        assert!(ctx.is_erased(paren));
        assert!(!ctx.is_erased(x));
        assert!(!ctx.has_pending_moves());
    }
}
