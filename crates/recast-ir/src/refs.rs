//! Entity references into the tree arena.
//!
//! Each ref type is a thin `u32` wrapper providing type-safe indexing
//! into `PrimaryMap` storage in `TreeContext`.

use cranelift_entity::entity_impl;

/// Reference to a syntax node in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);
entity_impl!(NodeRef, "n");

/// Reference to an interned type descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(u32);
entity_impl!(TypeRef, "ty");

/// Identity of a declared entity (local, parameter, field, enum constant).
///
/// Supplied by the front end's name resolution. Two names denote the same
/// entity exactly when their bindings are equal; a name without a binding
/// is unresolved or ambiguous and never matches anything.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u32);
entity_impl!(BindingId, "b");
