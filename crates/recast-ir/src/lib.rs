//! Arena-backed syntax trees and the rewrite machinery that runs over them.
//!
//! A compilation unit lives in one [`TreeContext`]. Rules inspect it through
//! the query API, build replacement subtrees with the constructors in
//! [`rewrite::builder`], and record edits on a [`Rewriter`]. The
//! [`PatternApplicator`] commits those edits and repeats until a fixpoint.

pub mod analysis;
pub mod context;
#[cfg(any(test, feature = "test-support"))]
pub mod fixture;
pub mod matcher;
pub mod node;
pub mod printer;
pub mod refs;
pub mod rewrite;
pub mod symbol;
pub mod types;
pub mod validation;
pub mod walk;

pub use context::{Child, Moved, NodeData, TreeContext};
pub use node::{InfixOp, Literal, NodeKind, PostfixOp, PrefixOp, precedence};
pub use refs::{BindingId, NodeRef, TypeRef};
pub use rewrite::{
    AppliedRewrite, ApplyResult, CancellationToken, ConvergenceStatus, Edit, EditKind,
    PatternApplicator, Provenance, RewriteOptions, RewriteRule, Rewriter,
};
pub use symbol::Symbol;
pub use types::{TypeDescriptor, TypeInterner, TypeKind};
pub use walk::WalkAction;
