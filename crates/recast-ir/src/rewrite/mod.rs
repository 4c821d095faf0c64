//! Rewrite infrastructure.
//!
//! Rules record edits on a [`Rewriter`]; the [`PatternApplicator`] commits
//! them to the arena in place and loops until nothing changes.

pub mod applicator;
pub mod builder;
pub mod pattern;
pub mod rewriter;

pub use applicator::{
    AppliedRewrite, ApplyResult, CancellationToken, ConvergenceStatus, PatternApplicator,
};
pub use pattern::RewriteRule;
pub use rewriter::{Edit, EditKind, Provenance, Rewriter};

/// Java minor version assumed when nothing else is configured.
pub const DEFAULT_LANGUAGE_LEVEL: u32 = 8;

/// Run-wide settings visible to rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Minimum supported language level of the code being rewritten
    /// (`6` for Java 6, `8` for Java 8, ...).
    pub language_level: u32,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            language_level: DEFAULT_LANGUAGE_LEVEL,
        }
    }
}
