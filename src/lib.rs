//! recast: a fixpoint rewrite engine for typed Java-like syntax trees.
//!
//! The tree and rewrite machinery live in [`recast_ir`], the rules in
//! [`recast_rules`]. This crate ties them together: configuration, the
//! user-facing rule catalog, and an [`Engine`] that rewrites compilation
//! units in parallel.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;

pub use catalog::{Catalog, RuleDescriptor};
pub use config::EngineConfig;
pub use engine::{CompilationUnit, Engine, UnitReport};
pub use errors::{Error, ErrorKind, Result};

pub use recast_ir;
pub use recast_rules;
