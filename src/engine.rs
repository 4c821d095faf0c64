//! The orchestrator: runs the enabled rules over compilation units.
//!
//! Units are independent, so [`Engine::run_units`] rewrites them in
//! parallel. Within a unit everything is single-threaded and in place.

use rayon::prelude::*;
use recast_ir::{
    AppliedRewrite, ApplyResult, CancellationToken, ConvergenceStatus, NodeRef,
    PatternApplicator, TreeContext,
};

use crate::config::EngineConfig;
use crate::errors::{Error, Result};

/// One compilation unit: its tree and the root node to rewrite from.
pub struct CompilationUnit {
    pub ctx: TreeContext,
    pub root: NodeRef,
}

impl CompilationUnit {
    pub fn new(ctx: TreeContext, root: NodeRef) -> Self {
        Self { ctx, root }
    }
}

/// Outcome of rewriting one unit.
#[derive(Clone, Debug)]
pub struct UnitReport {
    pub status: ConvergenceStatus,
    pub iterations: usize,
    pub total_changes: usize,
    /// Committed rewrites in commit order.
    pub log: Vec<AppliedRewrite>,
}

impl UnitReport {
    pub fn converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}

impl From<ApplyResult> for UnitReport {
    fn from(result: ApplyResult) -> Self {
        Self {
            status: result.status,
            iterations: result.iterations,
            total_changes: result.total_changes,
            log: result.log,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    rules: Vec<&'static str>,
    applicator: PatternApplicator,
    cancellation: CancellationToken,
}

impl Engine {
    /// Build an engine, resolving the enabled rule names against the catalog.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let unknown = config
            .enabled_rules
            .iter()
            .flatten()
            .find(|name| recast_rules::rule_by_name(name).is_none());
        if let Some(unknown) = unknown {
            return Err(Error::unknown_rule(unknown.clone()));
        }

        let rules: Vec<&'static str> = recast_rules::RULE_NAMES
            .iter()
            .copied()
            .filter(|name| match &config.enabled_rules {
                Some(enabled) => enabled.iter().any(|e| e == name),
                None => true,
            })
            .collect();

        let cancellation = CancellationToken::new();
        let mut applicator = PatternApplicator::new(config.rewrite_options())
            .with_max_iterations(config.max_iterations)
            .with_cancellation(cancellation.clone());
        for name in &rules {
            let Some(rule) = recast_rules::rule_by_name(name) else {
                return Err(Error::unknown_rule(*name));
            };
            applicator = applicator.add_boxed_rule(rule);
        }
        tracing::debug!(rules = ?rules, "Engine ready");

        Ok(Self {
            config,
            rules,
            applicator,
            cancellation,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Enabled rule names, in the order they are offered each node.
    pub fn rules(&self) -> &[&'static str] {
        &self.rules
    }

    /// A handle that stops every run of this engine between passes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Rewrite one unit to a fixpoint.
    pub fn run_unit(&self, unit: &mut CompilationUnit) -> UnitReport {
        let span = tracing::info_span!("unit", root = %unit.root);
        let _guard = span.enter();
        let report = UnitReport::from(self.applicator.apply(&mut unit.ctx, unit.root));
        tracing::debug!(
            status = ?report.status,
            iterations = report.iterations,
            changes = report.total_changes,
            "Unit rewritten"
        );
        report
    }

    /// Rewrite many units in parallel. Reports come back in input order.
    pub fn run_units(&self, units: &mut [CompilationUnit]) -> Vec<UnitReport> {
        units.par_iter_mut().map(|unit| self.run_unit(unit)).collect()
    }
}
