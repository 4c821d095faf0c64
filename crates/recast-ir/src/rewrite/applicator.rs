//! PatternApplicator: fixpoint driver over one syntax tree.
//!
//! Each pass walks the tree in pre-order and offers every live node to the
//! rules in registration order. The first rule that records edits wins: its
//! edits commit immediately and the rewritten subtree is left alone until
//! the next pass. Child lists are snapshotted before descent, and children
//! that were erased or moved away meanwhile are skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::RewriteOptions;
use super::pattern::RewriteRule;
use super::rewriter::{self, Rewriter};
use crate::context::TreeContext;
use crate::refs::NodeRef;
use crate::walk::WalkAction;

/// Host-side request to stop between passes.
///
/// Cloning shares the flag. A pass that is already running finishes, so
/// the tree is never left half-edited.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How the fixpoint loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// The last pass committed nothing.
    Converged,
    /// `max_iterations` passes all committed something. The tree is still
    /// consistent and usable.
    IterationCapReached,
    /// Stopped between passes on request.
    Cancelled,
}

/// A committed rewrite, for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedRewrite {
    /// 1-based pass number.
    pub pass: usize,
    pub rule: &'static str,
    /// The node the rule was offered.
    pub target: NodeRef,
}

/// Result of applying rewrite rules.
#[derive(Clone, Debug)]
pub struct ApplyResult {
    /// Number of passes performed.
    pub iterations: usize,
    /// Total number of committed rewrites.
    pub total_changes: usize,
    pub status: ConvergenceStatus,
    /// Committed rewrites in commit order.
    pub log: Vec<AppliedRewrite>,
}

impl ApplyResult {
    pub fn reached_fixpoint(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}

/// Applies rewrite rules to a tree until nothing changes.
pub struct PatternApplicator {
    rules: Vec<Box<dyn RewriteRule>>,
    max_iterations: usize,
    options: RewriteOptions,
    cancellation: Option<CancellationToken>,
}

impl PatternApplicator {
    pub fn new(options: RewriteOptions) -> Self {
        Self {
            rules: Vec::new(),
            max_iterations: 10,
            options,
            cancellation: None,
        }
    }

    /// Add a rule. Rules are offered each node in the order they were added.
    pub fn add_rule(mut self, rule: impl RewriteRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn add_boxed_rule(mut self, rule: Box<dyn RewriteRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set maximum fixpoint iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Run passes over the tree rooted at `root` until a fixpoint, the
    /// iteration cap, or cancellation.
    pub fn apply(&self, ctx: &mut TreeContext, root: NodeRef) -> ApplyResult {
        let mut total_changes = 0;
        let mut iterations = 0;
        let mut log = Vec::new();

        for pass in 1..=self.max_iterations {
            if self
                .cancellation
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
            {
                tracing::debug!(pass, "Rewrite cancelled");
                return ApplyResult {
                    iterations,
                    total_changes,
                    status: ConvergenceStatus::Cancelled,
                    log,
                };
            }

            iterations += 1;
            let span = tracing::info_span!("pass", pass);
            let _guard = span.enter();
            let changes = self.run_one_iteration(ctx, root, pass, &mut log);
            total_changes += changes;
            if changes == 0 {
                return ApplyResult {
                    iterations,
                    total_changes,
                    status: ConvergenceStatus::Converged,
                    log,
                };
            }
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            total_changes,
            "Rules did not converge"
        );
        ApplyResult {
            iterations,
            total_changes,
            status: ConvergenceStatus::IterationCapReached,
            log,
        }
    }

    fn run_one_iteration(
        &self,
        ctx: &mut TreeContext,
        root: NodeRef,
        pass: usize,
        log: &mut Vec<AppliedRewrite>,
    ) -> usize {
        let active = vec![true; self.rules.len()];
        self.visit(ctx, root, &active, pass, log)
    }

    fn visit(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        active: &[bool],
        pass: usize,
        log: &mut Vec<AppliedRewrite>,
    ) -> usize {
        // Rules that asked to skip this subtree without editing it.
        let mut withdrawn: Option<Vec<bool>> = None;

        for (index, rule) in self.rules.iter().enumerate() {
            if !active[index] {
                continue;
            }
            let mut rw = Rewriter::new(&self.options);
            let action = rule.match_and_rewrite(ctx, node, &mut rw);
            if rw.has_edits() {
                let edits = rw.take_edits();
                tracing::debug!(
                    rule = rule.name(),
                    node = %node,
                    edits = edits.len(),
                    "Rewrite committed"
                );
                rewriter::apply_edits(ctx, &edits);
                log.push(AppliedRewrite {
                    pass,
                    rule: rule.name(),
                    target: node,
                });
                return 1;
            }
            ctx.discard_pending_moves();
            if action == WalkAction::Skip {
                withdrawn.get_or_insert_with(|| active.to_vec())[index] = false;
            }
        }

        let active = withdrawn.as_deref().unwrap_or(active);
        if !active.iter().any(|a| *a) {
            return 0;
        }

        let mut changes = 0;
        // Snapshot the children
        let children = ctx.children(node);
        for child in children {
            // Skip children erased or relocated by an earlier commit
            if ctx.is_erased(child) || ctx.parent(child) != Some(node) {
                continue;
            }
            changes += self.visit(ctx, child, active, pass, log);
        }
        changes
    }
}
