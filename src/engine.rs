//! Stateless facade over parse → detect → plan → execute → report.

use crate::core::{RefactoringPlan, RefactoringResult, SourceUnit, SyntaxTree};
use crate::detectors::RuleSelection;
use crate::io::{diff, report};
use crate::observability::{AnalysisPhase, Diagnostic, DiagnosticLevel, DiagnosticSink, NullSink};
use crate::refactoring::{Executor, PlanBuilder};
use std::sync::Arc;

/// Engine configuration. Holds no state across calls, so one engine may be
/// shared by any number of threads.
#[derive(Clone)]
pub struct Engine {
    selection: RuleSelection,
    sink: Arc<dyn DiagnosticSink>,
    allow_review: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            selection: RuleSelection::all(),
            sink: Arc::new(NullSink),
            allow_review: false,
        }
    }
}

impl Engine {
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_rules(mut self, selection: RuleSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Allow live execution of plans that need review.
    pub fn with_review_override(mut self, allow_review: bool) -> Self {
        self.allow_review = allow_review;
        self
    }

    pub fn analyze(&self, unit: &SourceUnit) -> RefactoringPlan {
        let parsed = SyntaxTree::parse(unit.source());
        PlanBuilder::new(self.selection.detectors(), self.sink.as_ref())
            .build(unit, parsed.as_ref())
    }

    pub fn execute(
        &self,
        source: &str,
        plan: &RefactoringPlan,
        dry_run: bool,
    ) -> RefactoringResult {
        Executor::new(self.sink.as_ref())
            .with_review_override(self.allow_review)
            .execute(source, plan, dry_run)
    }

    pub fn report(&self, plan: &RefactoringPlan, result: Option<&RefactoringResult>) -> String {
        self.sink.record(Diagnostic::new(
            AnalysisPhase::Reporting,
            DiagnosticLevel::Debug,
            plan.source_id.as_deref(),
            "rendering report",
        ));
        report::generate_report(plan, result)
    }

    pub fn diff(&self, original: &str, refactored: &str) -> String {
        diff::generate_diff(original, refactored)
    }
}
