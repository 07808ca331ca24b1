//! Plan execution: dry-run intentions or all-or-nothing live application.

use super::edits::{apply_line_edits, LineEdit};
use crate::core::{source_digest, Issue, PlanState, RefactoringPlan, RefactoringResult, SyntaxTree};
use crate::errors::{panic_message, ExecutionError};
use crate::io::diff::{generate_diff_with_labels, labels_for};
use crate::observability::{AnalysisPhase, Diagnostic, DiagnosticLevel, DiagnosticSink};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

pub struct Executor<'a> {
    allow_review: bool,
    sink: &'a dyn DiagnosticSink,
}

/// What one run produced, before timing and diffing are attached.
struct Outcome {
    success: bool,
    refactored_code: Option<String>,
    changes_applied: Vec<String>,
    errors: Vec<String>,
}

impl Outcome {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            refactored_code: None,
            changes_applied: Vec::new(),
            errors,
        }
    }

    fn from_error(err: ExecutionError) -> Self {
        Self::failed(vec![err.to_string()])
    }
}

impl<'a> Executor<'a> {
    pub fn new(sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            allow_review: false,
            sink,
        }
    }

    /// Permit live execution of `NEEDS REVIEW` plans.
    pub fn with_review_override(mut self, allow_review: bool) -> Self {
        self.allow_review = allow_review;
        self
    }

    /// Execute `plan` against `source`. Never panics and never returns an
    /// error: every failure ends up in `RefactoringResult::errors`.
    pub fn execute(
        &self,
        source: &str,
        plan: &RefactoringPlan,
        dry_run: bool,
    ) -> RefactoringResult {
        let start = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| self.run(source, plan, dry_run)))
            .unwrap_or_else(|payload| {
                Outcome::from_error(ExecutionError::Panicked(panic_message(payload.as_ref())))
            });

        for error in &outcome.errors {
            self.note(plan, DiagnosticLevel::Warn, error.clone());
        }

        let diff = outcome
            .refactored_code
            .as_deref()
            .filter(|refactored| *refactored != source)
            .map(|refactored| {
                let (old, new) = labels_for(plan.source_id.as_deref());
                generate_diff_with_labels(source, refactored, &old, &new)
            });

        RefactoringResult {
            success: outcome.success,
            original_code: source.to_string(),
            refactored_code: outcome.refactored_code,
            changes_applied: outcome.changes_applied,
            errors: outcome.errors,
            diff,
            duration: start.elapsed(),
        }
    }

    fn run(&self, source: &str, plan: &RefactoringPlan, dry_run: bool) -> Outcome {
        if let Some(reason) = &plan.refusal_reason {
            return Outcome::failed(vec![reason.clone()]);
        }

        let actual = source_digest(source);
        if actual != plan.source_digest {
            return Outcome::from_error(ExecutionError::SourceMismatch {
                expected: plan.source_digest.clone(),
                actual,
            });
        }

        if let Err(err) = SyntaxTree::parse(source) {
            return Outcome::from_error(ExecutionError::PreValidation(err));
        }

        if !plan.detector_failures.is_empty() {
            return Outcome::failed(
                plan.detector_failures
                    .iter()
                    .map(|failure| failure.message.clone())
                    .collect(),
            );
        }

        let eligible = eligible_fixes(plan);

        if dry_run {
            self.note(
                plan,
                DiagnosticLevel::Info,
                format!("dry run: {} eligible fix(es)", eligible.len()),
            );
            return Outcome {
                success: true,
                refactored_code: None,
                changes_applied: eligible
                    .iter()
                    .map(|(issue, _)| format!("Would apply: {}", issue.description))
                    .collect(),
                errors: Vec::new(),
            };
        }

        match self.apply_live(source, plan, &eligible) {
            Ok(refactored) => {
                self.note(
                    plan,
                    DiagnosticLevel::Info,
                    format!("applied {} fix(es)", eligible.len()),
                );
                Outcome {
                    success: true,
                    refactored_code: Some(refactored),
                    changes_applied: eligible
                        .iter()
                        .map(|(issue, _)| format!("Applied: {}", issue.description))
                        .collect(),
                    errors: Vec::new(),
                }
            }
            Err(err) => Outcome::from_error(err),
        }
    }

    fn apply_live(
        &self,
        source: &str,
        plan: &RefactoringPlan,
        eligible: &[(&Issue, &str)],
    ) -> Result<String, ExecutionError> {
        match plan.state() {
            PlanState::SafeToApply => {}
            PlanState::NeedsReview if self.allow_review => {}
            _ => return Err(ExecutionError::ReviewRequired),
        }

        let edits: Vec<LineEdit> = eligible
            .iter()
            .map(|(issue, fix)| LineEdit::new(issue.span, *fix))
            .collect();
        let candidate = apply_line_edits(source, &edits)?;

        // The candidate is discarded on failure; the caller's text is never touched.
        SyntaxTree::parse(&candidate).map_err(ExecutionError::ValidationFailure)?;
        Ok(candidate)
    }

    fn note(&self, plan: &RefactoringPlan, level: DiagnosticLevel, message: String) {
        self.sink.record(Diagnostic::new(
            AnalysisPhase::Execution,
            level,
            plan.source_id.as_deref(),
            message,
        ));
    }
}

/// Issues with a fix and a non-refused confidence, in plan order.
fn eligible_fixes(plan: &RefactoringPlan) -> Vec<(&Issue, &str)> {
    plan.issues
        .iter()
        .filter(|issue| issue.is_actionable())
        .filter_map(|issue| issue.suggested_fix.as_deref().map(|fix| (issue, fix)))
        .collect()
}
