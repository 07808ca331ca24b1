//! Plan builder: runs the selected detectors over one parsed unit and
//! aggregates their issues into a [`RefactoringPlan`].

use super::assessment::assess;
use crate::core::{
    source_digest, Complexity, Confidence, DetectorFailure, Issue, RefactoringPlan, Severity,
    SourceUnit, SyntaxTree,
};
use crate::detectors::Detector;
use crate::errors::{panic_message, DetectorError, SyntaxError};
use crate::observability::{AnalysisPhase, Diagnostic, DiagnosticLevel, DiagnosticSink};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// More issues than this makes a plan `High` complexity.
pub const HIGH_COMPLEXITY_ISSUE_COUNT: usize = 10;
/// More issues than this makes a plan at least `Medium` complexity.
pub const MEDIUM_COMPLEXITY_ISSUE_COUNT: usize = 4;

/// Prefix of every syntax refusal.
pub const SYNTAX_REFUSAL_PREFIX: &str = "Code has syntax errors: ";

pub struct PlanBuilder<'a> {
    detectors: Vec<Arc<dyn Detector>>,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(detectors: Vec<Arc<dyn Detector>>, sink: &'a dyn DiagnosticSink) -> Self {
        Self { detectors, sink }
    }

    /// Build the plan for `unit` from its parse outcome.
    ///
    /// A syntax error is the only path to a refusal.
    pub fn build(
        &self,
        unit: &SourceUnit,
        parsed: Result<&SyntaxTree, &SyntaxError>,
    ) -> RefactoringPlan {
        let source_id = unit.id().map(str::to_string);
        let digest = source_digest(unit.source());

        let tree = match parsed {
            Ok(tree) => tree,
            Err(err) => {
                self.note(
                    unit,
                    DiagnosticLevel::Info,
                    AnalysisPhase::Parsing,
                    format!("refusing analysis: {err}"),
                );
                return refused_plan(source_id, digest, err);
            }
        };

        let mut ranked: Vec<(usize, Issue)> = Vec::new();
        let mut detector_failures = Vec::new();

        for (rank, detector) in self.detectors.iter().enumerate() {
            match run_detector(detector.as_ref(), tree) {
                Ok(issues) => {
                    self.note(
                        unit,
                        DiagnosticLevel::Debug,
                        AnalysisPhase::Detection,
                        format!("{} reported {} issue(s)", detector.rule(), issues.len()),
                    );
                    ranked.extend(issues.into_iter().map(|issue| (rank, issue)));
                }
                Err(err) => {
                    self.note(
                        unit,
                        DiagnosticLevel::Warn,
                        AnalysisPhase::Detection,
                        format!("skipping detector: {err}"),
                    );
                    detector_failures.push(DetectorFailure {
                        rule: err.rule(),
                        message: err.to_string(),
                    });
                }
            }
        }

        ranked.sort_by_key(|(rank, issue)| (*rank, issue.line, issue.column));
        let issues: Vec<Issue> = ranked.into_iter().map(|(_, issue)| issue).collect();

        let complexity = compute_complexity(&issues);
        let safe_to_apply = compute_safe_to_apply(complexity, &issues);

        self.note(
            unit,
            DiagnosticLevel::Info,
            AnalysisPhase::Planning,
            format!(
                "{} issue(s), complexity {complexity}, safe_to_apply {safe_to_apply}",
                issues.len()
            ),
        );

        RefactoringPlan {
            source_id,
            source_digest: digest,
            issues,
            complexity,
            safe_to_apply,
            refusal_reason: None,
            detector_failures,
        }
    }

    fn note(
        &self,
        unit: &SourceUnit,
        level: DiagnosticLevel,
        phase: AnalysisPhase,
        message: String,
    ) {
        self.sink.record(Diagnostic::new(phase, level, unit.id(), message));
    }
}

fn refused_plan(source_id: Option<String>, digest: String, err: &SyntaxError) -> RefactoringPlan {
    RefactoringPlan {
        source_id,
        source_digest: digest,
        issues: Vec::new(),
        complexity: compute_complexity(&[]),
        safe_to_apply: false,
        refusal_reason: Some(format!("{SYNTAX_REFUSAL_PREFIX}{}", err.message)),
        detector_failures: Vec::new(),
    }
}

/// Run one detector in isolation, then hold its output to its policy.
fn run_detector(detector: &dyn Detector, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
    let rule = detector.rule();
    let issues = catch_unwind(AssertUnwindSafe(|| detector.detect(tree))).map_err(|payload| {
        DetectorError::Panicked {
            rule,
            message: panic_message(payload.as_ref()),
        }
    })??;
    assess(rule, detector.policy(), issues)
}

/// `High` above ten issues or with any critical one; `Medium` above four
/// issues or with any high-severity one; otherwise `Low`.
pub fn compute_complexity(issues: &[Issue]) -> Complexity {
    let has = |severity: Severity| issues.iter().any(|i| i.severity == severity);

    if issues.len() > HIGH_COMPLEXITY_ISSUE_COUNT || has(Severity::Critical) {
        Complexity::High
    } else if issues.len() > MEDIUM_COMPLEXITY_ISSUE_COUNT || has(Severity::High) {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Auto-application needs non-`High` complexity and no refused issue.
pub fn compute_safe_to_apply(complexity: Complexity, issues: &[Issue]) -> bool {
    complexity != Complexity::High && issues.iter().all(|i| i.confidence != Confidence::Refuse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, LineSpan, RuleId};
    use crate::detectors::{registry, RuleSelection};
    use crate::observability::{CollectingSink, NullSink};
    use crate::refactoring::assessment::Policy;

    fn issue(severity: Severity, confidence: Confidence) -> Issue {
        Issue {
            rule: RuleId::NestedLoop,
            category: Category::Performance,
            line: 1,
            column: 1,
            severity,
            confidence,
            description: "d".into(),
            current_snippet: "s".into(),
            span: LineSpan::single(1),
            suggested_fix: None,
            rationale: "r".into(),
        }
    }

    fn build(source: &str, detectors: Vec<Arc<dyn Detector>>) -> RefactoringPlan {
        let unit = SourceUnit::new(source).with_id("unit.py");
        let parsed = SyntaxTree::parse(source);
        PlanBuilder::new(detectors, &NullSink).build(&unit, parsed.as_ref())
    }

    #[test]
    fn test_complexity_thresholds() {
        let low = issue(Severity::Low, Confidence::High);
        assert_eq!(compute_complexity(&[]), Complexity::Low);
        assert_eq!(compute_complexity(&vec![low.clone(); 4]), Complexity::Low);
        assert_eq!(compute_complexity(&vec![low.clone(); 5]), Complexity::Medium);
        assert_eq!(compute_complexity(&vec![low.clone(); 10]), Complexity::Medium);
        assert_eq!(compute_complexity(&vec![low; 11]), Complexity::High);
        assert_eq!(
            compute_complexity(&[issue(Severity::High, Confidence::High)]),
            Complexity::Medium
        );
        assert_eq!(
            compute_complexity(&[issue(Severity::Critical, Confidence::High)]),
            Complexity::High
        );
    }

    #[test]
    fn test_refused_issue_blocks_auto_apply() {
        let issues = [issue(Severity::Low, Confidence::Refuse)];
        assert!(!compute_safe_to_apply(Complexity::Low, &issues));
        assert!(compute_safe_to_apply(
            Complexity::Medium,
            &[issue(Severity::Low, Confidence::Low)]
        ));
        assert!(!compute_safe_to_apply(Complexity::High, &[]));
    }

    #[test]
    fn test_syntax_error_refuses_plan() {
        let plan = build("def broken(\n    print(\"x\"", RuleSelection::all().detectors());
        let reason = plan.refusal_reason.as_deref().unwrap();
        assert!(reason.starts_with(SYNTAX_REFUSAL_PREFIX));
        assert!(plan.issues.is_empty());
        assert!(!plan.safe_to_apply);
        assert_eq!(plan.source_id.as_deref(), Some("unit.py"));
    }

    #[test]
    fn test_issues_follow_registration_order_then_line() {
        let source =
            "def b():\n    try:\n        pass\n    except:\n        pass\n\ndef a():\n    pass\n";
        let plan = build(source, registry().to_vec());
        let rules: Vec<(RuleId, usize)> = plan.issues.iter().map(|i| (i.rule, i.line)).collect();
        assert_eq!(
            rules,
            vec![
                (RuleId::MissingDocstring, 1),
                (RuleId::MissingDocstring, 7),
                (RuleId::BareExcept, 4),
            ]
        );
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn rule(&self) -> RuleId {
            RuleId::NestedLoop
        }
        fn category(&self) -> Category {
            Category::Performance
        }
        fn policy(&self) -> Policy {
            Policy::new(Severity::Medium, Confidence::Medium)
        }
        fn detect(&self, _tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
            panic!("traversal bug")
        }
    }

    #[test]
    fn test_faulty_detector_is_isolated() {
        let sink = CollectingSink::default();
        let unit = SourceUnit::new("def f():\n    pass\n");
        let parsed = SyntaxTree::parse(unit.source());
        let mut detectors: Vec<Arc<dyn Detector>> = vec![Arc::new(PanickingDetector)];
        detectors.extend(RuleSelection::only([RuleId::MissingDocstring]).detectors());

        let plan = PlanBuilder::new(detectors, &sink).build(&unit, parsed.as_ref());

        assert_eq!(plan.issues.len(), 1);
        assert_eq!(plan.detector_failures.len(), 1);
        assert!(plan.detector_failures[0].message.contains("traversal bug"));
        assert!(plan.refusal_reason.is_none());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.level == DiagnosticLevel::Warn));
    }
}
