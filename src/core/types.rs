//! Data model shared by the analysis, execution and reporting stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Issue category, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Performance,
    Documentation,
    TypeSafety,
    ErrorHandling,
    Security,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Performance,
        Category::Documentation,
        Category::TypeSafety,
        Category::ErrorHandling,
        Category::Security,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        static DISPLAY_STRINGS: &[(Category, &str)] = &[
            (Category::Performance, "Performance"),
            (Category::Documentation, "Documentation"),
            (Category::TypeSafety, "Type Safety"),
            (Category::ErrorHandling, "Error Handling"),
            (Category::Security, "Security"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(c, _)| c == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// How much an issue matters if left unfixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

/// Certainty that a suggested change is correct and safe to apply automatically.
///
/// `Refuse` means the engine declines to act on the issue; such issues are
/// reported but never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Refuse,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::Refuse => "Refuse",
        };
        write!(f, "{s}")
    }
}

/// Aggregate effort estimate for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
        };
        write!(f, "{s}")
    }
}

/// Stable identifier of a registered detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    StringConcatInLoop,
    NestedLoop,
    MissingDocstring,
    MissingTypeAnnotation,
    BareExcept,
    DynamicCodeExecution,
}

impl RuleId {
    pub const ALL: [RuleId; 6] = [
        RuleId::StringConcatInLoop,
        RuleId::NestedLoop,
        RuleId::MissingDocstring,
        RuleId::MissingTypeAnnotation,
        RuleId::BareExcept,
        RuleId::DynamicCodeExecution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::StringConcatInLoop => "string-concat-in-loop",
            RuleId::NestedLoop => "nested-loop",
            RuleId::MissingDocstring => "missing-docstring",
            RuleId::MissingTypeAnnotation => "missing-type-annotation",
            RuleId::BareExcept => "bare-except",
            RuleId::DynamicCodeExecution => "dynamic-code-execution",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        RuleId::ALL
            .iter()
            .copied()
            .find(|rule| rule.as_str() == wanted)
            .ok_or_else(|| format!("unknown rule '{s}'"))
    }
}

/// The input of one analysis call: raw text plus an optional identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    source: String,
    id: Option<String>,
}

impl SourceUnit {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Inclusive, 1-based range of whole source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl LineSpan {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn overlaps(&self, other: &LineSpan) -> bool {
        self.start_line <= other.end_line && other.start_line <= self.end_line
    }
}

/// One detected opportunity or problem.
///
/// There is deliberately no `Default`: every detector must state severity
/// and confidence explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub rule: RuleId,
    pub category: Category,
    /// 1-based line the issue is anchored at.
    pub line: usize,
    /// 1-based column of the anchor.
    pub column: usize,
    pub severity: Severity,
    pub confidence: Confidence,
    pub description: String,
    /// Verbatim text of `span`.
    pub current_snippet: String,
    /// Lines covered by `current_snippet`; `suggested_fix` replaces exactly these lines.
    pub span: LineSpan,
    pub suggested_fix: Option<String>,
    pub rationale: String,
}

impl Issue {
    /// Whether the executor may act on this issue.
    pub fn is_actionable(&self) -> bool {
        self.suggested_fix.is_some() && self.confidence != Confidence::Refuse
    }
}

/// A detector that failed during analysis and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorFailure {
    pub rule: RuleId,
    pub message: String,
}

/// Terminal states of the negative-capability state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    /// The source could not be analysed; nothing downstream may act on it.
    Refused,
    /// Dry runs and live execution are both permitted.
    SafeToApply,
    /// Dry runs are permitted; live execution needs an explicit override.
    NeedsReview,
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanState::Refused => "REFUSED",
            PlanState::SafeToApply => "SAFE TO APPLY",
            PlanState::NeedsReview => "NEEDS REVIEW",
        };
        write!(f, "{s}")
    }
}

/// Aggregate output of analysing one [`SourceUnit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringPlan {
    pub source_id: Option<String>,
    /// xxh64 of the analysed text, used to reject execution against other text.
    pub source_digest: String,
    pub issues: Vec<Issue>,
    pub complexity: Complexity,
    pub safe_to_apply: bool,
    pub refusal_reason: Option<String>,
    #[serde(default)]
    pub detector_failures: Vec<DetectorFailure>,
}

impl RefactoringPlan {
    pub fn state(&self) -> PlanState {
        if self.refusal_reason.is_some() {
            PlanState::Refused
        } else if self.safe_to_apply {
            PlanState::SafeToApply
        } else {
            PlanState::NeedsReview
        }
    }

    pub fn is_refused(&self) -> bool {
        self.refusal_reason.is_some()
    }

    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.category == category)
    }
}

/// Aggregate output of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringResult {
    pub success: bool,
    pub original_code: String,
    pub refactored_code: Option<String>,
    pub changes_applied: Vec<String>,
    pub errors: Vec<String>,
    pub diff: Option<String>,
    /// Wall-clock time of the execution phase. Reporting only.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_id_parses_kebab_and_snake_case() {
        assert_eq!(
            "string-concat-in-loop".parse::<RuleId>(),
            Ok(RuleId::StringConcatInLoop)
        );
        assert_eq!("Bare_Except".parse::<RuleId>(), Ok(RuleId::BareExcept));
        assert!("no-such-rule".parse::<RuleId>().is_err());
    }

    #[test]
    fn test_rule_id_serde_matches_display() {
        for rule in RuleId::ALL {
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{rule}\""));
        }
    }

    #[test]
    fn test_line_span_overlap() {
        assert!(LineSpan::new(3, 5).overlaps(&LineSpan::single(5)));
        assert!(!LineSpan::new(3, 5).overlaps(&LineSpan::single(6)));
        assert_eq!(LineSpan::new(4, 2), LineSpan::single(4));
    }

    #[test]
    fn test_plan_state_follows_fields() {
        let mut plan = RefactoringPlan {
            source_id: None,
            source_digest: String::new(),
            issues: vec![],
            complexity: Complexity::Low,
            safe_to_apply: true,
            refusal_reason: None,
            detector_failures: vec![],
        };
        assert_eq!(plan.state(), PlanState::SafeToApply);

        plan.safe_to_apply = false;
        assert_eq!(plan.state(), PlanState::NeedsReview);

        plan.refusal_reason = Some("Code has syntax errors: x".into());
        assert_eq!(plan.state(), PlanState::Refused);
    }
}
