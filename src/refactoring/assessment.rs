//! Severity and confidence policies, and the invariants every issue must meet
//! before it may enter a plan.

use crate::core::{Confidence, Issue, RuleId, Severity};
use crate::errors::DetectorError;

/// The fixed severity/confidence a detector assigns to its issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub severity: Severity,
    pub confidence: Confidence,
}

impl Policy {
    pub const fn new(severity: Severity, confidence: Confidence) -> Self {
        Self {
            severity,
            confidence,
        }
    }
}

/// Check a detector's output against its declared policy.
///
/// Issues must carry the detector's rule and exact policy, a non-empty
/// rationale, a span that contains the anchor line, and no fix when the
/// confidence is `Refuse`.
pub fn assess(
    rule: RuleId,
    policy: Policy,
    issues: Vec<Issue>,
) -> Result<Vec<Issue>, DetectorError> {
    issues
        .into_iter()
        .map(|issue| check_issue(rule, policy, issue))
        .collect()
}

fn check_issue(rule: RuleId, policy: Policy, issue: Issue) -> Result<Issue, DetectorError> {
    let invalid = |reason: &str| DetectorError::InvalidIssue {
        rule,
        line: issue.line,
        reason: reason.to_string(),
    };

    if issue.rule != rule {
        return Err(invalid("issue carries a different rule id"));
    }
    if issue.severity != policy.severity || issue.confidence != policy.confidence {
        return Err(invalid("severity/confidence differ from the detector policy"));
    }
    if issue.rationale.trim().is_empty() {
        return Err(invalid("rationale is empty"));
    }
    if issue.line == 0 || issue.line < issue.span.start_line || issue.line > issue.span.end_line {
        return Err(invalid("anchor line lies outside the issue span"));
    }
    if issue.confidence == Confidence::Refuse && issue.suggested_fix.is_some() {
        return Err(invalid("refused issue carries a suggested fix"));
    }
    Ok(issue)
}
