//! Plain-text report over an already computed plan and optional result.
//!
//! The layout is fixed: every category appears in registration order, even
//! when empty, so two reports can be diffed line by line.

use crate::core::{Category, Issue, RefactoringPlan, RefactoringResult};
use std::fmt;

const RULE: &str = "==================";

/// Render the text report for `plan`, plus an execution section when a
/// result is supplied.
pub fn generate_report(plan: &RefactoringPlan, result: Option<&RefactoringResult>) -> String {
    ReportView { plan, result }.to_string()
}

/// Display adapter producing the report layout.
pub struct ReportView<'a> {
    pub plan: &'a RefactoringPlan,
    pub result: Option<&'a RefactoringResult>,
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;
        writeln!(f, "Refactoring Report")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Source: {}", plan.source_id.as_deref().unwrap_or("<input>"))?;
        writeln!(f, "State: {}", plan.state())?;
        writeln!(f, "Complexity: {}", plan.complexity)?;
        writeln!(f, "Safe to apply: {}", plan.safe_to_apply)?;
        writeln!(f, "Issues: {}", plan.issues.len())?;

        if let Some(reason) = &plan.refusal_reason {
            writeln!(f)?;
            writeln!(f, "## Refusal")?;
            writeln!(f, "{reason}")?;
        } else {
            for category in Category::ALL {
                write_category(f, plan, category)?;
            }
        }

        if !plan.detector_failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Detector Failures")?;
            for failure in &plan.detector_failures {
                writeln!(f, "- [{}] {}", failure.rule, failure.message)?;
            }
        }

        if let Some(result) = self.result {
            write_result(f, result)?;
        }
        Ok(())
    }
}

fn write_category(
    f: &mut fmt::Formatter<'_>,
    plan: &RefactoringPlan,
    category: Category,
) -> fmt::Result {
    let issues: Vec<&Issue> = plan.issues_in(category).collect();
    writeln!(f)?;
    writeln!(f, "## {category} ({})", issues.len())?;
    if issues.is_empty() {
        return writeln!(f, "(none)");
    }
    for issue in issues {
        write_issue(f, issue)?;
    }
    Ok(())
}

fn write_issue(f: &mut fmt::Formatter<'_>, issue: &Issue) -> fmt::Result {
    writeln!(f, "- Line {}, column {} [{}]", issue.line, issue.column, issue.rule)?;
    writeln!(
        f,
        "  Severity: {} | Confidence: {}",
        issue.severity, issue.confidence
    )?;
    writeln!(f, "  Description: {}", issue.description)?;
    writeln!(f, "  Rationale: {}", issue.rationale)?;
    writeln!(f, "  Current:")?;
    write_block(f, &issue.current_snippet)?;
    match &issue.suggested_fix {
        Some(fix) => {
            writeln!(f, "  Suggested fix:")?;
            write_block(f, fix)
        }
        None => writeln!(f, "  Suggested fix: (none)"),
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for line in text.lines() {
        writeln!(f, "    | {line}")?;
    }
    Ok(())
}

fn write_result(f: &mut fmt::Formatter<'_>, result: &RefactoringResult) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Execution Result")?;
    writeln!(f, "Success: {}", result.success)?;
    writeln!(f, "Duration: {:.3}s", result.duration.as_secs_f64())?;
    write_list(f, "Changes applied", &result.changes_applied)?;
    write_list(f, "Errors", &result.errors)
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, entries: &[String]) -> fmt::Result {
    writeln!(f, "{title}:")?;
    if entries.is_empty() {
        return writeln!(f, "- (none)");
    }
    for entry in entries {
        writeln!(f, "- {entry}")?;
    }
    Ok(())
}
