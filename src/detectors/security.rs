// Security pattern detection for Python

use super::Detector;
use crate::core::ast::{column_of, end_line_of, line_of};
use crate::core::{Category, Confidence, Issue, LineSpan, RuleId, Severity, SyntaxTree};
use crate::errors::DetectorError;
use crate::refactoring::assessment::Policy;
use tree_sitter::Node;

const POLICY: Policy = Policy::new(Severity::Critical, Confidence::Refuse);

const DYNAMIC_BUILTINS: &[&str] = &["eval", "exec"];

/// Flags calls to the `eval`/`exec` builtins.
///
/// Whether the evaluated text is trusted cannot be decided from one file, so
/// every hit is a refusal: reported, never transformed.
pub struct DynamicCodeExecutionDetector;

impl Detector for DynamicCodeExecutionDetector {
    fn rule(&self) -> RuleId {
        RuleId::DynamicCodeExecution
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn policy(&self) -> Policy {
        POLICY
    }

    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
        let mut issues = Vec::new();
        tree.walk(|node| {
            if let Some(builtin) = dynamic_builtin(node, tree) {
                issues.push(refusal_issue(node, builtin, tree));
            }
        });
        Ok(issues)
    }
}

fn dynamic_builtin<'t>(node: Node<'_>, tree: &'t SyntaxTree) -> Option<&'t str> {
    if node.kind() != "call" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    if function.kind() != "identifier" {
        return None;
    }
    let name = tree.text(function);
    DYNAMIC_BUILTINS.contains(&name).then_some(name)
}

fn refusal_issue(call: Node<'_>, builtin: &str, tree: &SyntaxTree) -> Issue {
    let line = line_of(call);
    let span = LineSpan::new(line, end_line_of(call));
    Issue {
        rule: RuleId::DynamicCodeExecution,
        category: Category::Security,
        line,
        column: column_of(call),
        severity: POLICY.severity,
        confidence: POLICY.confidence,
        description: format!("Call to `{builtin}()` executes dynamically constructed code"),
        current_snippet: tree.lines_text(span.start_line, span.end_line),
        span,
        suggested_fix: None,
        rationale: format!(
            "`{builtin}()` runs arbitrary code with the caller's privileges. Whether its input \
             can be influenced by an attacker depends on data flow outside this file, which \
             cannot be derived from syntax; refusing to propose a transformation. A human must \
             verify the input is trusted or replace it (e.g. ast.literal_eval, a dispatch table)."
        ),
    }
}
