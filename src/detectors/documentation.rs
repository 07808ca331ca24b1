// Documentation pattern detection for Python

use super::helpers::{
    block_statements, function_name, functions, header_colon, is_docstring_statement,
};
use super::Detector;
use crate::core::ast::{column_of, line_of};
use crate::core::{Category, Confidence, Issue, LineSpan, RuleId, Severity, SyntaxTree};
use crate::errors::DetectorError;
use crate::refactoring::assessment::Policy;
use tree_sitter::Node;

const POLICY: Policy = Policy::new(Severity::Low, Confidence::High);

/// Flags functions and methods whose body does not open with a docstring.
pub struct MissingDocstringDetector;

impl Detector for MissingDocstringDetector {
    fn rule(&self) -> RuleId {
        RuleId::MissingDocstring
    }

    fn category(&self) -> Category {
        Category::Documentation
    }

    fn policy(&self) -> Policy {
        POLICY
    }

    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
        Ok(functions(tree)
            .into_iter()
            .filter(|function| !has_docstring(*function))
            .map(|function| missing_docstring_issue(function, tree))
            .collect())
    }
}

fn has_docstring(function: Node<'_>) -> bool {
    function
        .child_by_field_name("body")
        .and_then(|body| block_statements(body).first().copied())
        .is_some_and(is_docstring_statement)
}

fn missing_docstring_issue(function: Node<'_>, tree: &SyntaxTree) -> Issue {
    let name = function_name(function, tree);
    let def_line = line_of(function);
    let header_end = header_colon(function)
        .map(line_of)
        .unwrap_or(def_line);
    let span = LineSpan::new(def_line, header_end);

    Issue {
        rule: RuleId::MissingDocstring,
        category: Category::Documentation,
        line: def_line,
        column: column_of(function),
        severity: POLICY.severity,
        confidence: POLICY.confidence,
        description: format!("Function `{name}` has no docstring"),
        current_snippet: tree.lines_text(span.start_line, span.end_line),
        span,
        suggested_fix: placeholder_docstring(function, tree, name, span),
        rationale: "A docstring is the first statement of a function body; without one the \
                    function's contract is only recoverable by reading its implementation, \
                    and help() / generated documentation show nothing."
            .to_string(),
    }
}

/// Header lines verbatim followed by a placeholder docstring at body indentation.
fn placeholder_docstring(
    function: Node<'_>,
    tree: &SyntaxTree,
    name: &str,
    header: LineSpan,
) -> Option<String> {
    let first = function
        .child_by_field_name("body")
        .and_then(|body| block_statements(body).first().copied())?;
    let body_line = line_of(first);
    if body_line <= header.end_line {
        return None;
    }

    let indent = tree.indentation_of(body_line);
    if indent.len() != first.start_position().column
        || tree.indentation_of(header.start_line).len() != function.start_position().column
    {
        return None;
    }

    Some(format!(
        "{}\n{indent}\"\"\"TODO: document {name}.\"\"\"",
        tree.lines_text(header.start_line, header.end_line)
    ))
}
