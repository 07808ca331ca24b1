// Type annotation coverage for Python

use super::helpers::{function_name, functions, header_colon, is_method};
use super::Detector;
use crate::core::ast::{column_of, line_of, named_children};
use crate::core::{Category, Confidence, Issue, LineSpan, RuleId, Severity, SyntaxTree};
use crate::errors::DetectorError;
use crate::refactoring::assessment::Policy;
use tree_sitter::Node;

const POLICY: Policy = Policy::new(Severity::Medium, Confidence::Medium);

/// Flags functions missing annotations in a module that already uses them.
///
/// A module where no function is annotated is treated as deliberately
/// untyped and produces nothing.
pub struct MissingTypeAnnotationDetector;

impl Detector for MissingTypeAnnotationDetector {
    fn rule(&self) -> RuleId {
        RuleId::MissingTypeAnnotation
    }

    fn category(&self) -> Category {
        Category::TypeSafety
    }

    fn policy(&self) -> Policy {
        POLICY
    }

    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
        let coverage: Vec<_> = functions(tree)
            .into_iter()
            .map(|function| AnnotationCoverage::of(function, tree))
            .collect();

        let mut issues = Vec::new();
        for (idx, current) in coverage.iter().enumerate() {
            if current.missing.is_empty() {
                continue;
            }
            let sibling_annotated = coverage
                .iter()
                .enumerate()
                .any(|(other, c)| other != idx && c.annotated_positions > 0);
            if sibling_annotated {
                issues.push(current.to_issue(tree));
            }
        }
        Ok(issues)
    }
}

struct AnnotationCoverage<'t> {
    function: Node<'t>,
    name: String,
    annotated_positions: usize,
    /// Parameter names lacking a type, then `return` if applicable.
    missing: Vec<String>,
}

impl<'t> AnnotationCoverage<'t> {
    fn of(function: Node<'t>, tree: &SyntaxTree) -> Self {
        let mut annotated_positions = 0;
        let mut missing = Vec::new();
        let method = is_method(function);

        let params = function
            .child_by_field_name("parameters")
            .map(named_children)
            .unwrap_or_default();

        for (position, param) in params.into_iter().enumerate() {
            match param.kind() {
                "typed_parameter" | "typed_default_parameter" => annotated_positions += 1,
                "keyword_separator" | "positional_separator" => {}
                "identifier" => {
                    let name = tree.text(param);
                    let receiver = method && position == 0 && matches!(name, "self" | "cls");
                    if !receiver {
                        missing.push(name.to_string());
                    }
                }
                "default_parameter" => missing.push(
                    param
                        .child_by_field_name("name")
                        .map(|n| tree.text(n))
                        .unwrap_or_else(|| tree.text(param))
                        .to_string(),
                ),
                _ => missing.push(tree.text(param).to_string()),
            }
        }

        if function.child_by_field_name("return_type").is_some() {
            annotated_positions += 1;
        } else {
            missing.push("return".to_string());
        }

        Self {
            function,
            name: function_name(function, tree).to_string(),
            annotated_positions,
            missing,
        }
    }

    fn to_issue(&self, tree: &SyntaxTree) -> Issue {
        let line = line_of(self.function);
        let header_end = header_colon(self.function).map(line_of).unwrap_or(line);
        let span = LineSpan::new(line, header_end);

        Issue {
            rule: RuleId::MissingTypeAnnotation,
            category: Category::TypeSafety,
            line,
            column: column_of(self.function),
            severity: POLICY.severity,
            confidence: POLICY.confidence,
            description: format!(
                "Function `{}` is missing type annotations for: {}",
                self.name,
                self.missing.join(", ")
            ),
            current_snippet: tree.lines_text(span.start_line, span.end_line),
            span,
            suggested_fix: None,
            rationale: "Other functions in this module are annotated, so the gap here weakens \
                        type checking at every call site. The intended types cannot be \
                        derived from syntax alone, so no annotation is suggested."
                .to_string(),
        }
    }
}
