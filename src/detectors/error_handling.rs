// Error handling pattern detection for Python

use super::helpers::{header_colon, line_prefix};
use super::Detector;
use crate::core::ast::{column_of, line_of, named_children};
use crate::core::{Category, Confidence, Issue, LineSpan, RuleId, Severity, SyntaxTree};
use crate::errors::DetectorError;
use crate::refactoring::assessment::Policy;
use tree_sitter::Node;

const POLICY: Policy = Policy::new(Severity::High, Confidence::High);

const RATIONALE: &str = "A bare `except:` also catches BaseException subclasses that carry \
    control flow rather than errors: KeyboardInterrupt (user interrupt), SystemExit, \
    GeneratorExit and asyncio cancellation. Swallowing them makes programs impossible to \
    cancel or interrupt cleanly, so the handler must be narrowed. `except Exception:` keeps \
    catching every ordinary error while letting those signals propagate.";

/// Flags `except:` clauses that name no exception type.
pub struct BareExceptDetector;

impl Detector for BareExceptDetector {
    fn rule(&self) -> RuleId {
        RuleId::BareExcept
    }

    fn category(&self) -> Category {
        Category::ErrorHandling
    }

    fn policy(&self) -> Policy {
        POLICY
    }

    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
        let mut issues = Vec::new();
        tree.walk(|node| {
            if node.kind() == "except_clause" && is_bare(node) {
                issues.push(bare_except_issue(node, tree));
            }
        });
        Ok(issues)
    }
}

/// An except clause is bare when nothing but its body follows the keyword.
fn is_bare(clause: Node<'_>) -> bool {
    named_children(clause)
        .iter()
        .all(|child| child.kind() == "block")
}

fn bare_except_issue(clause: Node<'_>, tree: &SyntaxTree) -> Issue {
    let line = line_of(clause);
    Issue {
        rule: RuleId::BareExcept,
        category: Category::ErrorHandling,
        line,
        column: column_of(clause),
        severity: POLICY.severity,
        confidence: POLICY.confidence,
        description: "Bare `except:` catches every exception, including interrupts and \
                      cancellation"
            .to_string(),
        current_snippet: tree.line_text(line).to_string(),
        span: LineSpan::single(line),
        suggested_fix: narrowed_header(clause, tree),
        rationale: RATIONALE.to_string(),
    }
}

/// The clause's line with `except:` rewritten to `except Exception:`.
fn narrowed_header(clause: Node<'_>, tree: &SyntaxTree) -> Option<String> {
    let colon = header_colon(clause)?;
    let keyword = clause.start_position();
    let colon_pos = colon.start_position();
    if colon_pos.row != keyword.row {
        return None;
    }

    let text = tree.line_text(line_of(clause));
    let before = line_prefix(text, keyword.column)?;
    let after = text.get(colon_pos.column..)?;
    Some(format!("{before}except Exception{after}"))
}
