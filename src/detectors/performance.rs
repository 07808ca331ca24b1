// Performance pattern detection for Python

use super::helpers::{
    block_statements, fresh_name, identifiers_in, is_scope_boundary, is_string_like,
    operator_kind,
};
use super::Detector;
use crate::core::ast::{children, column_of, end_line_of, line_of, named_children};
use crate::core::{Category, Confidence, Issue, LineSpan, RuleId, Severity, SyntaxTree};
use crate::errors::DetectorError;
use crate::refactoring::assessment::Policy;
use std::collections::BTreeSet;
use tree_sitter::Node;

const CONCAT_POLICY: Policy = Policy::new(Severity::High, Confidence::High);
const NESTED_LOOP_POLICY: Policy = Policy::new(Severity::Medium, Confidence::Medium);

/// Flags `s = s + ...` / `s += ...` on a string inside a loop body.
pub struct StringConcatInLoopDetector;

impl Detector for StringConcatInLoopDetector {
    fn rule(&self) -> RuleId {
        RuleId::StringConcatInLoop
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn policy(&self) -> Policy {
        CONCAT_POLICY
    }

    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
        let mut visitor = ConcatVisitor {
            tree,
            taken: tree.identifiers(),
            issues: Vec::new(),
        };
        let mut string_vars = BTreeSet::new();
        visitor.visit(tree.root(), None, &mut string_vars);
        Ok(visitor.issues)
    }
}

/// The innermost loop enclosing the statement being inspected.
#[derive(Clone, Copy)]
struct LoopContext<'t> {
    node: Node<'t>,
}

struct ConcatVisitor<'t> {
    tree: &'t SyntaxTree,
    taken: BTreeSet<String>,
    issues: Vec<Issue>,
}

/// A recognised accumulation statement.
struct Accumulation<'t> {
    statement: Node<'t>,
    variable: String,
    /// The single appended expression, when the form is simple enough to rewrite.
    appended: Option<Node<'t>>,
}

impl<'t> ConcatVisitor<'t> {
    fn visit(
        &mut self,
        node: Node<'t>,
        in_loop: Option<LoopContext<'t>>,
        string_vars: &mut BTreeSet<String>,
    ) {
        for child in children(node) {
            if is_scope_boundary(child) {
                let mut scope_vars = BTreeSet::new();
                self.visit(child, None, &mut scope_vars);
                continue;
            }

            match child.kind() {
                "for_statement" | "while_statement" => {
                    let body = child.child_by_field_name("body");
                    for part in children(child) {
                        if Some(part) == body {
                            self.visit(part, Some(LoopContext { node: child }), string_vars);
                        } else {
                            self.visit(part, in_loop, string_vars);
                        }
                    }
                }
                "assignment" | "augmented_assignment" => {
                    if let Some(ctx) = in_loop {
                        if let Some(acc) = self.match_accumulation(child, ctx, string_vars) {
                            let issue = self.build_issue(&acc, ctx);
                            self.issues.push(issue);
                        }
                    }
                    track_string_binding(child, self.tree, string_vars);
                    self.visit(child, in_loop, string_vars);
                }
                _ => self.visit(child, in_loop, string_vars),
            }
        }
    }

    fn match_accumulation(
        &self,
        node: Node<'t>,
        ctx: LoopContext<'t>,
        string_vars: &BTreeSet<String>,
    ) -> Option<Accumulation<'t>> {
        let tree = self.tree;
        let left = node.child_by_field_name("left")?;
        if left.kind() != "identifier" {
            return None;
        }
        let variable = tree.text(left).to_string();

        // Rebinding the loop variable itself is not accumulation.
        let targets = ctx
            .node
            .child_by_field_name("left")
            .map(|t| identifiers_in(t, tree))
            .unwrap_or_default();
        if targets.contains(&variable) {
            return None;
        }

        let right = node.child_by_field_name("right")?;
        let known_string = string_vars.contains(&variable)
            || node
                .child_by_field_name("type")
                .is_some_and(|t| tree.text(t) == "str");

        let appended = if node.kind() == "augmented_assignment" {
            if operator_kind(node) != Some("+=") {
                return None;
            }
            if !(known_string || is_string_like(right, tree)) {
                return None;
            }
            Some(right)
        } else {
            // Walk the left spine of `v + a + b ...` down to its first operand.
            let mut operands = Vec::new();
            let mut current = right;
            while current.kind() == "binary_operator" && operator_kind(current) == Some("+") {
                operands.push(current.child_by_field_name("right")?);
                current = current.child_by_field_name("left")?;
            }
            if operands.is_empty()
                || current.kind() != "identifier"
                || tree.text(current) != variable
            {
                return None;
            }
            if !(known_string || operands.iter().any(|op| is_string_like(*op, tree))) {
                return None;
            }
            (operands.len() == 1).then(|| operands[0])
        };

        let statement = node
            .parent()
            .filter(|p| p.kind() == "expression_statement")
            .unwrap_or(node);

        Some(Accumulation {
            statement,
            variable,
            appended,
        })
    }

    fn build_issue(&self, acc: &Accumulation<'t>, ctx: LoopContext<'t>) -> Issue {
        let tree = self.tree;
        let line = line_of(acc.statement);
        let rewrite = self.synthesize_join(acc, ctx);

        let (span, suggested_fix) = match rewrite {
            Some((span, fix)) => (span, Some(fix)),
            None => (LineSpan::new(line, end_line_of(acc.statement)), None),
        };

        Issue {
            rule: RuleId::StringConcatInLoop,
            category: Category::Performance,
            line,
            column: column_of(acc.statement),
            severity: CONCAT_POLICY.severity,
            confidence: CONCAT_POLICY.confidence,
            description: format!(
                "String `{}` is rebuilt by concatenation inside a loop",
                acc.variable
            ),
            current_snippet: tree.lines_text(span.start_line, span.end_line),
            span,
            suggested_fix,
            rationale: "Python strings are immutable, so every concatenation copies the text \
                        accumulated so far; building a string from n pieces this way is O(n^2). \
                        Collecting the pieces in a list and joining once is O(n)."
                .to_string(),
        }
    }

    /// Rewrite the whole loop as collect-then-join.
    ///
    /// Only done for a `for` loop without `else` whose body is exactly the
    /// accumulation statement, and whose appended expression does not read
    /// the accumulator.
    fn synthesize_join(
        &self,
        acc: &Accumulation<'t>,
        ctx: LoopContext<'t>,
    ) -> Option<(LineSpan, String)> {
        let tree = self.tree;
        let appended = acc.appended?;
        let lp = ctx.node;

        if lp.kind() != "for_statement" || lp.child_by_field_name("alternative").is_some() {
            return None;
        }
        let body = lp.child_by_field_name("body")?;
        let statements = block_statements(body);
        if statements.len() != 1 || statements[0] != acc.statement {
            return None;
        }
        if named_children(acc.statement).len() != 1
            && acc.statement.kind() == "expression_statement"
        {
            return None;
        }
        if identifiers_in(appended, tree).contains(&acc.variable) {
            return None;
        }

        let loop_start = line_of(lp);
        let loop_end = end_line_of(lp);
        let stmt_start = line_of(acc.statement);
        let stmt_end = end_line_of(acc.statement);
        if stmt_start <= loop_start {
            return None;
        }

        let indent = tree.indentation_of(loop_start);
        let body_indent = tree.indentation_of(stmt_start);
        if indent.len() != lp.start_position().column
            || body_indent.len() != acc.statement.start_position().column
        {
            return None;
        }

        let parts = fresh_name(&format!("_{}_parts", acc.variable), &self.taken);
        let mut fix = String::new();
        fix.push_str(&format!("{indent}{parts} = []\n"));
        fix.push_str(&tree.lines_text(loop_start, stmt_start - 1));
        fix.push('\n');
        fix.push_str(&format!("{body_indent}{parts}.append({})\n", tree.text(appended)));
        if stmt_end < loop_end {
            fix.push_str(&tree.lines_text(stmt_end + 1, loop_end));
            fix.push('\n');
        }
        fix.push_str(&format!("{indent}{} += \"\".join({parts})", acc.variable));

        Some((LineSpan::new(loop_start, loop_end), fix))
    }
}

/// Track which names currently hold a string in this scope.
fn track_string_binding(
    node: Node<'_>,
    tree: &SyntaxTree,
    string_vars: &mut BTreeSet<String>,
) {
    if node.kind() != "assignment" {
        return;
    }
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    if left.kind() != "identifier" {
        return;
    }
    let name = tree.text(left).to_string();
    if is_string_like(right, tree) {
        string_vars.insert(name);
    } else if !matches!(right.kind(), "binary_operator") {
        string_vars.remove(&name);
    }
}

/// Flags a `for` loop or comprehension clause over a collection independent
/// of an enclosing `for`.
pub struct NestedLoopDetector;

impl Detector for NestedLoopDetector {
    fn rule(&self) -> RuleId {
        RuleId::NestedLoop
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn policy(&self) -> Policy {
        NESTED_LOOP_POLICY
    }

    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError> {
        let mut issues = Vec::new();
        let mut stack = Vec::new();
        visit_loops(tree.root(), tree, &mut stack, &mut issues);
        Ok(issues)
    }
}

struct LoopFrame {
    targets: BTreeSet<String>,
    iterable: String,
}

impl LoopFrame {
    /// Frame for a `for` statement or a comprehension `for` clause.
    fn of(node: Node<'_>, tree: &SyntaxTree) -> Self {
        Self {
            targets: node
                .child_by_field_name("left")
                .map(|t| identifiers_in(t, tree))
                .unwrap_or_default(),
            iterable: node
                .child_by_field_name("right")
                .map(|i| tree.text(i))
                .unwrap_or("")
                .to_string(),
        }
    }
}

fn visit_loops(
    node: Node<'_>,
    tree: &SyntaxTree,
    stack: &mut Vec<LoopFrame>,
    issues: &mut Vec<Issue>,
) {
    for child in children(node) {
        visit_loop_node(child, tree, stack, issues);
    }
}

fn visit_loop_node(
    node: Node<'_>,
    tree: &SyntaxTree,
    stack: &mut Vec<LoopFrame>,
    issues: &mut Vec<Issue>,
) {
    if is_scope_boundary(node) {
        let mut scope_stack = Vec::new();
        visit_loops(node, tree, &mut scope_stack, issues);
        return;
    }
    match node.kind() {
        "for_statement" => {
            check_nesting(node, tree, stack, issues);
            let body = node.child_by_field_name("body");
            let mut frame = Some(LoopFrame::of(node, tree));
            for part in children(node) {
                if Some(part) == body {
                    stack.extend(frame.take());
                    visit_loop_node(part, tree, stack, issues);
                    stack.pop();
                } else {
                    visit_loop_node(part, tree, stack, issues);
                }
            }
        }
        "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
        | "generator_expression" => visit_comprehension(node, tree, stack, issues),
        _ => visit_loops(node, tree, stack, issues),
    }
}

/// Each `for` clause of a comprehension runs inside the clauses before it.
fn visit_comprehension(
    node: Node<'_>,
    tree: &SyntaxTree,
    stack: &mut Vec<LoopFrame>,
    issues: &mut Vec<Issue>,
) {
    let depth = stack.len();
    let parts = children(node);
    for clause in parts.iter().filter(|p| p.kind() == "for_in_clause") {
        if let Some(iterable) = clause.child_by_field_name("right") {
            visit_loop_node(iterable, tree, stack, issues);
        }
        check_nesting(*clause, tree, stack, issues);
        stack.push(LoopFrame::of(*clause, tree));
    }
    for part in parts.iter().filter(|p| p.kind() != "for_in_clause") {
        visit_loop_node(*part, tree, stack, issues);
    }
    stack.truncate(depth);
}

/// Report `inner` when it iterates something independent of every enclosing loop.
fn check_nesting(
    inner: Node<'_>,
    tree: &SyntaxTree,
    stack: &[LoopFrame],
    issues: &mut Vec<Issue>,
) {
    let Some(outer) = stack.last() else {
        return;
    };
    let iterable = inner.child_by_field_name("right");
    let references = iterable
        .map(|i| identifiers_in(i, tree))
        .unwrap_or_default();
    if stack
        .iter()
        .all(|frame| frame.targets.is_disjoint(&references))
    {
        let inner_iter = iterable.map(|i| tree.text(i)).unwrap_or("");
        issues.push(nested_loop_issue(inner, tree, inner_iter, &outer.iterable));
    }
}

fn nested_loop_issue(
    inner: Node<'_>,
    tree: &SyntaxTree,
    inner_iter: &str,
    outer_iter: &str,
) -> Issue {
    let line = line_of(inner);
    Issue {
        rule: RuleId::NestedLoop,
        category: Category::Performance,
        line,
        column: column_of(inner),
        severity: NESTED_LOOP_POLICY.severity,
        confidence: NESTED_LOOP_POLICY.confidence,
        description: format!(
            "Loop over `{}` nested inside loop over `{}` (possible O(n^2))",
            abbreviate(inner_iter),
            abbreviate(outer_iter)
        ),
        current_snippet: tree.line_text(line).to_string(),
        span: LineSpan::single(line),
        suggested_fix: None,
        rationale: "Iterating an independent collection inside another loop multiplies the work \
                    (O(n*m)); an index (set or dict lookup) or a precomputed inner result is \
                    usually linear. Nested loops are sometimes inherent, e.g. matrix \
                    algorithms, so this needs human review."
            .to_string(),
    }
}

fn abbreviate(text: &str) -> String {
    const MAX: usize = 40;
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX {
        single_line
    } else {
        let head: String = single_line.chars().take(MAX - 3).collect();
        format!("{head}...")
    }
}
