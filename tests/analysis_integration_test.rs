//! End-to-end analysis through the public API.

mod common;

use common::{STRING_BUILDER, UNDOCUMENTED};
use indoc::indoc;
use pretty_assertions::assert_eq;
use refactor_advisor::{
    analyze, Category, Complexity, Confidence, Engine, PlanState, RuleId, RuleSelection,
    Severity, SourceUnit,
};

#[test]
fn test_single_undocumented_function_scenario() {
    let plan = analyze(UNDOCUMENTED, None);

    assert_eq!(plan.issues.len(), 1);
    assert_eq!(plan.issues_in(Category::Documentation).count(), 1);
    assert_eq!(plan.issues_in(Category::Performance).count(), 0);
    assert_eq!(plan.issues_in(Category::ErrorHandling).count(), 0);
    assert_eq!(plan.complexity, Complexity::Low);
    assert!(plan.safe_to_apply);
    assert!(plan.refusal_reason.is_none());
    assert_eq!(plan.state(), PlanState::SafeToApply);
}

#[test]
fn test_string_concat_in_loop_is_reported() {
    let plan = analyze(STRING_BUILDER, Some("render.py"));

    let issue = plan
        .issues
        .iter()
        .find(|i| i.rule == RuleId::StringConcatInLoop)
        .expect("concat issue");
    assert_eq!(issue.category, Category::Performance);
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.confidence, Confidence::High);
    assert_eq!(issue.line, 5);
    assert!(issue.suggested_fix.as_deref().unwrap().contains("\"\".join(_out_parts)"));
    assert_eq!(plan.complexity, Complexity::Medium);
    assert_eq!(plan.source_id.as_deref(), Some("render.py"));
}

#[test]
fn test_syntax_error_is_refused_with_parser_message() {
    let plan = analyze("def broken(:\n    pass\n", Some("broken.py"));

    assert_eq!(plan.state(), PlanState::Refused);
    let reason = plan.refusal_reason.as_deref().unwrap();
    assert!(reason.starts_with("Code has syntax errors: "));
    assert!(reason.contains("syntax") || reason.contains("missing"));
    assert!(reason.contains("at line "));
    assert!(plan.issues.is_empty());
    assert!(!plan.safe_to_apply);
}

#[test]
fn test_dynamic_execution_needs_review() {
    let source = indoc! {r#"
        def run(expr: str) -> object:
            """Evaluate an expression."""
            return eval(expr)
    "#};
    let plan = analyze(source, None);

    assert_eq!(plan.issues.len(), 1);
    assert_eq!(plan.issues[0].confidence, Confidence::Refuse);
    assert_eq!(plan.complexity, Complexity::High);
    assert!(!plan.safe_to_apply);
    assert_eq!(plan.state(), PlanState::NeedsReview);
}

#[test]
fn test_many_issues_make_plan_high_complexity() {
    let source: String = (0..11)
        .map(|i| format!("def f{i}():\n    return {i}\n\n"))
        .collect();
    let plan = analyze(&source, None);

    assert_eq!(plan.issues.len(), 11);
    assert_eq!(plan.complexity, Complexity::High);
    assert!(!plan.safe_to_apply);
}

#[test]
fn test_issue_order_is_registration_then_position() {
    let source = indoc! {r#"
        def load(paths: list) -> dict:
            result = {}
            for a in paths:
                for b in other:
                    try:
                        result[a] = b
                    except:
                        pass
            return result

        def helper(x):
            return x
    "#};
    let plan = analyze(source, None);
    let order: Vec<(RuleId, usize)> = plan.issues.iter().map(|i| (i.rule, i.line)).collect();

    assert_eq!(
        order,
        vec![
            (RuleId::NestedLoop, 4),
            (RuleId::MissingDocstring, 1),
            (RuleId::MissingDocstring, 11),
            (RuleId::MissingTypeAnnotation, 11),
            (RuleId::BareExcept, 7),
        ]
    );
}

#[test]
fn test_analysis_is_deterministic() {
    let source = indoc! {r#"
        def a(x):
            s = ""
            for i in x:
                s += str(i)
            try:
                return s
            except:
                return None
    "#};
    let first = analyze(source, Some("a.py"));
    let second = analyze(source, Some("a.py"));
    assert_eq!(first, second);
}

#[test]
fn test_rule_subset_runs_only_selected_detectors() {
    let engine = Engine::default().with_rules(RuleSelection::only([RuleId::NestedLoop]));
    let plan = engine.analyze(&SourceUnit::new(UNDOCUMENTED));
    assert!(plan.issues.is_empty());
    assert_eq!(plan.complexity, Complexity::Low);
}

#[test]
fn test_every_issue_meets_policy_invariants() {
    let source = indoc! {r#"
        def process(rows: list) -> str:
            out = ""
            for r in rows:
                out = out + str(r)
            try:
                exec(out)
            except:
                pass
            return out

        def untyped(a):
            return a
    "#};
    let plan = analyze(source, None);
    assert!(!plan.issues.is_empty());

    for issue in &plan.issues {
        assert!(!issue.rationale.is_empty(), "{issue:?}");
        assert!(issue.span.start_line <= issue.line && issue.line <= issue.span.end_line);
        if issue.confidence == Confidence::Refuse {
            assert!(issue.suggested_fix.is_none());
        }
    }
}

#[test]
fn test_pathologically_nested_input_is_refused() {
    let source = format!("x = {}1{}\n", "(".repeat(2000), ")".repeat(2000));
    let plan = analyze(&source, None);

    assert_eq!(plan.state(), PlanState::Refused);
    assert!(plan
        .refusal_reason
        .as_deref()
        .unwrap()
        .contains("nesting deeper than"));

    let result = refactor_advisor::execute(&source, &plan, false);
    assert!(!result.success);
    assert!(result.refactored_code.is_none());
}

#[test]
fn test_bytes_accumulation_is_not_rewritten_as_str_join() {
    let source = indoc! {r#"
        def pack(chunks):
            """Pack."""
            out = b""
            for c in chunks:
                out += c
            return out
    "#};
    let plan = analyze(source, None);
    assert!(plan
        .issues
        .iter()
        .all(|i| i.rule != RuleId::StringConcatInLoop));

    let result = refactor_advisor::execute(source, &plan, false);
    assert!(result.success);
    assert_eq!(result.refactored_code.as_deref(), Some(source));
}
