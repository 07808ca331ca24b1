//! Dry-run and live execution through the public API.

mod common;

use common::{apply_unified_diff, STRING_BUILDER, UNDOCUMENTED};
use indoc::indoc;
use pretty_assertions::assert_eq;
use refactor_advisor::{
    analyze, execute, validate, Engine, LineSpan, PlanState, RefactoringPlan, RuleId, SourceUnit,
};

#[test]
fn test_dry_run_lists_intended_changes_without_text() {
    let plan = analyze(UNDOCUMENTED, None);
    let result = execute(UNDOCUMENTED, &plan, true);

    assert!(result.success);
    assert_eq!(
        result.changes_applied,
        vec!["Would apply: Function `calculate` has no docstring"]
    );
    assert!(result.refactored_code.is_none());
    assert!(result.diff.is_none());
    assert_eq!(result.original_code, UNDOCUMENTED);
}

#[test]
fn test_live_join_rewrite_produces_valid_code() {
    let plan = analyze(STRING_BUILDER, Some("render.py"));
    let result = execute(STRING_BUILDER, &plan, false);

    assert!(result.success, "{:?}", result.errors);
    let refactored = result.refactored_code.as_deref().unwrap();
    assert_eq!(
        refactored,
        indoc! {r#"
            def render(items: list) -> str:
                """Render items."""
                out = ""
                _out_parts = []
                for item in items:
                    _out_parts.append(str(item))
                out += "".join(_out_parts)
                return out
        "#}
    );
    assert!(validate(refactored));

    let diff = result.diff.as_deref().unwrap();
    assert!(diff.starts_with("--- a/render.py\n+++ b/render.py\n"));
    assert_eq!(apply_unified_diff(STRING_BUILDER, diff), refactored);
}

#[test]
fn test_live_applies_multiple_fixes_in_one_pass() {
    let source = indoc! {r#"
        def first():
            try:
                return load()
            except:
                return None

        def second():
            return 2
    "#};
    let plan = analyze(source, None);
    assert_eq!(plan.state(), PlanState::SafeToApply);

    let result = execute(source, &plan, false);
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.changes_applied.len(), 3);
    assert_eq!(
        result.refactored_code.as_deref().unwrap(),
        indoc! {r#"
            def first():
                """TODO: document first."""
                try:
                    return load()
                except Exception:
                    return None

            def second():
                """TODO: document second."""
                return 2
        "#}
    );
}

#[test]
fn test_failed_validation_rolls_back_everything() {
    let mut plan = analyze(STRING_BUILDER, None);
    let concat = plan
        .issues
        .iter_mut()
        .find(|i| i.suggested_fix.is_some())
        .unwrap();
    concat.suggested_fix = Some("    for item in items\n        pass".to_string());

    let result = execute(STRING_BUILDER, &plan, false);

    assert!(!result.success);
    assert!(result.refactored_code.is_none());
    assert!(result.diff.is_none());
    assert!(result.changes_applied.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("rolled back"));
}

const THREE_FIXES: &str = indoc! {r#"
    def build(items):
        out = ""
        for item in items:
            out += str(item)
        try:
            save(out)
        except:
            pass
        return out
"#};

fn three_fix_plan() -> RefactoringPlan {
    let plan = analyze(THREE_FIXES, None);
    assert_eq!(plan.state(), PlanState::SafeToApply);
    let fixable: Vec<RuleId> = plan
        .issues
        .iter()
        .filter(|i| i.suggested_fix.is_some())
        .map(|i| i.rule)
        .collect();
    assert_eq!(
        fixable,
        vec![RuleId::StringConcatInLoop, RuleId::MissingDocstring, RuleId::BareExcept]
    );
    plan
}

#[test]
fn test_one_broken_fix_rolls_back_all_staged_fixes() {
    let intact = execute(THREE_FIXES, &three_fix_plan(), false);
    assert!(intact.success, "{:?}", intact.errors);
    assert_eq!(intact.changes_applied.len(), 3);

    let mut plan = three_fix_plan();
    let concat = plan
        .issues
        .iter_mut()
        .find(|i| i.rule == RuleId::StringConcatInLoop)
        .unwrap();
    concat.suggested_fix = Some("    for item in items\n        pass".to_string());

    let result = execute(THREE_FIXES, &plan, false);

    assert!(!result.success);
    assert!(result.refactored_code.is_none());
    assert!(result.diff.is_none());
    assert!(result.changes_applied.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("rolled back"));
    assert_eq!(result.original_code, THREE_FIXES);
}

#[test]
fn test_overlapping_fix_spans_abort_the_run() {
    let mut plan = three_fix_plan();
    let concat = plan
        .issues
        .iter_mut()
        .find(|i| i.rule == RuleId::StringConcatInLoop)
        .unwrap();
    // Stretch the loop rewrite over the `except:` line.
    concat.span = LineSpan::new(3, 7);

    let result = execute(THREE_FIXES, &plan, false);

    assert!(!result.success);
    assert!(result.refactored_code.is_none());
    assert!(result.changes_applied.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("overlapping fixes at lines 3-7 and 7-7"));
}

#[test]
fn test_refused_plan_is_terminal() {
    let source = "class Broken(\n";
    let plan = analyze(source, None);

    for dry_run in [true, false] {
        let result = execute(source, &plan, dry_run);
        assert!(!result.success);
        assert_eq!(result.errors, vec![plan.refusal_reason.clone().unwrap()]);
        assert!(result.refactored_code.is_none());
    }
}

#[test]
fn test_needs_review_blocks_live_without_override() {
    let source = indoc! {r#"
        def run(expr: str) -> object:
            return eval(expr)
    "#};
    let plan = analyze(source, None);
    assert_eq!(plan.state(), PlanState::NeedsReview);

    let blocked = execute(source, &plan, false);
    assert!(!blocked.success);
    assert!(blocked.refactored_code.is_none());

    let engine = Engine::default().with_review_override(true);
    let reviewed = engine.execute(source, &plan, false);
    assert!(reviewed.success, "{:?}", reviewed.errors);
    let refactored = reviewed.refactored_code.unwrap();
    assert!(refactored.contains("\"\"\"TODO: document run.\"\"\""));
    assert!(refactored.contains("eval(expr)"));
}

#[test]
fn test_plan_cannot_be_replayed_on_other_source() {
    let plan = analyze(UNDOCUMENTED, None);
    let other = "def other(x, y):\n    return x\n";
    let result = execute(other, &plan, false);
    assert!(!result.success);
    assert!(result.refactored_code.is_none());
}

#[test]
fn test_windows_line_endings_survive_live_run() {
    let source = "def f():\r\n    return 1\r\n";
    let engine = Engine::default();
    let plan = engine.analyze(&SourceUnit::new(source));
    let result = engine.execute(source, &plan, false);

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(
        result.refactored_code.as_deref(),
        Some("def f():\r\n    \"\"\"TODO: document f.\"\"\"\r\n    return 1\r\n")
    );
}
