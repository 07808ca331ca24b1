//! Deterministic refactoring advisor for Python source.
//!
//! Parses one compilation unit, runs a fixed catalog of detectors over it,
//! and assembles a [`RefactoringPlan`] with explicit severity and confidence
//! per issue. Plans can be executed as a dry run or applied live, with the
//! source re-validated before and after. Input that does not parse is
//! refused with a reason instead of being analysed.
//!
//! ```ignore
//! let plan = refactor_advisor::analyze("def f(x):\n    return x\n", Some("f.py"));
//! let result = refactor_advisor::execute("def f(x):\n    return x\n", &plan, true);
//! println!("{}", refactor_advisor::report(&plan, Some(&result)));
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod detectors;
pub mod engine;
pub mod errors;
pub mod io;
pub mod observability;
pub mod refactoring;

// Re-export commonly used types
pub use crate::core::{
    validate, Category, Complexity, Confidence, Issue, LineSpan, PlanState, RefactoringPlan,
    RefactoringResult, RuleId, Severity, SourceUnit,
};
pub use crate::detectors::{registry, Detector, RuleSelection};
pub use crate::engine::Engine;
pub use crate::errors::{ConfigError, SyntaxError};
pub use crate::io::OutputFormat;

/// Analyse `source` with every registered detector.
pub fn analyze(source: &str, source_id: Option<&str>) -> RefactoringPlan {
    let mut unit = SourceUnit::new(source);
    if let Some(id) = source_id {
        unit = unit.with_id(id);
    }
    Engine::default().analyze(&unit)
}

/// Execute `plan` against `source`. Live runs require a `SAFE TO APPLY` plan.
pub fn execute(source: &str, plan: &RefactoringPlan, dry_run: bool) -> RefactoringResult {
    Engine::default().execute(source, plan, dry_run)
}

pub fn report(plan: &RefactoringPlan, result: Option<&RefactoringResult>) -> String {
    io::generate_report(plan, result)
}

/// Unified diff with three lines of context; empty when the texts are equal.
pub fn diff(original: &str, refactored: &str) -> String {
    io::generate_diff(original, refactored)
}
