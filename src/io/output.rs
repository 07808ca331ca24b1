use super::report::generate_report;
use crate::core::{PlanState, RefactoringPlan, RefactoringResult};
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One analysed unit as emitted in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitOutput {
    pub plan: RefactoringPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RefactoringResult>,
}

/// Render `units` in `format`. Text reports are separated by a blank line.
pub fn render(units: &[UnitOutput], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(units
            .iter()
            .map(|unit| generate_report(&unit.plan, unit.result.as_ref()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(units)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Write rendered output to `path`, or stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)?,
        None => print!("{content}"),
    }
    Ok(())
}

/// One summary line per plan, colored by state unless `plain`.
pub fn summary_line(plan: &RefactoringPlan, plain: bool) -> String {
    let id = plan.source_id.as_deref().unwrap_or("<input>");
    let state = plan.state().to_string();
    let state = if plain {
        state
    } else {
        match plan.state() {
            PlanState::SafeToApply => state.green().bold().to_string(),
            PlanState::NeedsReview => state.yellow().bold().to_string(),
            PlanState::Refused => state.red().bold().to_string(),
        }
    };
    format!(
        "{id}: {state} ({} issue(s), complexity {})",
        plan.issues.len(),
        plan.complexity
    )
}
