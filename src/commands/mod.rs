//! CLI command implementations.
//!
//! Available commands:
//! - **analyze**: build and report plans for files and directories
//! - **apply**: execute one file's plan, dry run or live
//! - **init**: write a default configuration file
//!
//! Commands return a [`Verdict`]; `main` turns it into the process exit status.

pub mod analyze;
pub mod apply;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use apply::{handle_apply, ApplyConfig};
pub use init::init_config;

use crate::config::AdvisorConfig;
use crate::core::{RefactoringPlan, RuleId};
use crate::detectors::RuleSelection;
use anyhow::{Context, Result};
use std::process::ExitCode;

/// Outcome of a command, ordered by how strongly it fails the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    Clean,
    CriticalIssues,
    Refused,
    ExecutionFailed,
}

impl Verdict {
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Clean => 0,
            Verdict::CriticalIssues => 2,
            Verdict::Refused => 3,
            Verdict::ExecutionFailed => 4,
        }
    }

    /// Verdict of one analysed plan.
    pub fn of_plan(plan: &RefactoringPlan, fail_on_refusal: bool) -> Self {
        if plan.is_refused() && fail_on_refusal {
            Verdict::Refused
        } else if plan.has_critical() {
            Verdict::CriticalIssues
        } else {
            Verdict::Clean
        }
    }
}

impl From<Verdict> for ExitCode {
    fn from(verdict: Verdict) -> Self {
        ExitCode::from(verdict.exit_code())
    }
}

/// Rule selection from config, narrowed by command-line overrides.
///
/// `only` replaces the configured enabled set. The configured disabled set
/// and `disabled` both still apply on top of it.
pub(crate) fn resolve_rules(
    config: &AdvisorConfig,
    only: Option<&[String]>,
    disabled: Option<&[String]>,
) -> Result<RuleSelection> {
    let parse = |names: &[String]| -> Result<Vec<RuleId>> {
        names
            .iter()
            .map(|name| {
                name.parse::<RuleId>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("valid rules: {}", rule_list()))
            })
            .collect()
    };

    let mut selection = match only {
        Some(names) => RuleSelection::only(parse(names)?).without(config.disabled_rules()?),
        None => config.rule_selection()?,
    };
    if let Some(names) = disabled {
        selection = selection.without(parse(names)?);
    }
    Ok(selection)
}

fn rule_list() -> String {
    RuleId::ALL
        .iter()
        .map(RuleId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
