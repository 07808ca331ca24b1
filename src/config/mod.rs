//! `.refactor-advisor.toml` configuration.
//!
//! Every section is optional; an absent file means all rules, text output,
//! no review override and refusals that do not fail the process.

mod loader;

pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_config, CONFIG_FILE_NAME,
    MAX_TRAVERSAL_DEPTH,
};

use crate::core::RuleId;
use crate::detectors::RuleSelection;
use crate::errors::ConfigError;
use crate::io::OutputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Rule ids are written in kebab case, e.g. `bare-except`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// When set, only these rules run.
    #[serde(default)]
    pub enabled: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Glob patterns of paths skipped during directory discovery.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Permit live execution of plans marked NEEDS REVIEW.
    #[serde(default)]
    pub allow_review: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Exit non-zero when any analysed unit is refused.
    #[serde(default)]
    pub fail_on_refusal: bool,
}

impl AdvisorConfig {
    /// Configured rules, with `rules.disabled` always applied last.
    pub fn rule_selection(&self) -> Result<RuleSelection, ConfigError> {
        let selection = match &self.rules.enabled {
            Some(enabled) => RuleSelection::only(parse_rules(enabled)?),
            None => RuleSelection::all(),
        };
        Ok(selection.without(self.disabled_rules()?))
    }

    pub fn disabled_rules(&self) -> Result<Vec<RuleId>, ConfigError> {
        parse_rules(&self.rules.disabled)
    }
}

fn parse_rules(names: &[String]) -> Result<Vec<RuleId>, ConfigError> {
    names
        .iter()
        .map(|name| {
            name.parse::<RuleId>()
                .map_err(|_| ConfigError::UnknownRule(name.clone()))
        })
        .collect()
}

/// Contents written by `refactor-advisor init`.
pub fn default_config_toml() -> String {
    let rules = RuleId::ALL
        .iter()
        .map(|rule| format!("#   \"{rule}\","))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"# refactor-advisor configuration

[rules]
# Run only these rules (all registered rules when omitted):
# enabled = [
{rules}
# ]
disabled = []

[analysis]
# Glob patterns skipped when scanning directories.
exclude = ["**/.venv/**", "**/venv/**", "**/site-packages/**"]

[execution]
# Allow `apply --live` on plans marked NEEDS REVIEW.
allow_review = false

[output]
# "text" or "json"
default_format = "text"

[policy]
# Exit with status 3 when any file is refused.
fail_on_refusal = false
"#
    )
}
