use super::{resolve_rules, Verdict};
use crate::config::AdvisorConfig;
use crate::core::SourceUnit;
use crate::engine::Engine;
use crate::io::{self, output, OutputFormat, SourceWalker, UnitOutput};
use crate::observability::TracingSink;
use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct AnalyzeConfig {
    pub paths: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub rules: Option<Vec<String>>,
    pub disabled_rules: Option<Vec<String>>,
    pub fail_on_refusal: bool,
    pub plain: bool,
}

pub fn handle_analyze(cmd: AnalyzeConfig, config: &AdvisorConfig) -> Result<Verdict> {
    let selection = resolve_rules(config, cmd.rules.as_deref(), cmd.disabled_rules.as_deref())?;
    let engine = Engine::default()
        .with_rules(selection)
        .with_sink(Arc::new(TracingSink));

    let files = SourceWalker::new(cmd.paths.clone())
        .with_exclude_patterns(&config.analysis.exclude)?
        .walk()?;
    if files.is_empty() {
        tracing::warn!("No Python files found");
    }
    tracing::info!("Analyzing {} file(s)", files.len());

    // Collecting into a Vec keeps input order regardless of scheduling.
    let units = files
        .par_iter()
        .map(|path| -> Result<UnitOutput> {
            let source = io::read_file(path)?;
            let unit = SourceUnit::new(source).with_id(path.display().to_string());
            Ok(UnitOutput {
                plan: engine.analyze(&unit),
                result: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let format = cmd.format.unwrap_or(config.output.default_format);
    let rendered = output::render(&units, format)?;
    io::write_output(&rendered, cmd.output.as_deref())?;

    if format == OutputFormat::Text || cmd.output.is_some() {
        for unit in &units {
            eprintln!("{}", output::summary_line(&unit.plan, cmd.plain));
        }
    }

    let fail_on_refusal = cmd.fail_on_refusal || config.policy.fail_on_refusal;
    Ok(units
        .iter()
        .map(|unit| Verdict::of_plan(&unit.plan, fail_on_refusal))
        .max()
        .unwrap_or(Verdict::Clean))
}
