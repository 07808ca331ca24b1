use super::{resolve_rules, Verdict};
use crate::config::AdvisorConfig;
use crate::core::SourceUnit;
use crate::engine::Engine;
use crate::io::{self, output, OutputFormat, UnitOutput};
use crate::observability::TracingSink;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ApplyConfig {
    pub file: PathBuf,
    pub live: bool,
    pub allow_review: bool,
    pub write: bool,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

pub fn handle_apply(cmd: ApplyConfig, config: &AdvisorConfig) -> Result<Verdict> {
    let selection = resolve_rules(config, None, None)?;
    let engine = Engine::default()
        .with_rules(selection)
        .with_sink(Arc::new(TracingSink))
        .with_review_override(cmd.allow_review || config.execution.allow_review);

    let source = io::read_file(&cmd.file)?;
    let unit = SourceUnit::new(source.as_str()).with_id(cmd.file.display().to_string());
    let plan = engine.analyze(&unit);
    let result = engine.execute(&source, &plan, !cmd.live);

    if cmd.write {
        match result.refactored_code.as_deref() {
            Some(refactored) if result.success && refactored != source => {
                io::write_file(&cmd.file, refactored)?;
                tracing::info!("Wrote refactored code to {}", cmd.file.display());
            }
            _ => tracing::info!("Nothing written to {}", cmd.file.display()),
        }
    }

    let format = cmd.format.unwrap_or(config.output.default_format);
    let mut rendered = output::render(
        &[UnitOutput {
            plan: plan.clone(),
            result: Some(result.clone()),
        }],
        format,
    )?;
    if format == OutputFormat::Text {
        if let Some(diff) = &result.diff {
            rendered.push('\n');
            rendered.push_str(diff);
        }
    }
    io::write_output(&rendered, cmd.output.as_deref())?;

    if cmd.live && !result.success {
        return Ok(Verdict::ExecutionFailed);
    }
    Ok(Verdict::of_plan(&plan, config.policy.fail_on_refusal))
}
