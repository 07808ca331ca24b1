use anyhow::Result;
use clap::Parser;
use refactor_advisor::cli::{Cli, Commands};
use refactor_advisor::commands::{self, AnalyzeConfig, ApplyConfig, Verdict};
use refactor_advisor::config::{self, AdvisorConfig};
use refactor_advisor::observability::init_tracing;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match run(cli) {
        Ok(verdict) => verdict.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<Verdict> {
    match cli.command {
        Commands::Init { force } => {
            let path = commands::init_config(&std::env::current_dir()?, force)?;
            println!("Created {} configuration file", path.display());
            Ok(Verdict::Clean)
        }
        Commands::Analyze {
            paths,
            format,
            output,
            rules,
            disabled_rules,
            fail_on_refusal,
            plain,
        } => {
            let config = load_config(cli.config.as_deref())?;
            commands::handle_analyze(
                AnalyzeConfig {
                    paths,
                    format,
                    output,
                    rules,
                    disabled_rules,
                    fail_on_refusal,
                    plain,
                },
                &config,
            )
        }
        Commands::Apply {
            file,
            live,
            allow_review,
            write,
            format,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            commands::handle_apply(
                ApplyConfig {
                    file,
                    live,
                    allow_review,
                    write,
                    format,
                    output,
                },
                &config,
            )
        }
    }
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<AdvisorConfig> {
    Ok(match explicit {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(&std::env::current_dir()?)?,
    })
}
