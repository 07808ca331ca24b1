use crate::io::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "refactor-advisor")]
#[command(about = "Deterministic refactoring advisor for Python source", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Configuration file (defaults to the nearest .refactor-advisor.toml)
    #[arg(long, global = true, env = "REFACTOR_ADVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze Python files and report refactoring opportunities
    Analyze {
        /// Files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run only these rules (comma-separated rule ids)
        #[arg(long, value_delimiter = ',')]
        rules: Option<Vec<String>>,

        /// Skip these rules (comma-separated rule ids)
        #[arg(long = "disable", value_delimiter = ',')]
        disabled_rules: Option<Vec<String>>,

        /// Exit with status 3 when any file is refused
        #[arg(long)]
        fail_on_refusal: bool,

        /// Disable colored summary output
        #[arg(long)]
        plain: bool,
    },

    /// Execute the refactoring plan for one file (dry run unless --live)
    Apply {
        /// File to refactor
        file: PathBuf,

        /// Produce refactored text instead of only listing intended changes
        #[arg(long)]
        live: bool,

        /// Allow live execution of plans marked NEEDS REVIEW
        #[arg(long)]
        allow_review: bool,

        /// Write the refactored text back to the file (requires --live)
        #[arg(long, requires = "live")]
        write: bool,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a default .refactor-advisor.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_write_requires_live() {
        assert!(Cli::try_parse_from(["refactor-advisor", "apply", "a.py", "--write"]).is_err());
        assert!(
            Cli::try_parse_from(["refactor-advisor", "apply", "a.py", "--live", "--write"]).is_ok()
        );
    }

    #[test]
    fn test_rules_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "refactor-advisor",
            "-vv",
            "analyze",
            "src",
            "--rules",
            "bare-except,nested-loop",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Analyze { rules, .. } => {
                assert_eq!(
                    rules,
                    Some(vec!["bare-except".to_string(), "nested-loop".to_string()])
                )
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
