pub mod diff;
pub mod output;
pub mod report;
pub mod walker;

pub use diff::{generate_diff, generate_diff_with_labels};
pub use output::{render, write_output, OutputFormat, UnitOutput};
pub use report::generate_report;
pub use walker::SourceWalker;

use anyhow::{Context, Result};
use std::path::Path;

pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
