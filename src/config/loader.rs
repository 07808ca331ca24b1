use std::fs;
use std::path::{Path, PathBuf};

use super::AdvisorConfig;
use crate::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = ".refactor-advisor.toml";

/// Directories searched for a config file, starting at the working directory.
pub const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse config contents. Unknown sections and keys are rejected.
pub fn parse_config(contents: &str) -> Result<AdvisorConfig, String> {
    toml::from_str::<AdvisorConfig>(contents).map_err(|e| e.to_string())
}

/// Load an explicitly named config file. Any failure is an error.
pub fn load_config_from(path: &Path) -> Result<AdvisorConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Try one candidate location; a missing file is not worth reporting.
fn try_load_config_from_path(config_path: &Path) -> Option<Result<AdvisorConfig, ConfigError>> {
    if !config_path.is_file() {
        return None;
    }
    Some(load_config_from(config_path))
}

/// `start` and its parents, at most `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the nearest config file above `start`. A file that exists but does
/// not parse is an error rather than a silent fallback to defaults.
pub fn load_config(start: &Path) -> Result<AdvisorConfig, ConfigError> {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            Ok(AdvisorConfig::default())
        })
}
