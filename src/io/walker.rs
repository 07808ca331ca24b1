use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Collects Python sources under a set of roots, honouring `.gitignore`.
pub struct SourceWalker {
    roots: Vec<PathBuf>,
    exclude_patterns: Vec<glob::Pattern>,
}

impl SourceWalker {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            exclude_patterns: vec![],
        }
    }

    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude_patterns = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).with_context(|| format!("invalid exclude pattern '{p}'"))
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Files in root order; each directory's files sorted by path. An
    /// explicitly named file is always kept, whatever its extension.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in &self.roots {
            if root.is_file() {
                files.push(root.clone());
                continue;
            }
            if !root.exists() {
                anyhow::bail!("path does not exist: {}", root.display());
            }

            let mut found = Vec::new();
            let walker = WalkBuilder::new(root).hidden(true).git_ignore(true).build();
            for entry in walker {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && self.should_process(path) {
                    found.push(path.to_path_buf());
                }
            }
            found.sort();
            files.extend(found);
        }
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let is_python = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext));
        if !is_python {
            return false;
        }
        let path_str = path.to_string_lossy();
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&path_str))
    }
}
