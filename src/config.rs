use crate::types::RewriteOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings file looked up in the base directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".lcov-relpath.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriteSettings {
    /// Write through a temp file + rename instead of truncating the report in place.
    pub atomic: bool,
    /// Use '/' in rewritten paths on every platform.
    pub normalize_separators: bool,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            atomic: true,
            normalize_separators: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rewrite: RewriteSettings,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Explicit path wins; otherwise `.lcov-relpath.yaml` in `base_dir` if present;
    /// otherwise defaults. Returns the config and the file it came from.
    pub fn discover(explicit: Option<&Path>, base_dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let candidate = base_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok((Self::load(&candidate)?, Some(candidate)));
        }
        Ok((Self::default(), None))
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            normalize_separators: self.rewrite.normalize_separators,
            atomic: self.rewrite.atomic,
        }
    }
}
