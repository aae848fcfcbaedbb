//! Configuration loading from envscope.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::builder::validate_pattern;
use crate::error::{EnvscopeError, EnvscopeResult};

/// File name looked up at the scan root.
pub const CONFIG_FILE: &str = "envscope.toml";

/// Main configuration structure for envscope.toml.
#[derive(Debug, Deserialize, Default)]
pub struct EnvscopeConfig {
    /// Extra directory names to prune during the walk.
    pub exclude: Option<Vec<String>>,
    /// Variable names or patterns (`PREFIX*`, `*SUFFIX`) to leave out of reports.
    pub ignore: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "text" or "json".
    pub format: Option<String>,
}

/// Report formats accepted under `[output]`.
const FORMATS: &[&str] = &["text", "json"];

impl EnvscopeConfig {
    /// Checks values that parse but make no sense.
    pub fn validate(&self, path: &Path) -> EnvscopeResult<()> {
        for pattern in self.ignore.iter().flatten() {
            validate_pattern(pattern).map_err(|msg| EnvscopeError::config(path, msg))?;
        }
        if let Some(format) = self.output.as_ref().and_then(|o| o.format.as_deref()) {
            if !FORMATS.contains(&format) {
                return Err(EnvscopeError::config(
                    path,
                    format!("unknown output format '{}' (expected text or json)", format),
                ));
            }
        }
        Ok(())
    }
}

/// Loads configuration from envscope.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<EnvscopeConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg: EnvscopeConfig = toml::from_str(&content).context("Invalid envscope.toml")?;
    cfg.validate(&path)?;
    Ok(Some(cfg))
}
