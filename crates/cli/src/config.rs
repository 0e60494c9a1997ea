//! Dashboard configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings for a dashboard session, read from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Tasks per page in `list`
    pub page_size: usize,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Email of the user the session runs as
    pub default_user: String,
    /// Load the demo tasks at startup
    pub seed_tasks: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            log_level: "info".to_string(),
            default_user: "admin@example.com".to_string(),
            seed_tasks: true,
        }
    }
}

impl DashboardConfig {
    /// Read `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if config.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        Ok(config)
    }
}
