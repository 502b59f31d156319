//! TOML run configuration for the command line harnesses.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fogpath::RunConfig;

/// Reads a [`RunConfig`] from a TOML file. Missing keys keep their defaults.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_run_config(&text).with_context(|| format!("Invalid config file: {}", path.display()))
}

pub fn parse_run_config(text: &str) -> Result<RunConfig> {
    toml::from_str(text).context("Failed to parse run config TOML")
}
