//! `loadrig` subcommand implementations.

pub mod cleanup;
pub mod history;
pub mod k6;
pub mod run;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};

use loadrig::loadtest::model::Script;

/// Reads a script JSON file.
pub fn load_script(path: &Path) -> Result<Script> {
    if !path.exists() {
        anyhow::bail!("Script file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script '{}'", path.display()))
}
