//! `loadrig cleanup` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};

use loadrig::config::AppConfig;
use loadrig::storage::FileResultStore;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Execute the `cleanup` command.
pub fn execute(config: &AppConfig, older_than_days: u64) -> Result<()> {
    let store = FileResultStore::open(&config.storage.results_dir)
        .context("Failed to open result store")?;
    let removed = store.cleanup(Duration::from_secs(
        older_than_days.saturating_mul(SECS_PER_DAY),
    ))?;
    println!(
        "Removed {removed} result file(s) older than {older_than_days} day(s) from {}",
        store.dir().display()
    );
    Ok(())
}
