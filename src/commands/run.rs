//! `loadrig run` command implementation.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;

use loadrig::config::AppConfig;
use loadrig::loadtest::engine::LoadEngine;
use loadrig::loadtest::model::{TestConfig, TestType};
use loadrig::loadtest::summary::render_summary;
use loadrig::loadtest::validation::validate_script;
use loadrig::storage::{FileResultStore, ResultStore};

/// Flags of `loadrig run`.
#[derive(Debug)]
pub struct RunOptions {
    pub script: PathBuf,
    pub vus: u32,
    pub duration: u64,
    pub test_type: TestType,
    pub no_save: bool,
    pub no_color: bool,
}

/// Execute the `run` command.
///
/// Loads and validates the script, runs it over HTTP, prints a k6-style
/// summary and stores the result unless `--no-save`.
pub async fn execute(config: &AppConfig, options: RunOptions) -> Result<()> {
    let script = super::load_script(&options.script)?;
    validate_script(&script.id, Some(&script))
        .map_err(|e| anyhow::anyhow!("Invalid script '{}': {}", options.script.display(), e))?;

    let test_config = TestConfig::new(script.id.clone(), options.vus, options.duration)
        .with_test_type(options.test_type);

    eprintln!(
        "Running {} with {} VUs for {}s...",
        script.id, test_config.vus, test_config.duration
    );

    let engine = LoadEngine::http(config.request_timeout())
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
    let result = engine.run(&script, &test_config).await;

    if options.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    println!("{}", render_summary(&result, &test_config, &script));

    if !options.no_save {
        let saved = FileResultStore::open(&config.storage.results_dir).and_then(|store| {
            store.save(&result)?;
            Ok(store.dir().join(FileResultStore::file_name(&result)))
        });
        match saved {
            Ok(path) => {
                eprintln!();
                eprintln!("Result written to: {}", path.display());
            },
            Err(e) => {
                // The run itself succeeded
                eprintln!();
                eprintln!("Warning: Failed to save result: {}", e);
            },
        }
    }

    Ok(())
}
