//! `loadrig serve` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};

use loadrig::api::{self, AppState};
use loadrig::config::AppConfig;
use loadrig::loadtest::engine::LoadEngine;
use loadrig::service::{ScriptService, TestService};
use loadrig::storage::{FileResultStore, FileScriptStore, ResultStore, ScriptStore};

/// Execute the `serve` command: open the stores, prune old results if a
/// retention window is configured, and serve the API until Ctrl-C.
pub async fn execute(config: AppConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    let scripts = FileScriptStore::open(&config.storage.scripts_dir)
        .context("Failed to open script store")?;
    let results = FileResultStore::open(&config.storage.results_dir)
        .context("Failed to open result store")?;

    if let Some(retention) = config.retention() {
        if let Err(e) = results.cleanup(retention) {
            tracing::warn!(error = %e, "failed to prune old results");
        }
    }

    let scripts: Arc<dyn ScriptStore> = Arc::new(scripts);
    let results: Arc<dyn ResultStore> = Arc::new(results);
    let engine = LoadEngine::http(config.request_timeout())
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let state = AppState {
        scripts: ScriptService::new(scripts.clone()),
        tests: TestService::new(scripts, results, engine),
    };

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!(
        addr = %bind,
        scripts_dir = %config.storage.scripts_dir.display(),
        results_dir = %config.storage.results_dir.display(),
        "loadrig API listening"
    );

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
