//! Application services shared by the HTTP API and the CLI.
//!
//! [`ScriptService`] manages stored scripts. [`TestService`] is the run
//! orchestrator: it resolves and validates a script, drives the
//! [`LoadEngine`], and persists the result.

use std::sync::Arc;

use crate::generator::{self, GeneratorError};
use crate::loadtest::engine::LoadEngine;
use crate::loadtest::error::ValidationError;
use crate::loadtest::model::{Script, TestConfig, TestResult};
use crate::loadtest::validation::validate_script;
use crate::storage::{ResultStore, ScriptStore, StorageError};

/// Errors surfaced by the services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request failed a precondition (unknown script, empty steps).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A script could not be generated from the input.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// A store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Creates and looks up scripts.
#[derive(Clone)]
pub struct ScriptService {
    scripts: Arc<dyn ScriptStore>,
}

impl ScriptService {
    pub fn new(scripts: Arc<dyn ScriptStore>) -> Self {
        Self { scripts }
    }

    /// Generates a single-step `GET` script for `url` and stores it.
    pub fn create_from_url(&self, url: &str) -> Result<Script, ServiceError> {
        let script = generator::http::script_from_url(url)?;
        self.scripts.save(script.clone())?;
        tracing::info!(script_id = %script.id, url = %url.trim(), "created script");
        Ok(script)
    }

    pub fn get_by_id(&self, id: &str) -> Option<Script> {
        self.scripts.find_by_id(id)
    }

    /// All stored scripts, ordered by id.
    pub fn get_all(&self) -> Vec<Script> {
        self.scripts.find_all()
    }
}

/// Runs load tests and records their results.
#[derive(Clone)]
pub struct TestService {
    scripts: Arc<dyn ScriptStore>,
    results: Arc<dyn ResultStore>,
    engine: LoadEngine,
}

impl TestService {
    pub fn new(
        scripts: Arc<dyn ScriptStore>,
        results: Arc<dyn ResultStore>,
        engine: LoadEngine,
    ) -> Self {
        Self {
            scripts,
            results,
            engine,
        }
    }

    /// Runs the script named by `config.script_id` and stores the result.
    ///
    /// Fails before anything runs if the script is unknown or structurally
    /// invalid. A result that cannot be persisted is still returned.
    pub async fn run_test(&self, config: &TestConfig) -> Result<TestResult, ServiceError> {
        let Some(script) = self.scripts.find_by_id(&config.script_id) else {
            return Err(ValidationError::ScriptNotFound {
                id: config.script_id.clone(),
            }
            .into());
        };
        validate_script(&config.script_id, Some(&script))?;

        let result = self.engine.run(&script, config).await;

        if let Err(e) = self.results.save(&result) {
            tracing::warn!(test_id = %result.test_id, error = %e, "failed to save test result");
        }

        Ok(result)
    }

    /// Every stored result, newest first.
    pub fn history(&self) -> Result<Vec<TestResult>, ServiceError> {
        Ok(self.results.find_all()?)
    }

    /// Stored results of one script, newest first.
    pub fn script_history(&self, script_id: &str) -> Result<Vec<TestResult>, ServiceError> {
        Ok(self.results.find_by_script_id(script_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadtest::client::{Reply, Transport};
    use crate::loadtest::error::RequestError;
    use crate::loadtest::model::Step;
    use crate::storage::{MemoryResultStore, MemoryScriptStore};
    use async_trait::async_trait;

    struct OkTransport;

    #[async_trait]
    impl Transport for OkTransport {
        async fn send(&self, _step: &Step) -> Result<Reply, RequestError> {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            Ok(Reply::new(200))
        }
    }

    fn services() -> (ScriptService, TestService) {
        let scripts: Arc<dyn ScriptStore> = Arc::new(MemoryScriptStore::new());
        let results: Arc<dyn ResultStore> = Arc::new(MemoryResultStore::new());
        let engine = LoadEngine::new(Arc::new(OkTransport));
        (
            ScriptService::new(scripts.clone()),
            TestService::new(scripts, results, engine),
        )
    }

    #[test]
    fn test_create_from_url_stores_script() {
        let (scripts, _) = services();
        let created = scripts.create_from_url("https://example.com/").unwrap();
        assert_eq!(scripts.get_by_id(&created.id), Some(created.clone()));
        assert_eq!(scripts.get_all(), vec![created]);
    }

    #[test]
    fn test_create_from_invalid_url() {
        let (scripts, _) = services();
        let err = scripts.create_from_url("not a url").unwrap_err();
        assert!(matches!(err, ServiceError::Generator(_)));
        assert!(scripts.get_all().is_empty());
    }

    #[tokio::test]
    async fn test_run_unknown_script_rejected() {
        let (_, tests) = services();
        let err = tests
            .run_test(&TestConfig::new("missing", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::ScriptNotFound { .. })
        ));
        assert!(tests.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_script_without_steps_rejected() {
        let scripts: Arc<dyn ScriptStore> = Arc::new(MemoryScriptStore::new());
        scripts.save(Script::new("empty", vec![])).unwrap();
        let tests = TestService::new(
            scripts,
            Arc::new(MemoryResultStore::new()),
            LoadEngine::new(Arc::new(OkTransport)),
        );

        let err = tests
            .run_test(&TestConfig::new("empty", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::NoSteps)
        ));
    }

    #[tokio::test]
    async fn test_run_persists_result() {
        let (scripts, tests) = services();
        let script = scripts.create_from_url("http://localhost/").unwrap();

        let result = tests
            .run_test(&TestConfig::new(script.id.clone(), 2, 1))
            .await
            .unwrap();
        assert_eq!(result.script_id, script.id);
        assert!(result.total_requests > 0);
        assert_eq!(result.failure, 0);

        assert_eq!(tests.history().unwrap(), vec![result.clone()]);
        assert_eq!(tests.script_history(&script.id).unwrap(), vec![result]);
        assert!(tests.script_history("other").unwrap().is_empty());
    }
}
