//! Append-only run history.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use crate::loadtest::model::TestResult;
use crate::storage::{file_stem, StorageError};

/// File name prefix of stored results.
const RESULT_PREFIX: &str = "result-";

/// Append-only store of completed runs.
pub trait ResultStore: Send + Sync {
    /// Appends a result.
    fn save(&self, result: &TestResult) -> Result<(), StorageError>;

    /// Returns every stored result, newest `started_at` first.
    fn find_all(&self) -> Result<Vec<TestResult>, StorageError>;

    /// Returns the stored results of one script, newest first.
    fn find_by_script_id(&self, script_id: &str) -> Result<Vec<TestResult>, StorageError> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|r| r.script_id == script_id)
            .collect())
    }
}

/// Result store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: Mutex<Vec<TestResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn save(&self, result: &TestResult) -> Result<(), StorageError> {
        self.results.lock().push(result.clone());
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<TestResult>, StorageError> {
        Ok(newest_first(self.results.lock().clone()))
    }
}

/// Result store backed by one pretty-printed JSON file per run, named
/// `result-<scriptId>-<YYYYMMDD-HHMMSS>.json`.
#[derive(Debug)]
pub struct FileResultStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileResultStore {
    /// Opens (creating if needed) a results directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Directory the store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deletes stored results whose file was last modified more than
    /// `older_than` ago. Returns the number of files removed.
    pub fn cleanup(&self, older_than: Duration) -> Result<usize, StorageError> {
        let _guard = self.lock.lock();
        let cutoff = SystemTime::now()
            .checked_sub(older_than)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let removed = prune_files(&self.result_files()?, cutoff, |path| {
            std::fs::remove_file(path)
        });

        tracing::info!(dir = %self.dir.display(), removed, "pruned stored results");
        Ok(removed)
    }

    /// File name a result is stored under.
    pub fn file_name(result: &TestResult) -> String {
        format!(
            "{RESULT_PREFIX}{}-{}.json",
            file_stem(&result.script_id),
            result.started_at.format("%Y%m%d-%H%M%S")
        )
    }

    fn result_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(RESULT_PREFIX) && n.ends_with(".json"))
            })
            .collect())
    }
}

impl ResultStore for FileResultStore {
    fn save(&self, result: &TestResult) -> Result<(), StorageError> {
        let path = self.dir.join(Self::file_name(result));
        let json = serde_json::to_string_pretty(result).map_err(|source| StorageError::Json {
            path: path.display().to_string(),
            source,
        })?;

        let _guard = self.lock.lock();
        std::fs::write(&path, json).map_err(|e| StorageError::io(&path, e))
    }

    fn find_all(&self) -> Result<Vec<TestResult>, StorageError> {
        let _guard = self.lock.lock();
        let mut results = Vec::new();
        for path in self.result_files()? {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<TestResult>(&content).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(result) => results.push(result),
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipping unreadable result file");
                },
            }
        }
        Ok(newest_first(results))
    }
}

/// Removes every file in `paths` last modified before `cutoff`. A file that
/// cannot be inspected or removed is logged and skipped. Returns the number
/// of files removed.
fn prune_files(
    paths: &[PathBuf],
    cutoff: SystemTime,
    remove: impl Fn(&Path) -> std::io::Result<()>,
) -> usize {
    let mut removed = 0;
    for path in paths {
        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping result file");
                continue;
            },
        };
        if modified >= cutoff {
            continue;
        }
        match remove(path) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove old result");
            },
        }
    }
    removed
}

fn newest_first(mut results: Vec<TestResult>) -> Vec<TestResult> {
    results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    results
}
