//! Keyed script storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::loadtest::model::Script;
use crate::storage::{file_stem, StorageError};

/// Keyed store of scripts.
pub trait ScriptStore: Send + Sync {
    /// Inserts or replaces a script by id.
    fn save(&self, script: Script) -> Result<(), StorageError>;

    /// Looks up a script by id.
    fn find_by_id(&self, id: &str) -> Option<Script>;

    /// Returns every script, ordered by id.
    fn find_all(&self) -> Vec<Script>;
}

/// Script store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryScriptStore {
    data: RwLock<HashMap<String, Script>>,
}

impl MemoryScriptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptStore for MemoryScriptStore {
    fn save(&self, script: Script) -> Result<(), StorageError> {
        self.data.write().insert(script.id.clone(), script);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Option<Script> {
        self.data.read().get(id).cloned()
    }

    fn find_all(&self) -> Vec<Script> {
        sorted_by_id(self.data.read().values().cloned().collect())
    }
}

/// Script store backed by one pretty-printed `<id>.json` file per script.
///
/// All scripts are loaded into memory when the store is opened; writes go to
/// memory and disk.
#[derive(Debug)]
pub struct FileScriptStore {
    dir: PathBuf,
    data: RwLock<HashMap<String, Script>>,
}

impl FileScriptStore {
    /// Opens (creating if needed) a script directory and loads its contents.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let mut data = HashMap::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| StorageError::io(&dir, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_script(&path) {
                Ok(script) => {
                    data.insert(script.id.clone(), script);
                },
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipping unreadable script file");
                },
            }
        }

        tracing::debug!(dir = %dir.display(), scripts = data.len(), "loaded script store");

        Ok(Self {
            dir,
            data: RwLock::new(data),
        })
    }

    /// Directory the store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(id)))
    }
}

impl ScriptStore for FileScriptStore {
    fn save(&self, script: Script) -> Result<(), StorageError> {
        let path = self.path_for(&script.id);
        let json = serde_json::to_string_pretty(&script).map_err(|source| StorageError::Json {
            path: path.display().to_string(),
            source,
        })?;

        let mut data = self.data.write();
        std::fs::write(&path, json).map_err(|e| StorageError::io(&path, e))?;
        data.insert(script.id.clone(), script);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Option<Script> {
        self.data.read().get(id).cloned()
    }

    fn find_all(&self) -> Vec<Script> {
        sorted_by_id(self.data.read().values().cloned().collect())
    }
}

fn read_script(path: &Path) -> Result<Script, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

fn sorted_by_id(mut scripts: Vec<Script>) -> Vec<Script> {
    scripts.sort_by(|a, b| a.id.cmp(&b.id));
    scripts
}
