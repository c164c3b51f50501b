//! Script and result persistence.
//!
//! Both stores come in an in-memory flavor (tests, throwaway runs) and a
//! directory-of-JSON-files flavor (the CLI and the HTTP server).

pub mod results;
pub mod scripts;

pub use results::{FileResultStore, MemoryResultStore, ResultStore};
pub use scripts::{FileScriptStore, MemoryScriptStore, ScriptStore};

/// Errors raised by the file-backed stores.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or listing a path failed.
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded as JSON.
    #[error("Failed to encode '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Replaces characters that are unsafe in file names with `_`.
pub(crate) fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
