//! Errors that abort an execution request before any process is spawned.
//!
//! Everything that happens after the spawn attempt (spawn failure, nonzero
//! exit, timeout) is reported through [`crate::execution::ExecutionOutcome`]
//! instead, so callers have a single value to persist and display.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("script not found: {0}")]
    NotFound(String),
    #[error("scratch storage failed at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("looking up script '{id}' failed: {source}")]
    Lookup {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ExecError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExecError::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn lookup(id: &str, source: anyhow::Error) -> Self {
        ExecError::Lookup {
            id: id.to_string(),
            source,
        }
    }
}
