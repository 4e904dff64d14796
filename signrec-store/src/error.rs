//! Errors surfaced by the signer repository and recording store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from signer and recording storage.
///
/// Every variant is recoverable: callers report it and may retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("signer name is empty")]
    EmptyName,

    #[error("invalid recording file name: {0:?}")]
    InvalidFileName(String),

    /// Some files in a bulk delete could not be removed; the rest were.
    #[error("removed {removed} recordings but failed to remove {}", .failures.len())]
    PartialDelete {
        removed: usize,
        failures: Vec<(PathBuf, io::Error)>,
    },
}

impl StoreError {
    /// Map an I/O error at `path`, keeping absence distinct from failure.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path)
        } else {
            StoreError::Io { path, source }
        }
    }
}
