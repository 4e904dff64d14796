//! Signer repository: one directory per signer under a base directory.

use std::path::{Path, PathBuf};

use signrec_protocol::signer::{Signer, SignerId};

use crate::error::StoreError;

/// CRUD over signer directories.
#[derive(Debug, Clone)]
pub struct SignerRepository {
    base_dir: PathBuf,
}

impl SignerRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the base directory if it doesn't exist.
    pub fn ensure_base_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| StoreError::from_io(&self.base_dir, e))
    }

    /// Enumerate signers, sorted by name case-insensitively.
    ///
    /// Hidden entries and plain files are skipped. A base directory that
    /// cannot be read yields an empty list.
    pub fn list(&self) -> Vec<Signer> {
        let entries = match std::fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    base_dir = %self.base_dir.display(),
                    error = %e,
                    "base directory unreadable, no signers"
                );
                return Vec::new();
            }
        };

        let mut signers: Vec<Signer> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .map(|name| Signer::from_dir_name(&name))
            .collect();

        signers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.dir_name().cmp(b.dir_name()))
        });
        signers
    }

    /// Find a signer by id.
    pub fn find(&self, id: &SignerId) -> Option<Signer> {
        self.list().into_iter().find(|s| &s.id == id)
    }

    /// Create a signer with a fresh id.
    ///
    /// The name is trimmed; an empty result is rejected.
    pub fn create(&self, name: &str) -> Result<Signer, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        self.ensure_base_dir()?;

        let signer = Signer::new(SignerId::generate(), name);
        let dir = self.signer_dir(&signer);
        std::fs::create_dir(&dir).map_err(|e| StoreError::Io {
            path: dir.clone(),
            source: e,
        })?;

        tracing::info!(
            signer_id = %signer.id,
            name = %signer.name,
            dir = %dir.display(),
            "signer created"
        );
        Ok(signer)
    }

    /// Recursively remove a signer's directory and all its recordings.
    pub fn delete(&self, signer: &Signer) -> Result<(), StoreError> {
        let dir = self.signer_dir(signer);
        std::fs::remove_dir_all(&dir).map_err(|e| StoreError::from_io(&dir, e))?;

        tracing::info!(signer_id = %signer.id, dir = %dir.display(), "signer deleted");
        Ok(())
    }

    /// Directory holding a signer's recordings.
    pub fn signer_dir(&self, signer: &Signer) -> PathBuf {
        self.base_dir.join(signer.dir_name())
    }
}
