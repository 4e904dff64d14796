//! Recording store: queries and bulk deletes over a signer's capture files.
//!
//! Nothing is cached; every call re-reads the signer directory. Files that
//! fail [`Meta::decode`] are left alone and never appear in results.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use signrec_protocol::recording::{is_recording_file, Meta};
use signrec_protocol::signer::Signer;

use crate::error::StoreError;

/// One decodable capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFile {
    pub file_name: String,
    pub path: PathBuf,
    pub meta: Meta,
}

/// All files for one gesture, sorted by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureGroup {
    pub gesture: String,
    pub files: Vec<RecordingFile>,
}

impl GestureGroup {
    pub fn count(&self) -> usize {
        self.files.len()
    }
}

/// Reads and mutates recording files inside signer directories.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    base_dir: PathBuf,
}

impl RecordingStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding a signer's recordings.
    pub fn signer_dir(&self, signer: &Signer) -> PathBuf {
        self.base_dir.join(signer.dir_name())
    }

    /// Every decodable recording of a signer, sorted by filename.
    pub fn list_recordings(&self, signer: &Signer) -> Result<Vec<RecordingFile>, StoreError> {
        let dir = self.signer_dir(signer);
        let entries = std::fs::read_dir(&dir).map_err(|e| StoreError::from_io(&dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::from_io(&dir, e))?;
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_recording_file(&file_name) {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                tracing::trace!(file_name = %file_name, "skipping non-file entry");
                continue;
            }
            match Meta::decode(&file_name) {
                Some(meta) => files.push(RecordingFile {
                    path: entry.path(),
                    file_name,
                    meta,
                }),
                None => {
                    tracing::trace!(file_name = %file_name, "skipping malformed recording name");
                }
            }
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    /// Distinct session tokens among a signer's recordings.
    pub fn list_sessions(&self, signer: &Signer) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .list_recordings(signer)?
            .into_iter()
            .map(|f| f.meta.session)
            .collect())
    }

    /// Recordings grouped by gesture, optionally restricted to one session.
    ///
    /// Groups are ordered by gesture id case-insensitively.
    pub fn list_gesture_groups(
        &self,
        signer: &Signer,
        session: Option<&str>,
    ) -> Result<Vec<GestureGroup>, StoreError> {
        let mut by_gesture: BTreeMap<String, Vec<RecordingFile>> = BTreeMap::new();
        for file in self.list_recordings(signer)? {
            if session.is_some_and(|s| s != file.meta.session) {
                continue;
            }
            by_gesture
                .entry(file.meta.gesture.clone())
                .or_default()
                .push(file);
        }

        let mut groups: Vec<GestureGroup> = by_gesture
            .into_iter()
            .map(|(gesture, files)| GestureGroup { gesture, files })
            .collect();
        groups.sort_by(|a, b| {
            a.gesture
                .to_lowercase()
                .cmp(&b.gesture.to_lowercase())
                .then_with(|| a.gesture.cmp(&b.gesture))
        });
        Ok(groups)
    }

    /// Remove every recording of one session.
    pub fn delete_session(&self, signer: &Signer, session: &str) -> Result<usize, StoreError> {
        let removed = self.delete_matching(signer, |meta| meta.session == session)?;
        tracing::info!(signer_id = %signer.id, session, removed, "session deleted");
        Ok(removed)
    }

    /// Remove every recording of one gesture across all sessions.
    pub fn delete_gesture_all_sessions(
        &self,
        signer: &Signer,
        gesture: &str,
    ) -> Result<usize, StoreError> {
        let removed = self.delete_matching(signer, |meta| meta.gesture == gesture)?;
        tracing::info!(signer_id = %signer.id, gesture, removed, "gesture deleted in all sessions");
        Ok(removed)
    }

    /// Remove the recordings of one gesture within one session.
    pub fn delete_gesture_in_session(
        &self,
        signer: &Signer,
        gesture: &str,
        session: &str,
    ) -> Result<usize, StoreError> {
        let removed = self.delete_matching(signer, |meta| {
            meta.gesture == gesture && meta.session == session
        })?;
        tracing::info!(
            signer_id = %signer.id,
            gesture,
            session,
            removed,
            "gesture deleted in session"
        );
        Ok(removed)
    }

    /// Atomically write a payload under the given filename.
    ///
    /// The name is used verbatim and an existing file is replaced. The payload
    /// goes to a temporary file in the same directory first, so a partial
    /// write is never visible under the final name.
    pub fn save(
        &self,
        bytes: &[u8],
        file_name: &str,
        signer: &Signer,
    ) -> Result<PathBuf, StoreError> {
        validate_file_name(file_name)?;

        let dir = self.signer_dir(signer);
        let dest = dir.join(file_name);

        let mut tmp = tempfile::Builder::new()
            .prefix(".incoming-")
            .tempfile_in(&dir)
            .map_err(|e| StoreError::from_io(&dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::Io {
                path: tmp.path().to_path_buf(),
                source: e,
            })?;
        tmp.persist(&dest).map_err(|e| StoreError::Io {
            path: dest.clone(),
            source: e.error,
        })?;

        tracing::info!(
            signer_id = %signer.id,
            file_name,
            size = bytes.len(),
            "recording saved"
        );
        Ok(dest)
    }

    /// Remove every decodable recording whose metadata matches.
    ///
    /// Keeps going past individual failures and reports them together.
    fn delete_matching(
        &self,
        signer: &Signer,
        matches: impl Fn(&Meta) -> bool,
    ) -> Result<usize, StoreError> {
        let mut removed = 0;
        let mut failures = Vec::new();

        for file in self.list_recordings(signer)? {
            if !matches(&file.meta) {
                continue;
            }
            match std::fs::remove_file(&file.path) {
                Ok(()) => {
                    tracing::trace!(file_name = %file.file_name, "recording removed");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %file.path.display(),
                        error = %e,
                        "failed to remove recording"
                    );
                    failures.push((file.path, e));
                }
            }
        }

        if failures.is_empty() {
            Ok(removed)
        } else {
            Err(StoreError::PartialDelete { removed, failures })
        }
    }
}

/// Reject names that are not a single plain path segment.
fn validate_file_name(file_name: &str) -> Result<(), StoreError> {
    let single_segment = Path::new(file_name)
        .file_name()
        .is_some_and(|name| name == file_name);
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || !single_segment
    {
        return Err(StoreError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}
