//! Operator settings persistence via TOML.
//!
//! Settings are stored at `<config_dir>/signrec/settings.toml`.
//! Missing or corrupted config files return sensible defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.toml";

/// Operator-configurable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one subdirectory per signer.
    pub base_dir: PathBuf,
    /// Capturing device/user identifier written into recording names.
    pub user_id: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let base_dir = directories::ProjectDirs::from("", "", "signrec")
            .map(|d| d.data_dir().join("signers"))
            .unwrap_or_else(|| PathBuf::from("signrec-data"));

        Self {
            base_dir,
            user_id: "1".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default config path.
    ///
    /// Returns defaults if the file doesn't exist or is corrupted.
    pub fn load() -> Self {
        Self::load_from_dir(&Self::config_dir())
    }

    /// Save settings to the default config path.
    pub fn save(&self) -> Result<PathBuf> {
        self.save_to_dir(&Self::config_dir())
    }

    /// Load settings from a specific config directory.
    pub fn load_from_dir(config_dir: &Path) -> Self {
        let path = config_dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => {
                    tracing::debug!(path = %path.display(), "settings loaded");
                    settings
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "corrupted settings file, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %path.display(),
                    "settings file not found, using defaults"
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read settings file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save settings to a specific config directory.
    pub fn save_to_dir(&self, config_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let path = config_dir.join(SETTINGS_FILE);
        let contents = toml::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(&path, &contents)
            .with_context(|| format!("failed to write settings file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "settings saved");
        Ok(path)
    }

    /// Get the default config directory.
    pub fn config_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "signrec")
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("signrec-config"))
    }
}
