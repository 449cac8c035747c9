//! Application settings management
//!
//! Stores configuration in a plain JSON file in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::crypto::KEY_LEN;
use crate::error::{Result, VaultError};
use crate::export::ExportFormat;

/// Built-in fixed-key secret, used only when none is configured.
///
/// It ships with the source, so stored passwords protected with it are
/// readable by anyone who has the source.
pub const DEMO_FIXED_KEY_SECRET: &str = "YourSecure32ByteEncryptionKeyStr";

/// Default prefix for export bundle file names
pub const DEFAULT_EXPORT_PREFIX: &str = "vault_export_encrypted";

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// 32-byte secret for the stored-password key
    pub fixed_key_secret: Option<String>,
    /// Prefix of export bundle file names
    pub export_file_prefix: String,
    /// Plaintext schema used inside export bundles
    pub default_export_format: ExportFormat,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: 1,
            fixed_key_secret: None,
            export_file_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            default_export_format: ExportFormat::Json,
        }
    }

    /// The configured fixed-key secret, or the built-in one with a warning
    pub fn fixed_key_secret(&self) -> &str {
        match self.fixed_key_secret.as_deref() {
            Some(secret) => secret,
            None => {
                warn!("No fixed key secret configured; using the built-in demo secret");
                DEMO_FIXED_KEY_SECRET
            }
        }
    }

    /// Check values that would otherwise fail later at first use
    pub fn validate(&self) -> Result<()> {
        if let Some(secret) = &self.fixed_key_secret {
            if secret.len() != KEY_LEN {
                return Err(VaultError::ConfigError(format!(
                    "fixedKeySecret must be exactly {} bytes, got {}",
                    KEY_LEN,
                    secret.len()
                )));
            }
        }
        if self.export_file_prefix.trim().is_empty() {
            return Err(VaultError::ConfigError(
                "exportFilePrefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `settings.json` in `storage_dir`, falling back to
    /// defaults when the file is missing or unreadable
    pub fn new(storage_dir: &Path) -> Self {
        let settings_file = storage_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings file {:?}: {}", settings_file, e);
            Settings::new()
        });

        Self {
            settings_file,
            settings,
        }
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(dir) = self.settings_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Validate, update and save settings
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save().await
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::new();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| VaultError::StorageError(e.to_string()))?;
        }

        Ok(())
    }
}
