//! Configuration management for Volmix
//!
//! This module provides:
//! - Application settings with TOML serialization
//! - Default locations under the platform config directory
//! - A manager that falls back to factory defaults on missing or corrupt files

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Name of the directory holding all Volmix files
pub const APP_DIR_NAME: &str = "volmix";

/// File name of the default binding file
pub const BINDINGS_FILE_NAME: &str = "volmix.conf";

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Target discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Program listing the audio graph
    pub command: String,

    /// Arguments passed to `command`
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            command: "wpctl".to_string(),
            args: vec!["status".to_string()],
        }
    }
}

/// Layer selection limits for the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Highest layer the front end lets the user select
    pub max_layer: u32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { max_layer: 99 }
    }
}

/// Complete Volmix configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolmixConfig {
    /// Binding file loaded at startup and rewritten after every change
    pub bindings_file: PathBuf,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub layers: LayerConfig,
}

impl VolmixConfig {
    /// Defaults rooted at `config_dir`
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            bindings_file: config_dir.join(BINDINGS_FILE_NAME),
            discovery: DiscoveryConfig::default(),
            layers: LayerConfig::default(),
        }
    }

    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to TOML file
    #[instrument(skip(self, path))]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving configuration");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;

        debug!("Configuration saved successfully");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.bindings_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("bindings_file must not be empty".to_string()));
        }
        if self.discovery.command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.command must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Manager for the main configuration file at `~/.config/volmix/config.toml`
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for `config_dir/config.toml`
    pub fn new(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join("config.toml");
        Self {
            config_dir,
            config_path,
        }
    }

    /// Create a manager for an explicit config file path
    pub fn with_path(config_path: PathBuf) -> Self {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            config_dir,
            config_path,
        }
    }

    /// Get the default config directory path
    ///
    /// Returns `~/.config/volmix` on Linux
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Factory defaults for this manager's directory
    pub fn factory_default(&self) -> VolmixConfig {
        VolmixConfig::with_config_dir(&self.config_dir)
    }

    /// Load configuration from file
    ///
    /// A missing file yields the factory default. A corrupt file is backed up
    /// next to the original and the factory default is returned.
    #[instrument(skip(self))]
    pub fn load(&self) -> VolmixConfig {
        if !self.config_path.exists() {
            info!(
                path = %self.config_path.display(),
                "Config file not found, using factory default"
            );
            return self.factory_default();
        }

        match VolmixConfig::load_from_file(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Failed to load config, using factory default"
                );

                let backup_path = self.config_path.with_extension("toml.corrupt");
                if let Err(copy_err) = fs::copy(&self.config_path, &backup_path) {
                    error!(
                        path = %backup_path.display(),
                        error = %copy_err,
                        "Failed to backup corrupt config"
                    );
                }

                self.factory_default()
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, config: &VolmixConfig) -> Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        config.save_to_file(&self.config_path)
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }
}
