//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-sync\config.toml
//! - macOS: ~/Library/Application Support/music-sync/config.toml
//! - Linux: ~/.config/music-sync/config.toml
//!
//! The config supplies the library root and sync server settings. Values are
//! handed to the scanner, indexer, exporter and server explicitly; nothing
//! reads the config file behind their backs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the persisted library index inside the library root.
pub const INDEX_FILE_NAME: &str = "library.json";

/// File name of the iTunes interchange XML inside the library root.
pub const ITUNES_XML_FILE_NAME: &str = "iTunes Music Library.xml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library settings
    pub library: LibraryConfig,

    /// Sync server settings
    pub server: ServerConfig,
}

/// Library location settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory of the music collection (unset until configured)
    pub root: Option<PathBuf>,
}

/// Sync server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Address to bind; all interfaces by default
    pub bind_address: String,

    /// Seconds to let in-flight transfers finish after stop
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            bind_address: "0.0.0.0".to_string(),
            shutdown_grace_secs: 5,
        }
    }
}

/// Locations derived from a configured library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    root: PathBuf,
}

impl LibraryPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The music library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `library.json` lives.
    pub fn index_file(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Where the iTunes XML export is written.
    pub fn itunes_xml(&self) -> PathBuf {
        self.root.join(ITUNES_XML_FILE_NAME)
    }
}

impl Config {
    /// Resolve library paths, preferring an explicit override (e.g. a CLI flag).
    pub fn library_paths(&self, override_root: Option<&Path>) -> Result<LibraryPaths, ConfigError> {
        override_root
            .map(Path::to_path_buf)
            .or_else(|| self.library.root.clone())
            .map(LibraryPaths::new)
            .ok_or(ConfigError::NoLibraryRoot)
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-sync"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    load_from(&path)
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the OS config directory
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("No library root configured (run `music-sync set-library <PATH>` or pass --library)")]
    NoLibraryRoot,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
