//! TOML-based configuration for the monitor.
//!
//! Reads `MonitorConfig` from an explicit path or from the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\UnifyingMonitor\unifying-monitor.toml`
//! - Linux:    `~/.config/unifying-monitor/unifying-monitor.toml`
//! - macOS:    `~/Library/Application Support/UnifyingMonitor/unifying-monitor.toml`
//!
//! Example:
//!
//! ```toml
//! [monitor]
//! log_level = "debug"
//! auto_register = true
//!
//! [registry]
//! max_devices = 40
//! max_prefixes = 8
//!
//! [injection]
//! keystroke_delay_ms = 8
//! release_keys = true
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "...")]`, so a missing file, an
//! empty file and a file with only some sections all load.  Device
//! knowledge itself is never written here: the registry is rebuilt from
//! traffic on every run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unifying_core::domain::registry::{DEFAULT_MAX_DEVICES, DEFAULT_MAX_PREFIXES};
use unifying_core::RegistryLimits;

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "unifying-monitor.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub injection: InjectionSection,
}

/// General behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSection {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Create registry entries for frames from unknown addresses.  When
    /// `false` only provisioned addresses are tracked.
    #[serde(default = "default_true")]
    pub auto_register: bool,
}

/// Device registry capacity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrySection {
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,
    #[serde(default = "default_max_prefixes")]
    pub max_prefixes: usize,
}

/// Keystroke injection timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectionSection {
    /// Pause between two transmitted keyboard frames.
    #[serde(default = "default_keystroke_delay_ms")]
    pub keystroke_delay_ms: u64,
    /// Follow every key press with an all-keys-released report.
    #[serde(default = "default_true")]
    pub release_keys: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_devices() -> usize {
    DEFAULT_MAX_DEVICES
}
fn default_max_prefixes() -> usize {
    DEFAULT_MAX_PREFIXES
}
fn default_keystroke_delay_ms() -> u64 {
    8
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            auto_register: default_true(),
        }
    }
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            max_devices: default_max_devices(),
            max_prefixes: default_max_prefixes(),
        }
    }
}

impl Default for InjectionSection {
    fn default() -> Self {
        Self {
            keystroke_delay_ms: default_keystroke_delay_ms(),
            release_keys: default_true(),
        }
    }
}

impl RegistrySection {
    /// Converts the section into registry limits.
    pub fn limits(&self) -> RegistryLimits {
        RegistryLimits {
            max_devices: self.max_devices,
            max_prefixes: self.max_prefixes,
        }
    }
}

impl MonitorConfig {
    /// Checks value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero-sized registry limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.max_devices == 0 {
            return Err(ConfigError::Invalid {
                field: "registry.max_devices",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.registry.max_prefixes == 0 {
            return Err(ConfigError::Invalid {
                field: "registry.max_prefixes",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the config from `path`, or from the default location when `path`
/// is `None`.  A missing file yields `MonitorConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    load_config_from(&path)
}

/// Loads the config from exactly `path`.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<MonitorConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => MonitorConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &MonitorConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("UnifyingMonitor"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("unifying-monitor"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("UnifyingMonitor")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
