//! TOML parameter files.
//!
//! The axis table, the IO table and the optional system settings all live
//! as TOML in one configuration directory. [`ConfigLoader`] reads any serde
//! type from a file and [`ConfigSaver`] writes one back after a parameter
//! edit. [`SharedConfig`] is the `[shared]` section every host carries.
//!
//! # Usage
//!
//! ```rust,no_run
//! use stage_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     #[serde(default)]
//!     shared: SharedConfig,
//! }
//!
//! fn level(dir: &Path) -> Result<&'static str, ConfigError> {
//!     let settings = Settings::load(&dir.join("motion.toml"))?;
//!     settings.shared.validate()?;
//!     Ok(settings.shared.log_level.as_str())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure reading, parsing, validating or writing a parameter file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at this path.
    #[error("Parameter file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unreadable file or malformed TOML.
    #[error("Cannot parse parameter file: {0}")]
    ParseError(String),

    /// Well-formed but rejected by a `validate` method.
    #[error("Invalid parameters: {0}")]
    ValidationError(String),

    /// Serializing or writing the file failed.
    #[error("Cannot write parameter file: {0}")]
    WriteError(String),
}

/// Verbosity of the `tracing` subscriber, lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every poll iteration.
    Trace,
    /// Per-command detail.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Limit hits, timeouts, ignored writes.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// `[shared]` section: log level and instance name.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "dispenser-stage"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Log verbosity.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance name shown in log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "stage".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Reject an empty `service_name`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name is empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("{}: {}", path.display(), e)),
    })
}

/// Read a serde type from a TOML file.
///
/// A missing file is `FileNotFound`; any other read error and malformed
/// TOML are `ParseError`. No semantic validation happens here.
pub trait ConfigLoader: Sized + DeserializeOwned {
    /// Parse the file at `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_file(path)?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }
}

impl<T: DeserializeOwned> ConfigLoader for T {}

/// Write a serde type to a TOML file.
pub trait ConfigSaver: Serialize {
    /// Serialize to pretty TOML and replace the file at `path`.
    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| ConfigError::WriteError(format!("{}: {}", path.display(), e)))
    }
}

impl<T: Serialize> ConfigSaver for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Host {
        #[serde(default)]
        shared: SharedConfig,
        card_count: u16,
    }

    #[test]
    fn level_names_match_filter_directives() {
        #[derive(Deserialize)]
        struct Level {
            level: LogLevel,
        }

        assert_eq!(LogLevel::default(), LogLevel::Info);
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            let text = format!("level = \"{}\"", level.as_str());
            let parsed: Level = toml::from_str(&text).unwrap();
            assert_eq!(parsed.level, level);
        }
        assert!(toml::from_str::<Level>("level = \"INFO\"").is_err());
    }

    #[test]
    fn blank_service_name_rejected() {
        let shared = SharedConfig {
            service_name: "  ".to_string(),
            ..SharedConfig::default()
        };
        assert!(matches!(shared.validate(), Err(ConfigError::ValidationError(_))));
        assert!(SharedConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_file_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axis.toml");
        match Host::load(&path) {
            Err(ConfigError::FileNotFound(missing)) => assert_eq!(missing, path),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motion.toml");
        fs::write(&path, "card_count = [1,").unwrap();
        assert!(matches!(Host::load(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        let host = Host {
            shared: SharedConfig {
                log_level: LogLevel::Warn,
                service_name: "bench".to_string(),
            },
            card_count: 2,
        };
        host.save(&path).unwrap();

        let loaded = Host::load(&path).unwrap();
        assert_eq!(loaded.card_count, 2);
        assert_eq!(loaded.shared.log_level, LogLevel::Warn);
        assert_eq!(loaded.shared.service_name, "bench");
    }

    #[test]
    fn shared_section_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        fs::write(&path, "card_count = 1\n").unwrap();
        let loaded = Host::load(&path).unwrap();
        assert_eq!(loaded.shared.service_name, "stage");
    }

    #[test]
    fn unwritable_path_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("shared.toml");
        assert!(matches!(
            SharedConfig::default().save(&path),
            Err(ConfigError::WriteError(_))
        ));
    }
}
