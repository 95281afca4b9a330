//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, which take precedence over both

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,

    /// Directory entries file used by `run` when `--directory` is not given
    pub directory: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration file section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".mare.yaml"), PathBuf::from(".mare.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let mare_dir = config_dir.join("mare");
            paths.push(mare_dir.join("config.yaml"));
            paths.push(mare_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".mare.yaml"));
            paths.push(home_dir.join(".mare.json"));
        }

        paths
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.format, OutputFormat::Human);
        assert!(config.output.color);
        assert!(config.logging.level.is_none());
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_yaml_config() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "output:\n  format: json-pretty\nlogging:\n  level: debug\ndirectory: people.json"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::JsonPretty);
        assert!(config.output.color);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.directory, Some(PathBuf::from("people.json")));
    }

    #[test]
    fn test_json_config() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"logging": {{"format": "json"}}}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let missing = Config::load_with_file(Some(Path::new("/nonexistent/mare.yaml")));
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));
    }
}
