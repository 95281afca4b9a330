//! Logging setup for the MARE CLI
//!
//! This module provides:
//! - Run ID generation and tracking
//! - Command timing
//! - Structured logging setup in compact, full or JSON format
//!
//! Log output goes to stderr so that stdout carries only command results.

use crate::config::LoggingSettings;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Global run ID for the current invocation
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable ANSI colors when stderr is a terminal
    pub console: bool,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for everyday use
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {
                config.level = "warn".to_string();
            }
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the configuration file's logging section; `-v` flags win over its level
    pub fn merge_with_file(&mut self, settings: &LoggingSettings, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &settings.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = &settings.format {
            match LogFormat::parse(format) {
                Some(format) => self.format = format,
                None => eprintln!("Invalid log format in config: {}, using default", format),
            }
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("MARE_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Invalid log format: {}, using default", format),
            }
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(&config);
    let ansi = config.console && std::io::stderr().is_terminal();

    // Each format yields a distinct subscriber type
    match config.format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .compact()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .json()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;
        }
        LogFormat::Full => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;
        }
    }

    let run_id = generate_run_id();
    RUN_ID
        .set(run_id.clone())
        .map_err(|_| Error::other("Failed to set run ID"))?;

    tracing::info!(
        run_id = %run_id,
        config = ?config,
        "Logging system initialized"
    );

    Ok(())
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Generate a unique ID for this invocation
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Get the current run ID
pub fn current_run_id() -> Option<&'static str> {
    RUN_ID.get().map(|s| s.as_str())
}

/// Logs how long a command took when dropped
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    pub fn start(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        tracing::debug!(
            command = self.command,
            run_id = current_run_id().unwrap_or("unknown"),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "Command finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LoggingConfig::from_verbosity(0).level, "warn");
        assert_eq!(LoggingConfig::from_verbosity(1).level, "info");

        let debug = LoggingConfig::from_verbosity(2);
        assert_eq!(debug.level, "debug");
        assert!(debug.source_location);

        let trace = LoggingConfig::from_verbosity(5);
        assert_eq!(trace.level, "trace");
        assert_eq!(trace.format, LogFormat::Full);
        assert!(trace.thread_ids);
    }

    #[test]
    fn test_merge_with_file() {
        let settings = LoggingSettings {
            level: Some("debug".to_string()),
            format: Some("JSON".to_string()),
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.merge_with_file(&settings, 0);
        assert_eq!(quiet.level, "debug");
        assert_eq!(quiet.format, LogFormat::Json);

        let mut verbose = LoggingConfig::from_verbosity(1);
        verbose.merge_with_file(&settings, 1);
        assert_eq!(verbose.level, "info");
    }

    #[test]
    fn test_run_id_format() {
        let id = generate_run_id();
        assert!(id.starts_with("run_"));
        assert_eq!(id.len(), 4 + 32);
        assert_ne!(id, generate_run_id());
    }

    #[test]
    fn test_timer_elapsed() {
        let timer = CommandTimer::start("list");
        assert!(timer.elapsed() < Duration::from_secs(60));
    }
}
