//! Error types for the MARE core library
//!
//! This module defines the error handling system for chain construction and
//! evaluation, using thiserror for ergonomic error definitions and anyhow for
//! errors raised by host collaborators.

use crate::transform::TransformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for MARE operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete transform configuration, detected when a chain is built
    #[error("Configuration error{}: {message}", describe_step(*position, variant.as_deref()))]
    Configuration {
        message: String,
        /// Zero-based position of the offending step, when known
        position: Option<usize>,
        /// Catalog name of the offending step, when known
        variant: Option<String>,
    },

    /// A step failed while the chain was evaluated
    #[error("Transform '{variant}' at step {position} failed: {source}")]
    Transform {
        position: usize,
        variant: String,
        /// Rendering of the step's configured parameters
        parameters: String,
        #[source]
        source: TransformError,
    },

    /// Configuration text that is not valid JSON
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Flat view of the failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Transform parameters missing, mistyped or invalid
    Config,
    /// A value of an unexpected representation reached a transform
    TypeMismatch,
    /// Malformed scalar content (integer, date, base64, SID bytes)
    Format,
    /// A parameter outside its valid domain
    Range,
    /// A reserved catalog entry was invoked
    NotImplemented,
    /// The external lookup collaborator failed
    LookupFailure,
}

impl Error {
    /// Create a configuration error that is not tied to a step
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            position: None,
            variant: None,
        }
    }

    /// Create a configuration error for a specific step
    pub fn config_at(position: usize, variant: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            position: Some(position),
            variant: Some(variant.into()),
        }
    }

    /// Tag a configuration error with the chain position it was found at
    pub fn at_position(self, at: usize) -> Self {
        match self {
            Self::Configuration {
                message,
                position: None,
                variant,
            } => Self::Configuration {
                message,
                position: Some(at),
                variant,
            },
            other => other,
        }
    }

    /// The taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::Json { .. } => ErrorKind::Config,
            Self::Transform { source, .. } => source.kind(),
        }
    }

    /// Position of the step that caused the error, if the error is tied to one
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Configuration { position, .. } => *position,
            Self::Transform { position, .. } => Some(*position),
            Self::Json { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

fn describe_step(position: Option<usize>, variant: Option<&str>) -> String {
    match (position, variant) {
        (Some(position), Some(variant)) => format!(" in step {position} ({variant})"),
        (Some(position), None) => format!(" in step {position}"),
        (None, Some(variant)) => format!(" in {variant}"),
        (None, None) => String::new(),
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "ConfigError"),
            ErrorKind::TypeMismatch => write!(f, "TypeMismatch"),
            ErrorKind::Format => write!(f, "FormatError"),
            ErrorKind::Range => write!(f, "RangeError"),
            ErrorKind::NotImplemented => write!(f, "NotImplemented"),
            ErrorKind::LookupFailure => write!(f, "LookupFailure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_names_step() {
        let err = Error::config_at(2, "PadLeft", "missing parameter 'TotalWidth'");
        let text = err.to_string();
        assert!(text.contains("step 2"));
        assert!(text.contains("PadLeft"));
        assert!(text.contains("TotalWidth"));
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_untied_configuration_error() {
        let err = Error::config("chain document has no transforms");
        assert_eq!(err.to_string(), "Configuration error: chain document has no transforms");
        assert_eq!(err.position(), None);
    }

    #[test]
    fn test_transform_error_kind_is_forwarded() {
        let err = Error::Transform {
            position: 0,
            variant: "RegexSelect".to_string(),
            parameters: String::new(),
            source: TransformError::NotImplemented {
                variant: "RegexSelect".to_string(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert_eq!(err.position(), Some(0));
    }
}
