//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Issues with the configuration file
//! - CommandError: External command spawn or non-zero exit failures
//! - ParseError: Schema mismatches in external tool output
//! - AppError: Top-level aggregate, including IO failures with path context

use std::path::PathBuf;
use thiserror::Error;

/// Exit code reported by the `timeout` utility when the deadline expires
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// External command related errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// External tool output parsing errors
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// IO error with path context
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read configuration file
    #[error("failed to read configuration file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing or type validation error
    #[error("failed to parse configuration file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors related to external command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command could not be started at all
    #[error("failed to start command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited with a non-zero status
    #[error("command `{command}` failed: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Errors raised when external tool output does not match its schema
#[derive(Error, Debug)]
pub enum ParseError {
    /// Output did not match the expected shape
    #[error("unexpected {context} output: {message}")]
    Schema { context: String, message: String },
}

impl AppError {
    /// Creates an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ConfigError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ConfigError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl CommandError {
    /// True when the failure is the bounded-timeout wrapper expiring
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            CommandError::Failed {
                code: Some(TIMEOUT_EXIT_CODE),
                ..
            }
        )
    }

    /// The captured stderr, when the command ran at all
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } => Some(stderr),
            CommandError::Spawn { .. } => None,
        }
    }
}

impl ParseError {
    /// Creates a new Schema error
    pub fn schema(context: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::Schema {
            context: context.into(),
            message: message.into(),
        }
    }
}
