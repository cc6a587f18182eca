//! Error types for IdlePipe
//!
//! This module defines all error types used throughout the crate,
//! providing detailed error information for diagnostics and exit handling.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which end of the pipe an I/O fault came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Reading from the source
    Read,
    /// Writing (or flushing) to the sink
    Write,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Read => f.write_str("read"),
            Side::Write => f.write_str("write"),
        }
    }
}

/// Main error type for IdlePipe operations
#[derive(Error, Debug)]
pub enum IdlePipeError {
    /// Idle timeout must be a positive duration
    #[error("Invalid idle timeout: must be greater than zero")]
    InvalidTimeout,

    /// Buffer size must be a positive byte count
    #[error("Invalid buffer size: must be greater than zero")]
    InvalidBufferSize,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A background activity could not be started
    #[error("Failed to spawn {what} thread: {source}")]
    Spawn {
        /// Which activity failed to start
        what: &'static str,
        /// Error from the thread builder
        #[source]
        source: std::io::Error,
    },

    /// The source or sink reported an I/O fault
    #[error("Transfer error on {side}: {source}")]
    Transfer {
        /// Which end failed
        side: Side,
        /// The underlying fault
        #[source]
        source: std::io::Error,
    },

    /// No data moved for the configured idle interval
    #[error("Timed out after {} without activity", format_idle(.0))]
    Timeout(Duration),

    /// The follow-up command could not be launched
    #[error("Failed to launch '{command}': {source}")]
    Command {
        /// The command line as given
        command: String,
        /// Error from process creation
        #[source]
        source: std::io::Error,
    },
}

impl IdlePipeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a thread spawn error
    pub fn spawn(what: &'static str, source: std::io::Error) -> Self {
        Self::Spawn { what, source }
    }

    /// Create a follow-up command error
    pub fn command(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Command {
            command: command.into(),
            source,
        }
    }

    /// Check if this error was raised while validating configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimeout | Self::InvalidBufferSize | Self::ConfigError(_)
        )
    }

    /// Check if this error describes a stalled pipe
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

fn format_idle(idle: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*idle)
}

/// Result type alias for IdlePipe operations
pub type Result<T> = std::result::Result<T, IdlePipeError>;
