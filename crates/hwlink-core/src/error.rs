//! Error types for the serial transport and configuration loading.
//!
//! Metric adapters have no error type: an unavailable source is an absent
//! reading, never an error.

use std::path::PathBuf;

/// Errors raised while opening or writing the serial link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The serial device could not be opened.
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        source: std::io::Error,
    },

    /// Writing a frame to the open link failed.
    #[error("failed to write to serial port: {0}")]
    Write(#[from] std::io::Error),

    /// A write was attempted while no link is open.
    #[error("serial port is not connected")]
    NotConnected,

    /// Sampling or encoding panicked during a tick.
    #[error("tick aborted: {0}")]
    TickPanicked(String),
}

/// Errors raised while loading or validating a [`crate::LinkConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
