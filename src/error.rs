//! Error types for serial transactions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rs232c operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An unusable setting, detected before any device I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A textual setting did not match its vocabulary
    #[error("Invalid Setting({field}): {value}")]
    InvalidSetting {
        /// Human readable name of the setting
        field: &'static str,
        /// Raw value as supplied
        value: String,
    },

    /// A numeric override from the environment could not be parsed
    #[error("Invalid Setting({field}): {value} is not an integer")]
    NotAnInteger {
        /// Human readable name of the setting
        field: &'static str,
        /// Raw value as supplied
        value: String,
    },

    /// Settings file could not be read
    #[error("Cannot read settings file {path}: {source}")]
    Unreadable {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Settings file is not valid TOML or has wrongly typed keys
    #[error("Malformed settings file {path}: {source}")]
    Malformed {
        /// Path of the settings file
        path: PathBuf,
        /// Parser error
        source: toml::de::Error,
    },
}

/// Errors raised by the serial channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Port does not exist or is held by another process
    #[error("Port {port} is not available: {reason}")]
    PortUnavailable {
        /// Port identifier
        port: String,
        /// Driver message
        reason: String,
    },

    /// Driver rejected the configured parameters
    #[error("Invalid parameter for port {port}: {reason}")]
    InvalidParameter {
        /// Port identifier
        port: String,
        /// What was rejected
        reason: String,
    },

    /// Frame could not be transmitted in full
    #[error("Write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// Channel was closed before or during the operation
    #[error("Channel is closed")]
    Closed,

    /// Any other I/O error while reading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate level error.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Channel error
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Payload file could not be read
    #[error("Cannot read payload file {path}: {source}")]
    Payload {
        /// Path of the payload file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Port enumeration failed
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
}
