//! Core error types for salat-notify-core.
//!
//! The hierarchy mirrors the failure taxonomy of the notification lifecycle:
//! render, persistence, launch and audit failures are distinct types so each
//! caller can decide whether to recover locally, retry or surface.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for salat-notify-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// History, badge or schedule-health state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A notification could not be emitted
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A platform service (job scheduler, power manager) failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the key/value store backing every persisted key.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The storage engine rejected a read or write
    #[error("Storage fault on '{key}': {message}")]
    Storage { key: String, message: String },

    /// A stored value could not be encoded or decoded
    #[error("Malformed value for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Another invocation holds the write lock past the busy timeout
    #[error("Store is locked")]
    Locked,
}

/// Failures while emitting a platform notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The channel could not be created or looked up
    #[error("Channel '{0}' is unavailable")]
    ChannelUnavailable(String),

    /// The platform notification service refused the notification
    #[error("Platform refused notification {slot}: {reason}")]
    Refused { slot: i32, reason: String },

    /// A sound or icon asset could not be resolved
    #[error("Asset '{0}' could not be loaded")]
    AssetUnavailable(String),
}

/// Failures while resuming the host application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    /// No entry point is known for the host application
    #[error("Host application entry point not found")]
    HostNotFound,

    /// The platform refused to start the host from the background
    #[error("Platform refused background launch: {0}")]
    Refused(String),
}

/// Failures while evaluating schedule staleness.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Schedule health could not be read
    #[error("Failed to read schedule health: {0}")]
    Health(#[from] PersistenceError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl CoreError {
    /// Wrap a boxed platform failure.
    pub fn platform(err: crate::platform::PlatformError) -> Self {
        CoreError::Platform(err.to_string())
    }
}

impl PersistenceError {
    pub(crate) fn storage(key: &str, err: impl std::fmt::Display) -> Self {
        PersistenceError::Storage {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn serialization(key: &str, source: serde_json::Error) -> Self {
        PersistenceError::Serialization {
            key: key.to_string(),
            source,
        }
    }

    /// Map a rusqlite failure on `key`, keeping lock contention distinct.
    pub(crate) fn from_sqlite(key: &str, err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _)
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                PersistenceError::Locked
            }
            _ => PersistenceError::storage(key, err),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
