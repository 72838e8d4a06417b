//! Domain error types
//!
//! This module defines the error hierarchy for entity-feed. Errors are
//! domain-specific and don't expose third-party driver or SDK types.

use std::path::Path;
use thiserror::Error;

/// Main entity-feed error type
///
/// This is the primary error type used throughout the application.
/// It wraps the component-specific error types.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection establishment failed (fatal)
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Query execution failed
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// A raw record could not be transformed (fatal)
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Writing a feed artifact or manifest failed
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Uploading a file failed after retries
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Connection establishment errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// All connection attempts failed
    #[error("{engine}: all {attempts} connection attempts failed, last error: {message}")]
    Exhausted {
        engine: String,
        attempts: u32,
        message: String,
    },

    /// The connection settings could not be turned into a driver configuration
    #[error("Invalid connection settings: {0}")]
    InvalidSettings(String),
}

/// Query execution errors
///
/// Query failures are never retried; they surface to the caller immediately.
#[derive(Debug, Error)]
pub enum QueryError {
    /// `execute` was called before `connect` succeeded, or after `disconnect`
    #[error("Query executor is not connected")]
    NotConnected,

    /// No connection could be acquired from the pool
    #[error("Failed to acquire connection from pool: {0}")]
    Pool(String),

    /// The database rejected or failed the query
    #[error("Query failed: {0}")]
    Execution(String),

    /// A column type the executor cannot map to a scalar value
    #[error("Unsupported type '{type_name}' for column '{column}'")]
    UnsupportedColumnType { column: String, type_name: String },
}

/// Record transformation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// A source column the feed schema requires is absent from the row
    #[error("Missing required source field '{0}'")]
    MissingField(String),

    /// The identity column is present but NULL
    #[error("Identity field '{0}' is null")]
    NullIdentity(String),

    /// The output entry could not be represented as JSON
    #[error("Failed to build output record: {0}")]
    Serialization(String),
}

/// Feed artifact and manifest write errors
#[derive(Debug, Error)]
pub enum WriteError {
    /// Creating, compressing or flushing the file failed
    #[error("Failed to write {path}: {message}")]
    Io { path: String, message: String },

    /// The document could not be serialized to JSON
    #[error("Failed to serialize feed document: {0}")]
    Serialization(String),

    /// The blocking write task panicked or was cancelled
    #[error("Write task failed: {0}")]
    Task(String),
}

impl WriteError {
    /// Build an I/O write error for a path
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        WriteError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors reported by a single storage backend attempt
#[derive(Debug, Error)]
pub enum StorageError {
    /// Client or library level failure talking to the destination; retryable
    #[error("Storage client error: {0}")]
    Client(String),

    /// The local source file could not be opened or read; not retryable
    #[error("Cannot read source file {path}: {message}")]
    Source { path: String, message: String },
}

impl StorageError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Client(_))
    }
}

/// Upload errors surfaced after the retry policy has run
#[derive(Debug, Error)]
pub enum UploadError {
    /// Every attempt failed with a retryable error
    #[error("All {attempts} attempts to upload {path} failed, last error: {message}")]
    Exhausted {
        path: String,
        attempts: u32,
        message: String,
    },

    /// An attempt failed with an error that retrying cannot fix
    #[error("Upload of {path} failed: {message}")]
    NotRetryable { path: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FeedError {
    fn from(err: toml::de::Error) -> Self {
        FeedError::Configuration(format!("TOML parse error: {err}"))
    }
}
