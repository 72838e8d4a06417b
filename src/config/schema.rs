//! Configuration schema types
//!
//! This module defines the configuration structure for entity-feed. Every
//! section maps to a TOML table; selector keys (database engine, storage
//! backend, feed type) are checked here so that an unknown key fails at
//! startup rather than in the middle of a run.

use crate::config::SecretString;
use crate::core::retry::RetryPolicy;
use crate::domain::{FeedError, FeedType};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Database engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    /// PostgreSQL
    #[serde(alias = "postgresql")]
    Postgres,
    /// MySQL / MariaDB
    Mysql,
}

impl DatabaseEngine {
    /// Configuration key of the engine
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "postgres",
            DatabaseEngine::Mysql => "mysql",
        }
    }

    /// Port used when the configuration does not name one
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseEngine::Postgres => 5432,
            DatabaseEngine::Mysql => 3306,
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseEngine {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            _ => Err(FeedError::Configuration(format!(
                "Unsupported DB engine: '{s}'. Expected one of: postgres, mysql"
            ))),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Amazon S3 or an S3-compatible object store
    S3,
    /// Copy into a local directory
    Local,
}

impl StorageBackendKind {
    /// Configuration key of the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackendKind::S3 => "s3",
            StorageBackendKind::Local => "local",
        }
    }
}

impl fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackendKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            _ => Err(FeedError::Configuration(format!(
                "Unsupported storage backend: '{s}'. Expected one of: s3, local"
            ))),
        }
    }
}

/// Root configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source database
    pub database: DatabaseConfig,

    /// Feed generation settings
    #[serde(default)]
    pub feed: FeedSettings,

    /// Artifact upload destination
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FeedConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.database.validate()?;
        self.feed.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Source database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database engine
    #[serde(default = "default_engine")]
    pub engine: DatabaseEngine,

    /// Server host name or address
    pub host: String,

    /// Server port; the engine default when omitted
    #[serde(default)]
    pub port: Option<u16>,

    /// User name
    pub user: String,

    /// Password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Database name
    pub database: String,

    /// Connections opened when the pool is created
    #[serde(default = "default_pool_min_size")]
    pub pool_min_size: usize,

    /// Upper bound of the connection pool
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: usize,

    /// Connection attempts before giving up
    #[serde(default = "default_retries")]
    pub connect_retries: u32,

    /// Delay before the second connection attempt, doubled after each failure
    #[serde(default = "default_initial_delay_ms")]
    pub connect_initial_delay_ms: u64,

    /// Timeout for acquiring or creating one connection
    #[serde(default = "default_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("database.host cannot be empty".to_string());
        }

        if self.user.is_empty() {
            return Err("database.user cannot be empty".to_string());
        }

        if self.database.is_empty() {
            return Err("database.database cannot be empty".to_string());
        }

        if self.port == Some(0) {
            return Err("database.port must be > 0".to_string());
        }

        if self.pool_min_size == 0 || self.pool_max_size > 100 {
            return Err(format!(
                "database pool bounds must satisfy 1 <= pool_min_size <= pool_max_size <= 100, got {}..{}",
                self.pool_min_size, self.pool_max_size
            ));
        }

        if self.pool_min_size > self.pool_max_size {
            return Err(format!(
                "database.pool_min_size ({}) cannot exceed database.pool_max_size ({})",
                self.pool_min_size, self.pool_max_size
            ));
        }

        validate_retries("database.connect_retries", self.connect_retries)?;

        if self.connection_timeout_seconds == 0 {
            return Err("database.connection_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }

    /// Port to connect to
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    /// Connection retry policy
    pub fn connect_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.connect_retries,
            Duration::from_millis(self.connect_initial_delay_ms),
        )
    }

    /// Connection timeout
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }

    /// Connection description safe for logs (no password)
    pub fn describe(&self) -> String {
        format!(
            "{}://{}@{}:{}/{}",
            self.engine,
            self.user,
            self.host,
            self.effective_port(),
            self.database
        )
    }

    /// Whether a password was configured
    pub fn has_password(&self) -> bool {
        !self.password.expose_secret().is_empty()
    }
}

/// Feed generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Feed type key (e.g., "facility")
    #[serde(default = "default_feed_type")]
    pub feed_type: String,

    /// Feed name written to the manifest
    #[serde(default = "default_feed_name")]
    pub name: String,

    /// Rows per chunk (one artifact per chunk)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Directory artifacts and the manifest are written to before upload
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl FeedSettings {
    fn validate(&self) -> Result<(), String> {
        self.feed_type().map_err(|e| e.to_string())?;

        if self.name.trim().is_empty() {
            return Err("feed.name cannot be empty".to_string());
        }

        if !(1..=100_000).contains(&self.chunk_size) {
            return Err(format!(
                "feed.chunk_size must be between 1 and 100000, got {}",
                self.chunk_size
            ));
        }

        if self.output_dir.is_empty() {
            return Err("feed.output_dir cannot be empty".to_string());
        }

        Ok(())
    }

    /// Parsed feed type
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown feed type key
    pub fn feed_type(&self) -> Result<FeedType, FeedError> {
        FeedType::from_str(&self.feed_type)
    }

    /// Output directory as a path
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            feed_type: default_feed_type(),
            name: default_feed_name(),
            chunk_size: default_chunk_size(),
            output_dir: default_output_dir(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Selected backend
    #[serde(default = "default_backend")]
    pub backend: StorageBackendKind,

    /// Upload attempts per file
    #[serde(default = "default_retries")]
    pub upload_retries: u32,

    /// Delay before the second upload attempt, doubled after each failure
    #[serde(default = "default_initial_delay_ms")]
    pub upload_initial_delay_ms: u64,

    /// S3 settings (required if backend = s3)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,

    /// Local directory settings
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        validate_retries("storage.upload_retries", self.upload_retries)?;

        match self.backend {
            StorageBackendKind::S3 => match self.s3 {
                Some(ref s3) => s3.validate()?,
                None => {
                    return Err(
                        "storage.s3 configuration is required when storage.backend = 's3'"
                            .to_string(),
                    )
                }
            },
            StorageBackendKind::Local => self.local.validate()?,
        }

        Ok(())
    }

    /// Upload retry policy
    pub fn upload_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.upload_retries,
            Duration::from_millis(self.upload_initial_delay_ms),
        )
    }
}

/// S3 configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Destination bucket
    pub bucket: String,

    /// AWS region
    pub region: String,

    /// Static access key id; the default credential chain is used when absent
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,

    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Use path-style addressing
    #[serde(default)]
    pub force_path_style: bool,

    /// Prefix prepended to every object key
    #[serde(default)]
    pub key_prefix: String,
}

impl S3Config {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("storage.s3.bucket cannot be empty".to_string());
        }

        if self.region.is_empty() {
            return Err("storage.s3.region cannot be empty".to_string());
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "storage.s3.access_key_id and storage.s3.secret_access_key must be set together"
                    .to_string(),
            );
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(
                    "storage.s3.endpoint must start with http:// or https://".to_string(),
                );
            }
        }

        Ok(())
    }
}

/// Local filesystem storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Destination directory
    #[serde(default = "default_local_directory")]
    pub directory: String,
}

impl LocalStorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.is_empty() {
            return Err("storage.local.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            directory: default_local_directory(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_retries(field: &str, retries: u32) -> Result<(), String> {
    if !(1..=10).contains(&retries) {
        return Err(format!("{field} must be between 1 and 10, got {retries}"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_engine() -> DatabaseEngine {
    DatabaseEngine::Postgres
}

fn default_pool_min_size() -> usize {
    1
}

fn default_pool_max_size() -> usize {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    2000
}

fn default_connection_timeout_seconds() -> u64 {
    30
}

fn default_feed_type() -> String {
    "facility".to_string()
}

fn default_feed_name() -> String {
    "reservewithgoogle.entity".to_string()
}

fn default_chunk_size() -> usize {
    100
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_backend() -> StorageBackendKind {
    StorageBackendKind::S3
}

fn default_local_directory() -> String {
    "local_storage".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
