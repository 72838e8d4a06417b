//! Feed types, feed documents and the run manifest

use crate::domain::{FeedError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Fixed file name of the run manifest
pub const MANIFEST_FILE_NAME: &str = "metadata.json";

/// MIME type used for artifacts and the manifest
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content encoding of feed artifacts
pub const GZIP_ENCODING: &str = "gzip";

/// Content encoding of the uncompressed manifest
pub const IDENTITY_ENCODING: &str = "identity";

/// Supported feed types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedType {
    /// Facility entity feed
    Facility,
}

impl FeedType {
    /// Configuration key of the feed type
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Facility => "facility",
        }
    }

    /// Artifact file name for a generation timestamp in milliseconds
    ///
    /// ```
    /// use entity_feed::domain::FeedType;
    ///
    /// assert_eq!(
    ///     FeedType::Facility.artifact_file_name(1700000000123),
    ///     "facility_feed_1700000000123.json.gz"
    /// );
    /// ```
    pub fn artifact_file_name(&self, timestamp_ms: i64) -> String {
        format!("{}_feed_{}.json.gz", self.as_str(), timestamp_ms)
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedType {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "facility" => Ok(Self::Facility),
            _ => Err(FeedError::Configuration(format!(
                "Unsupported feed type: '{s}'. Expected one of: facility"
            ))),
        }
    }
}

/// Contents of one feed artifact before compression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    /// Output records in chunk order
    pub data: Vec<Value>,
}

/// End-of-run descriptor listing every artifact produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Generation time in seconds since the Unix epoch
    pub generation_timestamp: i64,

    /// Feed name
    pub name: String,

    /// Artifact file names in generation order
    pub data_file: Vec<String>,
}
