//! Facility feed output record
//!
//! Shape of one entry in the `data` array of a facility feed artifact.
//! Scalar values are carried through from the source row unchanged, so a
//! nullable source column stays `null` in the feed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One facility entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub entity_id: Value,
    pub name: Value,
    pub telephone: Value,
    pub url: Value,
    pub location: Location,
}

/// Geographic position and postal address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Value,
    pub longitude: Value,
    pub address: Address,
}

/// Postal address block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub country: Value,
    pub locality: Value,
    pub region: Value,
    pub postal_code: Value,
    pub street_address: Value,
}
