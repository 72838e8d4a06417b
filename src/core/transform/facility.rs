//! Facility record transformation
//!
//! Maps a flat facility row onto the nested entity shape:
//!
//! ```text
//! id, name, phone, url                    -> entity_id, name, telephone, url
//! latitude, longitude                     -> location.{latitude, longitude}
//! country, locality, region,
//! postal_code, street_address             -> location.address.*
//! ```

use crate::core::transform::RecordTransformer;
use crate::domain::{Address, FacilityRecord, FeedType, Location, RawRecord, TransformError};
use serde_json::Value;

const IDENTITY_COLUMN: &str = "id";

/// Transformer for [`FeedType::Facility`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FacilityTransformer;

impl FacilityTransformer {
    /// Build the typed facility entry for a row
    ///
    /// # Errors
    ///
    /// [`TransformError::MissingField`] when a column is absent,
    /// [`TransformError::NullIdentity`] when `id` is NULL.
    pub fn to_facility(&self, record: &RawRecord) -> Result<FacilityRecord, TransformError> {
        let entity_id = record.require(IDENTITY_COLUMN)?;
        if entity_id.is_null() {
            return Err(TransformError::NullIdentity(IDENTITY_COLUMN.to_string()));
        }

        let field = |name: &str| record.require(name).cloned();

        Ok(FacilityRecord {
            entity_id: entity_id.clone(),
            name: field("name")?,
            telephone: field("phone")?,
            url: field("url")?,
            location: Location {
                latitude: field("latitude")?,
                longitude: field("longitude")?,
                address: Address {
                    country: field("country")?,
                    locality: field("locality")?,
                    region: field("region")?,
                    postal_code: field("postal_code")?,
                    street_address: field("street_address")?,
                },
            },
        })
    }
}

impl RecordTransformer for FacilityTransformer {
    fn feed_type(&self) -> FeedType {
        FeedType::Facility
    }

    fn transform(&self, record: &RawRecord) -> Result<Value, TransformError> {
        let facility = self.to_facility(record)?;
        serde_json::to_value(facility).map_err(|e| TransformError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facility_row() -> RawRecord {
        RawRecord::new()
            .with("id", 42)
            .with("name", "Downtown Clinic")
            .with("phone", "+1-555-0100")
            .with("url", "https://clinic.example.com")
            .with("latitude", 37.7749)
            .with("longitude", -122.4194)
            .with("country", "US")
            .with("locality", "San Francisco")
            .with("region", "CA")
            .with("postal_code", "94103")
            .with("street_address", "1 Market St")
    }

    #[test]
    fn test_transform_builds_nested_entity() {
        let output = FacilityTransformer.transform(&facility_row()).unwrap();

        assert_eq!(
            output,
            json!({
                "entity_id": 42,
                "name": "Downtown Clinic",
                "telephone": "+1-555-0100",
                "url": "https://clinic.example.com",
                "location": {
                    "latitude": 37.7749,
                    "longitude": -122.4194,
                    "address": {
                        "country": "US",
                        "locality": "San Francisco",
                        "region": "CA",
                        "postal_code": "94103",
                        "street_address": "1 Market St"
                    }
                }
            })
        );
    }

    #[test]
    fn test_transform_ignores_column_order_and_extras() {
        let forward = facility_row();
        let mut names: Vec<&str> = forward.column_names().collect();
        names.reverse();

        let mut reversed: RawRecord = names
            .into_iter()
            .map(|n| (n, forward.get(n).cloned().unwrap_or(Value::Null)))
            .collect();
        reversed.push("internal_notes", json!("ignored"));

        assert_eq!(
            FacilityTransformer.transform(&reversed).unwrap(),
            FacilityTransformer.transform(&forward).unwrap()
        );
    }

    #[test]
    fn test_null_optional_fields_pass_through() {
        let mut row = facility_row();
        row.set("url", Value::Null);
        row.set("latitude", Value::Null);

        let output = FacilityTransformer.transform(&row).unwrap();
        assert_eq!(output["url"], Value::Null);
        assert_eq!(output["location"]["latitude"], Value::Null);
        assert_eq!(output["entity_id"], json!(42));
    }

    #[test]
    fn test_missing_field_is_error() {
        let mut row = facility_row();
        row.remove("region");

        let err = FacilityTransformer.transform(&row).unwrap_err();
        assert_eq!(err, TransformError::MissingField("region".to_string()));
    }

    #[test]
    fn test_missing_identity_is_error() {
        let mut row = facility_row();
        row.remove("id");

        let err = FacilityTransformer.transform(&row).unwrap_err();
        assert_eq!(err, TransformError::MissingField("id".to_string()));
    }

    #[test]
    fn test_null_identity_is_error() {
        let mut row = facility_row();
        row.set("id", Value::Null);

        let err = FacilityTransformer.transform(&row).unwrap_err();
        assert_eq!(err, TransformError::NullIdentity("id".to_string()));
    }
}
