//! PostgreSQL row conversion
//!
//! Maps each column to a JSON scalar by its declared type. NULL becomes
//! `Value::Null`; types without a mapping are rejected rather than guessed.

use crate::domain::{QueryError, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

/// Convert one driver row into a [`RawRecord`] preserving column order
pub fn row_to_record(row: &Row) -> Result<RawRecord, QueryError> {
    let mut record = RawRecord::with_capacity(row.len());

    for (idx, column) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, column.type_().name())
            .map_err(|e| decode_error(column.name(), e))?
            .ok_or_else(|| QueryError::UnsupportedColumnType {
                column: column.name().to_string(),
                type_name: column.type_().name().to_string(),
            })?;
        record.push(column.name(), value);
    }

    Ok(record)
}

/// `Ok(None)` means the type has no mapping
fn column_value(
    row: &Row,
    idx: usize,
    type_name: &str,
) -> Result<Option<Value>, tokio_postgres::Error> {
    let value = match type_name {
        "bool" => get::<bool>(row, idx)?.map(Value::Bool),
        "int2" => get::<i16>(row, idx)?.map(Value::from),
        "int4" => get::<i32>(row, idx)?.map(Value::from),
        "int8" => get::<i64>(row, idx)?.map(Value::from),
        "oid" => get::<u32>(row, idx)?.map(Value::from),
        "float4" => get::<f32>(row, idx)?.map(|v| float(f64::from(v))),
        "float8" => get::<f64>(row, idx)?.map(float),
        "text" | "varchar" | "bpchar" | "name" | "citext" => {
            get::<String>(row, idx)?.map(Value::String)
        }
        "json" | "jsonb" => get::<Value>(row, idx)?,
        "date" => get::<NaiveDate>(row, idx)?.map(|d| Value::String(d.to_string())),
        "timestamp" => get::<NaiveDateTime>(row, idx)?
            .map(|ts| Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "timestamptz" => get::<DateTime<Utc>>(row, idx)?.map(|ts| Value::String(ts.to_rfc3339())),
        _ => return Ok(None),
    };

    Ok(Some(value.unwrap_or(Value::Null)))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>, tokio_postgres::Error> {
    row.try_get::<_, Option<T>>(idx)
}

// NaN and infinities have no JSON representation
fn float(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn decode_error(column: &str, err: impl std::fmt::Display) -> QueryError {
    QueryError::Execution(format!("Failed to decode column '{column}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_conversion() {
        assert_eq!(float(1.5), serde_json::json!(1.5));
        assert_eq!(float(f64::NAN), Value::Null);
        assert_eq!(float(f64::INFINITY), Value::Null);
    }

    #[test]
    fn test_decode_error_names_column() {
        let err = decode_error("latitude", "invalid byte sequence");
        assert!(matches!(err, QueryError::Execution(_)));
        assert_eq!(
            err.to_string(),
            "Query failed: Failed to decode column 'latitude': invalid byte sequence"
        );
    }

    #[test]
    fn test_unsupported_column_type_names_column() {
        let err = QueryError::UnsupportedColumnType {
            column: "latitude".to_string(),
            type_name: "numeric".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported type 'numeric' for column 'latitude'"
        );
    }
}
