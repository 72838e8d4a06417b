//! Paging queries per feed type and engine
//!
//! Every query takes `(offset, limit)` as its two positional parameters, in
//! that order, and orders by the identity column so consecutive pages neither
//! overlap nor skip rows.

use crate::config::DatabaseEngine;
use crate::domain::FeedType;

const FACILITY_POSTGRES: &str = "SELECT id, name, phone, url, \
     latitude::double precision AS latitude, longitude::double precision AS longitude, \
     country, locality, region, postal_code, street_address \
     FROM facility ORDER BY id OFFSET $1 LIMIT $2";

// MySQL has no OFFSET-first form with placeholders; `LIMIT ?, ?` takes the
// offset first. DECIMAL comes back as bytes over the binary protocol, so the
// coordinates are cast to arrive as doubles like on Postgres.
const FACILITY_MYSQL: &str = "SELECT id, name, phone, url, \
     CAST(latitude AS DOUBLE) AS latitude, CAST(longitude AS DOUBLE) AS longitude, \
     country, locality, region, postal_code, street_address \
     FROM facility ORDER BY id LIMIT ?, ?";

/// Paging query for a feed type on an engine
pub fn page_query(feed_type: FeedType, engine: DatabaseEngine) -> &'static str {
    match (feed_type, engine) {
        (FeedType::Facility, DatabaseEngine::Postgres) => FACILITY_POSTGRES,
        (FeedType::Facility, DatabaseEngine::Mysql) => FACILITY_MYSQL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_query_orders_and_pages() {
        let query = page_query(FeedType::Facility, DatabaseEngine::Postgres);
        assert!(query.contains("ORDER BY id"));
        assert!(query.ends_with("OFFSET $1 LIMIT $2"));
    }

    #[test]
    fn test_mysql_query_offset_first() {
        let query = page_query(FeedType::Facility, DatabaseEngine::Mysql);
        assert!(query.contains("ORDER BY id"));
        assert!(query.ends_with("LIMIT ?, ?"));
    }

    #[test]
    fn test_coordinates_are_doubles_on_every_engine() {
        let postgres = page_query(FeedType::Facility, DatabaseEngine::Postgres);
        assert!(postgres.contains("latitude::double precision AS latitude"));
        assert!(postgres.contains("longitude::double precision AS longitude"));

        let mysql = page_query(FeedType::Facility, DatabaseEngine::Mysql);
        assert!(mysql.contains("CAST(latitude AS DOUBLE) AS latitude"));
        assert!(mysql.contains("CAST(longitude AS DOUBLE) AS longitude"));
    }

    #[test]
    fn test_queries_select_all_facility_columns() {
        for engine in [DatabaseEngine::Postgres, DatabaseEngine::Mysql] {
            let query = page_query(FeedType::Facility, engine);
            for column in [
                "id",
                "name",
                "phone",
                "url",
                "latitude",
                "longitude",
                "country",
                "locality",
                "region",
                "postal_code",
                "street_address",
            ] {
                assert!(query.contains(column), "{engine} query lacks {column}");
            }
        }
    }
}
