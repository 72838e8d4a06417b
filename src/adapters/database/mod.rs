//! Source database abstraction layer
//!
//! The pipeline reads through the [`QueryExecutor`] trait; [`create_query_executor`]
//! picks the PostgreSQL or MySQL implementation from configuration and
//! [`page_query`] supplies the engine-specific paging SQL.

pub mod factory;
pub mod queries;
pub mod traits;

pub use factory::create_query_executor;
pub use queries::page_query;
pub use traits::{QueryExecutor, QueryParam};
