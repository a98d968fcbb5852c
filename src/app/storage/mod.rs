//! SQLite storage for measurements and dataset summaries
//!
//! The store provides what the ingestion pipeline needs from a database:
//! IMMEDIATE transactions that roll back unless committed, bulk delete and
//! insert by dataset name, summary upserts, aggregate queries and an ordered
//! scan of store values for order statistics.
//!
//! - [`schema`] - Table definitions and schema versioning
//! - [`codec`] - Fixed-point decimal and timestamp column encoding
//! - [`store`] - Connection handling, transactions and read queries

pub mod codec;
pub mod schema;
pub mod store;

pub use store::{DeletedRows, MeasurementAggregates, SqliteStore, StoreTransaction};
