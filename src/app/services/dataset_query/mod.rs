//! Dataset summary queries and measurement lookups
//!
//! - [`filter`] - Optional inclusive range bounds over summary fields, ANDed
//! - [`lookup`] - Query and `latest` operations over an open store

pub mod filter;
pub mod lookup;

#[cfg(test)]
mod tests;

pub use filter::{
    Comparison, DatasetFilter, FilterValue, InclusiveRange, Predicate, SummaryField,
};
pub use lookup::{latest_measurements, query_datasets};
