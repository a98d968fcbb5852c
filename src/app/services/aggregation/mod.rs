//! Summary statistics per dataset
//!
//! [`recompute`] runs inside the ingestion transaction, after the new rows are
//! inserted. It reads streaming aggregates and the ordered store values back
//! from storage, derives the summary and upserts it. Any failure aborts the
//! enclosing transaction.

pub mod engine;
pub mod percentile;

pub use engine::recompute;
pub use percentile::{continuous_percentile, mean};
