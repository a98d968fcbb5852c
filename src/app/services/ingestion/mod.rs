//! Atomic replace-and-recompute ingestion
//!
//! One ingestion deletes the dataset's previous rows and summary, streams the
//! new file through the parser and validator, applies the file-level policy,
//! inserts the rows and recomputes the summary, all in one transaction. Every
//! failure path rolls the transaction back.
//!
//! ## Architecture
//!
//! - [`ingestor`] - Synchronous pipeline over an open [`SqliteStore`]
//! - [`locks`] - In-process mutual exclusion per dataset name
//! - [`service`] - Async façade running ingestions on the blocking pool
//!
//! [`SqliteStore`]: crate::app::storage::SqliteStore

pub mod ingestor;
pub mod locks;
pub mod service;

#[cfg(test)]
pub mod tests;

pub use ingestor::{Ingestor, validate_dataset_name};
pub use locks::{DatasetLockGuard, DatasetLocks};
pub use service::DatasetService;
