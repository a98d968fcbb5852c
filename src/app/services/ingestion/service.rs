//! Async service façade over the store
//!
//! Each operation opens its own connection on the blocking thread pool, so
//! ingestions of different names proceed independently and readers see the
//! last committed state.

use std::io::BufRead;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::ingestor::{Ingestor, validate_dataset_name};
use super::locks::DatasetLocks;
use crate::app::models::{Dataset, Measurement};
use crate::app::services::dataset_query::{self, DatasetFilter};
use crate::app::storage::SqliteStore;
use crate::config::Config;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct DatasetService {
    config: Arc<Config>,
    locks: DatasetLocks,
    shutdown: CancellationToken,
}

impl DatasetService {
    /// Create a service, validating the configuration and initializing the schema
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        SqliteStore::open(&config.storage)?;
        info!(
            "Dataset store ready at {}",
            config.storage.database_path.display()
        );

        Ok(Self {
            config: Arc::new(config),
            locks: DatasetLocks::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Cancel in-flight ingestions when `token` is cancelled
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace a dataset with the content of `reader`
    ///
    /// Ingestions of the same name run one at a time. When a timeout is
    /// configured and exceeded, the ingestion is cancelled and rolled back.
    pub async fn ingest<R>(&self, dataset_name: impl Into<String>, reader: R) -> Result<Dataset>
    where
        R: BufRead + Send + 'static,
    {
        let dataset_name = dataset_name.into();
        validate_dataset_name(&dataset_name)?;

        let _guard = self.locks.acquire(&dataset_name).await;
        let cancel = self.shutdown.child_token();

        let storage = self.config.storage.clone();
        let ingestor = Ingestor::new(self.config.ingestion.clone());
        let task_name = dataset_name.clone();
        let task_cancel = cancel.clone();
        let mut handle = tokio::task::spawn_blocking(move || {
            let mut store =
                SqliteStore::open(&storage).map_err(|e| Error::operational(&task_name, e))?;
            ingestor.ingest(&mut store, &task_name, reader, &task_cancel)
        });

        let joined = match self.config.ingestion.timeout() {
            None => (&mut handle).await,
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        "Ingestion of '{}' exceeded {:?}, cancelling",
                        dataset_name, limit
                    );
                    cancel.cancel();
                    match handle.await {
                        Ok(Err(Error::ProcessingInterrupted { .. })) => {
                            return Err(Error::ingest_timeout(
                                &dataset_name,
                                limit.as_secs(),
                            ));
                        }
                        other => other,
                    }
                }
            },
        };

        joined.map_err(|e| Error::operational(&dataset_name, Error::task_failed(e.to_string())))?
    }

    /// Dataset summaries matching `filter`
    pub async fn query(&self, filter: DatasetFilter) -> Result<Vec<Dataset>> {
        self.with_store(move |store| dataset_query::query_datasets(store, &filter))
            .await
    }

    /// Measurements of a dataset in ascending timestamp order
    pub async fn latest(
        &self,
        dataset_name: impl Into<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Measurement>> {
        let dataset_name = dataset_name.into();
        self.with_store(move |store| {
            dataset_query::latest_measurements(store, &dataset_name, limit)
        })
        .await
    }

    /// Summary of one dataset
    pub async fn get(&self, dataset_name: impl Into<String>) -> Result<Option<Dataset>> {
        let dataset_name = dataset_name.into();
        self.with_store(move |store| store.get_dataset(&dataset_name))
            .await
    }

    /// Number of persisted measurements of a dataset
    pub async fn measurement_count(&self, dataset_name: impl Into<String>) -> Result<usize> {
        let dataset_name = dataset_name.into();
        self.with_store(move |store| store.count_measurements(&dataset_name))
            .await
    }

    async fn with_store<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
    {
        let storage = self.config.storage.clone();
        tokio::task::spawn_blocking(move || {
            let store = SqliteStore::open(&storage)?;
            operation(&store)
        })
        .await
        .map_err(|e| Error::task_failed(e.to_string()))?
    }
}
