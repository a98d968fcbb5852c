//! Command implementations
//!
//! Each subcommand lives in its own module:
//! - `ingest`: Upload checks, ingestion with a progress spinner
//! - `query`: Dataset summaries matching range filters
//! - `latest`: Measurements of one dataset

pub mod ingest;
pub mod latest;
pub mod query;
pub mod shared;

pub use shared::CommandReport;

use crate::Result;
use crate::cli::args::{Args, Commands};
use crate::cli::commands::shared::{load_configuration, setup_logging};
use crate::config::Config;
use crate::{DatasetService, Error};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Main command runner
///
/// Sets up logging, loads the layered configuration and dispatches to the
/// subcommand. `cancellation_token` interrupts in-flight ingestions.
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<CommandReport> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let command = args
        .command
        .clone()
        .ok_or_else(|| Error::configuration("No command given"))?;

    let mut config = load_configuration(&args)?;
    if let Commands::Ingest(ingest_args) = &command {
        if let Some(timeout_secs) = ingest_args.timeout_secs {
            config = config.with_ingest_timeout_secs(timeout_secs);
        }
    }

    let service = open_service(config)?.with_shutdown(cancellation_token);

    match command {
        Commands::Ingest(ingest_args) => ingest::run_ingest(&service, &args, ingest_args).await,
        Commands::Query(query_args) => query::run_query(&service, &args, query_args).await,
        Commands::Latest(latest_args) => latest::run_latest(&service, &args, latest_args).await,
    }
}

fn open_service(config: Config) -> Result<DatasetService> {
    debug!("Effective configuration: {:?}", config);
    DatasetService::new(config)
}
