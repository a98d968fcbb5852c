use clap::{CommandFactory, Parser};
use measurement_summary::cli::args::Args;
use measurement_summary::cli::commands::{self, shared::report_error};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::debug;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Without a subcommand, show help
    if args.command.is_none() {
        println!("{}", Args::command().render_help());
        process::exit(0);
    }

    let output_format = args.output_format;

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();
        let command = commands::run(args, cancellation_token.clone());
        tokio::pin!(command);

        // Ctrl+C cancels the command, which still runs to completion so an
        // in-flight ingestion can roll back before the process exits
        tokio::select! {
            result = &mut command => result,
            _ = shutdown_signal() => {
                eprintln!("\nReceived CTRL+C, rolling back...");
                cancellation_token.cancel();
                command.await
            }
        }
    });

    match result {
        Ok(report) => {
            debug!("Command finished: {:?}", report);
            process::exit(0);
        }
        Err(error) => {
            report_error(&error, output_format);
            process::exit(1);
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available, never resolve
        std::future::pending::<()>().await;
    }
}
