//! docrisk-ai - Legal document risk analysis service
//!
//! Watches a directory for new documents, analyses each one section by
//! section and writes a markdown report plus a database record. Runs until
//! interrupted; in-flight documents are finished before exit.

use anyhow::Result;
use clap::Parser;
use docrisk_common::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "docrisk-ai", version, about = "Legal document risk analysis service")]
struct Args {
    /// Configuration file (falls back to DOCRISK_CONFIG, ./docrisk.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Queue files already present in the watch directory at startup
    #[arg(long)]
    scan_existing: bool,

    /// Process existing files and exit instead of watching
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref());
    let _log_guard = docrisk_ai::logging::init_tracing(&config.logging)?;

    info!("Starting docrisk-ai (Legal Risk Analysis)");
    info!(
        "Version: {} ({} built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );
    info!("Watch directory: {}", config.watch_dir.display());
    info!("Report directory: {}", config.output_dir.display());
    info!("Database: {}", config.db_path.display());
    info!("Workers: {}", config.max_workers);

    config.ensure_directories()?;

    let config = Arc::new(config);
    let service = docrisk_ai::build_service(Arc::clone(&config)).await?;
    info!("Service initialized");

    if args.once {
        service.submit_existing();
        service.drain().await;
        info!("System shutdown complete");
        return Ok(());
    }

    if args.scan_existing {
        service.submit_existing();
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
        }
        signal_token.cancel();
    });

    service.run(shutdown).await?;

    Ok(())
}
