//! AstraGuard conjunction screening CLI.
//!
//! Usage:
//!   astraguard-screen --db data/catalog.json --groups ACTIVE,COSMOS-1408-DEBRIS \
//!                      --horizon-hours 72 --top-k 20

mod cli;
mod config;
mod error;
mod pipeline;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("AstraGuard Conjunction Screening");
    info!("{}", "=".repeat(60));

    let config = args.into_screening_config().map_err(|e| anyhow!(e))?;

    let summary = match pipeline::run(&config) {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!(error = %err, "screening run failed");
            std::process::exit(err.exit_code());
        }
    };

    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Objects propagated:     {}", summary.objects_propagated);
    info!("Events scored:          {}", summary.events_scored);
    info!("Events linked to snapshot: {}", summary.events_linked);
    info!("Events dropped (linkage):  {}", summary.events_dropped_by_linkage);
    info!("Objects in snapshot:    {}", summary.objects_in_snapshot);
    info!("Manifest written to:    {}", summary.manifest_path.display());

    Ok(())
}
