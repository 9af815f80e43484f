//! Poll a pool's hosts for `rrd_updates` and write Prometheus exposition text

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use xenrrd_collector::{Collector, InventorySource, StaticInventory};
use xenrrd_monitoring::MetricsExporter;

#[derive(Parser)]
#[command(name = "xenrrd")]
#[command(about = "Export XAPI rrd_updates performance counters as Prometheus metrics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file path
    #[arg(long, short, env = "XENRRD_CONFIG")]
    config: PathBuf,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_file(&cli.config)?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logging.initialize()?;

    let collector = Collector::new(config.collector.clone(), config.credentials()?)?;
    let exporter = MetricsExporter::new(config.exporter.clone())?;
    let inventory = StaticInventory::new(&config.inventory_path);

    if cli.once {
        return run_cycle(&collector, &exporter, &inventory, config.output_path.as_deref()).await;
    }

    info!(
        interval_secs = config.poll_interval_secs,
        inventory = %config.inventory_path.display(),
        "Starting poll loop"
    );

    run_until_shutdown(
        &collector,
        &exporter,
        &inventory,
        config.output_path.as_deref(),
        config.poll_interval(),
        tokio::signal::ctrl_c(),
    )
    .await
}

/// Poll every `interval` until `shutdown` resolves, including mid-cycle
async fn run_until_shutdown<F>(
    collector: &Collector,
    exporter: &MetricsExporter,
    inventory: &dyn InventorySource,
    output_path: Option<&Path>,
    interval: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut ticker = tokio::time::interval(interval);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let cycle = run_cycle(collector, exporter, inventory, output_path);
                tokio::select! {
                    result = cycle => {
                        if let Err(e) = result {
                            error!(error = %e, "Poll cycle failed");
                        }
                    }
                    _ = &mut shutdown => {
                        info!("Received Ctrl-C during poll cycle, shutting down");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Received Ctrl-C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn run_cycle(
    collector: &Collector,
    exporter: &MetricsExporter,
    inventory: &dyn InventorySource,
    output_path: Option<&Path>,
) -> Result<()> {
    let report = collector.poll(inventory).await?;

    exporter.publish(&report.metrics)?;
    exporter.record_poll(report.hosts_polled, report.hosts_failed, report.duration);

    let text = exporter.render()?;
    match output_path {
        Some(path) => write_atomically(path, &text).await,
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Write through a sibling temp file so readers never see a partial file
async fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let staging = path.with_extension("tmp");
    tokio::fs::write(&staging, contents)
        .await
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    tokio::fs::rename(&staging, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
