//! craftbook - craft-vs-buy costs and market health from the command line.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use craftbook_cli::{AppConfig, Application};
use craftbook_core::ItemId;
use craftbook_telemetry::Metrics;
use serde::Serialize;
use tracing::info;

/// Craft cost resolver and market metrics
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CRAFTBOOK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cheapest way to craft an item, ingredient by ingredient
    Craft {
        item_id: u32,
        /// Region (world, data center or region name)
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Market health metrics for one item
    Analyze {
        item_id: u32,
        #[arg(short, long)]
        region: Option<String>,
        /// Only consider high-quality listings and sales
        #[arg(long)]
        hq: bool,
    },
    /// Rank recently traded items by sales
    Hot {
        #[arg(short, long)]
        region: Option<String>,
        /// Sales window in hours
        #[arg(long)]
        hours: Option<u32>,
        /// Recently updated items to screen
        #[arg(long)]
        sample: Option<usize>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    craftbook_telemetry::init_logging()?;

    info!("Starting craftbook v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > CRAFTBOOK_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("CRAFTBOOK_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::load(&config_path)?;
    info!(default_region = %config.default_region, base_url = %config.market.base_url, "Configuration loaded");

    let app = Application::new(config)?;

    match args.command {
        Command::Craft { item_id, region } => {
            let result = app.craft(ItemId(item_id), region.as_deref()).await?;
            print_json(&result)?;
        }
        Command::Analyze { item_id, region, hq } => {
            let metrics = app.analyze(ItemId(item_id), region.as_deref(), hq).await?;
            print_json(&metrics)?;
        }
        Command::Hot { region, hours, sample } => {
            let hot = app.hot_items(region.as_deref(), hours, sample).await?;
            print_json(&hot)?;
        }
    }

    if args.print_metrics {
        eprintln!("{}", Metrics::gather_text()?);
    }

    Ok(())
}
