//! # Dashboard Report
//!
//! Prints the dashboard report of a database as pretty JSON.
//!
//! ## Usage
//! ```bash
//! cargo run -p shopdash-db --bin report
//! cargo run -p shopdash-db --bin report -- --db ./data/shopdash.db --granularity month
//! cargo run -p shopdash-db --bin report -- --objective 500000 > report.json
//! ```
//!
//! Logs go to stderr, so stdout stays valid JSON.

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::error;

use shopdash_core::money::Money;
use shopdash_core::Granularity;
use shopdash_db::{init_tracing, AppConfig, CliOverrides, DashboardService, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Report failed");
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut cli = CliOverrides::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    cli.db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--granularity" | "-g" => {
                if i + 1 < args.len() {
                    cli.granularity = Some(args[i + 1].parse::<Granularity>()?);
                    i += 1;
                }
            }
            "--objective" => {
                if i + 1 < args.len() {
                    cli.objective = Some(Money::from_cents(args[i + 1].parse()?));
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopdash Dashboard Report");
                println!();
                println!("Usage: report [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>            Database file path (default: ./shopdash.db)");
                println!("  -g, --granularity <UNIT>   day | week | month | year (default: week)");
                println!("      --objective <CENTS>    Revenue objective (default: 1000000)");
                println!("      --config <PATH>        Config file (default: platform config dir)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument '{}', see --help", other).into());
            }
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    config.apply_cli(cli)?;

    let db = Database::new(config.database.db_config()).await?;
    let service = DashboardService::new(db);
    let report = service.report(&config.dashboard, Utc::now()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    service.store().close().await;
    Ok(())
}
