//! # Demo Data Seeder
//!
//! Populates the database with a reproducible demo dataset.
//!
//! ## Usage
//! ```bash
//! # 100 contacts with their orders, payments and reviews (default)
//! cargo run -p shopdash-db --bin seed
//!
//! # Custom amount and seed
//! cargo run -p shopdash-db --bin seed -- --count 250 --seed 7
//!
//! # Specify database path
//! cargo run -p shopdash-db --bin seed -- --db ./data/shopdash.db
//!
//! # Only remove previous demo rows
//! cargo run -p shopdash-db --bin seed -- --purge
//! ```
//!
//! ## Generated Rows
//! Every demo row carries a prefix so it can be removed without touching
//! real data:
//! - contacts: username `demo_user_{n}`
//! - orders: order number `DEMO-{contact}-{order}`
//! - payments: transaction id `demo-...`
//! - products: sku `DEMO-...`, promotions: id `demo-promo-...`
//!
//! The same `--seed` and `--count` always produce the same rows relative to
//! the current date.

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

use shopdash_db::{init_tracing, AppConfig, CliOverrides, Database, DemoGenerator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Seed failed");
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut cli = CliOverrides::default();
    let mut purge_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    cli.seed_count = Some(args[i + 1].parse()?);
                    i += 1;
                }
            }
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    cli.seed = Some(args[i + 1].parse()?);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    cli.db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--purge" => purge_only = true,
            "--keep" => cli.keep_existing = true,
            "--help" | "-h" => {
                println!("Shopdash Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of demo contacts (default: 100)");
                println!("  -s, --seed <N>       Generator seed (default: 42)");
                println!("  -d, --db <PATH>      Database file path (default: ./shopdash.db)");
                println!("      --config <PATH>  Config file (default: platform config dir)");
                println!("      --purge          Remove demo rows and exit");
                println!("      --keep           Do not remove previous demo rows first");
                println!("  -h, --help           Show this help message");
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

    println!("🌱 Shopdash Demo Data Seeder");
    println!("============================");
    println!("Database: {}", config.database.path.display());
    println!("Contacts: {}", config.seed.count);
    println!("Seed:     {}", config.seed.seed);
    println!();

    let db = Database::new(config.database.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if purge_only || config.seed.purge {
        let summary = db.purge_demo_data().await?;
        println!(
            "🧹 Removed previous demo data: {} contacts, {} orders, {} payments, {} products, {} promotions",
            summary.contacts, summary.orders, summary.payments, summary.products, summary.promotions
        );
    }

    if purge_only {
        db.close().await;
        return Ok(());
    }

    let start = std::time::Instant::now();
    let dataset = DemoGenerator::new(config.seed.seed, Utc::now())
        .with_pricing(config.pricing)
        .generate(config.seed.count)?;
    dataset.insert_into(&db).await?;

    let elapsed = start.elapsed();
    info!(
        contacts = dataset.contacts.len(),
        orders = dataset.orders.len(),
        ?elapsed,
        "Demo data inserted"
    );

    println!();
    println!(
        "✓ Seeded {} contacts, {} orders, {} payments, {} reviews, {} products, {} promotions in {:?}",
        dataset.contacts.len(),
        dataset.orders.len(),
        dataset.payments.len(),
        dataset.reviews.len(),
        dataset.products.len(),
        dataset.promotions.len(),
        elapsed
    );
    println!("  Demo rows are prefixed with \"demo\" and can be removed with --purge.");

    db.close().await;
    Ok(())
}
