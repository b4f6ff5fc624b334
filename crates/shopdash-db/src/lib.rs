//! # shopdash-db: Repository Layer for Shopdash
//!
//! Supplies raw rows to `shopdash-core` and turns them into dashboard
//! view-models. Rows live in SQLite (sqlx, async) or in a [`MemoryStore`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopdash Data Flow                               │
//! │                                                                         │
//! │  report / seed binaries                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopdash-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ Dashboard     │    │  EntityStore  │    │  Query       │  │   │
//! │  │   │ Service       │───►│  ├ Database   │◄───│  contract    │  │   │
//! │  │   │ (service.rs)  │    │  └ MemoryStore│    │  (query.rs)  │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          shopdash-core (pure rollups, totals, promotions)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, demo purge
//! - [`migrations`] - Embedded database migrations
//! - [`query`] - Structured query object and its two interpreters
//! - [`repository`] - SQLite repositories, one per entity
//! - [`memory`] - In-memory store with the same rules
//! - [`store`] - The read trait both backends implement
//! - [`service`] - Dashboard, contacts and catalog view-models
//! - [`demo`] - Seeded demo data generator
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Database and config error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopdash_db::{Database, DbConfig, DashboardService};
//! use shopdash_core::dashboard::DashboardSettings;
//!
//! let db = Database::new(DbConfig::new("shopdash.db")).await?;
//! let service = DashboardService::new(db);
//! let report = service.report(&DashboardSettings::default(), chrono::Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod demo;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, CliOverrides};
pub use demo::{DemoDataset, DemoGenerator};
pub use error::{ConfigError, DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig, PurgeSummary};
pub use query::{Direction, Query};
pub use service::{ContactsOverview, DashboardService};
pub use store::EntityStore;

// Repository re-exports for convenience
pub use repository::contact::ContactRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::promotion::PromotionRepository;

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,shopdash=debug,sqlx=warn";

/// Installs the global tracing subscriber for the binaries, writing to
/// stderr so stdout carries only program output.
///
/// Calling it twice is harmless; the second call keeps the first subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
