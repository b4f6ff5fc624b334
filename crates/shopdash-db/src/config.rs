//! # Application Configuration
//!
//! Settings shared by the `seed` and `report` binaries.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest, applied by each binary)               │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     SHOPDASH_DB_PATH=./data/shopdash.db                                │
//! │     SHOPDASH_GRANULARITY=month                                         │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/shopdash/config.toml (Linux)                             │
//! │     ~/Library/Application Support/com.shopdash.shopdash/config.toml    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "shopdash.db"
//! max_connections = 5
//!
//! [pricing]
//! shipping_flat_rate = 990    # cents
//!
//! [dashboard]
//! granularity = "week"        # day | week | month | year
//! objective = 1000000         # cents
//! top_products = 3
//!
//! [seed]
//! count = 100
//! seed = 42
//! purge = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use shopdash_core::dashboard::DashboardSettings;
use shopdash_core::money::Money;
use shopdash_core::totals::PricingPolicy;
use shopdash_core::Granularity;

use crate::demo::DEFAULT_CONTACT_COUNT;
use crate::error::{ConfigError, ConfigResult};
use crate::pool::DbConfig;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, created on first use.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("shopdash.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    /// Pool configuration for this section.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.path).max_connections(self.max_connections)
    }
}

/// `[seed]` section: defaults of the `seed` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSettings {
    /// Number of demo contacts to generate.
    #[serde(default = "default_seed_count")]
    pub count: usize,

    /// Generator seed; same seed, same data.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Remove previous demo rows before inserting.
    #[serde(default = "default_true")]
    pub purge: bool,
}

fn default_seed_count() -> usize {
    DEFAULT_CONTACT_COUNT
}

fn default_seed() -> u64 {
    42
}

fn default_true() -> bool {
    true
}

impl Default for SeedSettings {
    fn default() -> Self {
        SeedSettings {
            count: default_seed_count(),
            seed: default_seed(),
            purge: default_true(),
        }
    }
}

/// Command-line flags of the binaries; they win over file and environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub db_path: Option<PathBuf>,
    pub granularity: Option<Granularity>,
    pub objective: Option<Money>,
    pub seed_count: Option<usize>,
    pub seed: Option<u64>,
    /// `--keep`: do not purge previous demo rows.
    pub keep_existing: bool,
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub pricing: PricingPolicy,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    #[serde(default)]
    pub seed: SeedSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config.toml`)
    /// 3. `SHOPDASH_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without applying overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("no config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.pricing.shipping_flat_rate.is_negative() {
            return Err(ConfigError::Invalid(
                "pricing.shipping_flat_rate must not be negative".into(),
            ));
        }

        if self.dashboard.objective.cents() <= 0 {
            return Err(ConfigError::Invalid(
                "dashboard.objective must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHOPDASH_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SHOPDASH_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("SHOPDASH_SHIPPING_CENTS") {
            match value.parse::<i64>() {
                Ok(cents) => self.pricing.shipping_flat_rate = Money::from_cents(cents),
                Err(_) => warn!(value = %value, "Invalid SHOPDASH_SHIPPING_CENTS"),
            }
        }

        if let Some(value) = lookup("SHOPDASH_GRANULARITY") {
            match value.parse::<Granularity>() {
                Ok(granularity) => self.dashboard.granularity = granularity,
                Err(e) => warn!(error = %e, "Invalid SHOPDASH_GRANULARITY"),
            }
        }

        if let Some(value) = lookup("SHOPDASH_OBJECTIVE_CENTS") {
            match value.parse::<i64>() {
                Ok(cents) => self.dashboard.objective = Money::from_cents(cents),
                Err(_) => warn!(value = %value, "Invalid SHOPDASH_OBJECTIVE_CENTS"),
            }
        }

        if let Some(value) = lookup("SHOPDASH_SEED") {
            match value.parse::<u64>() {
                Ok(seed) => self.seed.seed = seed,
                Err(_) => warn!(value = %value, "Invalid SHOPDASH_SEED"),
            }
        }
    }

    /// Applies command-line flags, then validates the result.
    pub fn apply_cli(&mut self, cli: CliOverrides) -> ConfigResult<()> {
        if let Some(path) = cli.db_path {
            self.database.path = path;
        }
        if let Some(granularity) = cli.granularity {
            self.dashboard.granularity = granularity;
        }
        if let Some(objective) = cli.objective {
            self.dashboard.objective = objective;
        }
        if let Some(count) = cli.seed_count {
            self.seed.count = count;
        }
        if let Some(seed) = cli.seed {
            self.seed.seed = seed;
        }
        if cli.keep_existing {
            self.seed.purge = false;
        }

        self.validate()
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopdash", "shopdash")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, PathBuf::from("shopdash.db"));
        assert_eq!(config.pricing.shipping_flat_rate.cents(), 990);
        assert_eq!(config.dashboard.granularity, Granularity::Week);
        assert_eq!(config.dashboard.top_products, 3);
        assert_eq!(config.seed.count, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [dashboard]
            granularity = "month"

            [pricing]
            shipping_flat_rate = 590
            "#,
        )
        .unwrap();

        assert_eq!(config.dashboard.granularity, Granularity::Month);
        assert_eq!(config.dashboard.objective.cents(), 1_000_000);
        assert_eq!(config.pricing.shipping_flat_rate.cents(), 590);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.seed.purge);
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let err = toml::from_str::<AppConfig>("[dashboard]\ngranularity = \"hour\"").unwrap_err();
        assert!(matches!(ConfigError::from(err), ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SHOPDASH_DB_PATH", "/tmp/other.db"),
            ("SHOPDASH_GRANULARITY", "day"),
            ("SHOPDASH_OBJECTIVE_CENTS", "not-a-number"),
            ("SHOPDASH_SEED", "7"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.dashboard.granularity, Granularity::Day);
        assert_eq!(config.dashboard.objective.cents(), 1_000_000);
        assert_eq!(config.seed.seed, 7);
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.dashboard.objective = Money::zero();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_flags_are_validated() {
        let mut config = AppConfig::default();
        config
            .apply_cli(CliOverrides {
                db_path: Some(PathBuf::from("/tmp/cli.db")),
                seed_count: Some(12),
                seed: Some(9),
                keep_existing: true,
                ..CliOverrides::default()
            })
            .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/cli.db"));
        assert_eq!(config.seed.count, 12);
        assert_eq!(config.seed.seed, 9);
        assert!(!config.seed.purge);

        let mut config = AppConfig::default();
        let err = config
            .apply_cli(CliOverrides {
                db_path: Some(PathBuf::new()),
                ..CliOverrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let mut config = AppConfig::default();
        let err = config
            .apply_cli(CliOverrides {
                objective: Some(Money::from_cents(-1)),
                ..CliOverrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("shopdash-config-{}.toml", uuid::Uuid::new_v4()));

        let mut config = AppConfig::default();
        config.dashboard.granularity = Granularity::Year;
        config.seed.count = 12;
        config.save(Some(path.clone())).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[dashboard]"));
        std::fs::remove_file(&path).unwrap();
    }
}
