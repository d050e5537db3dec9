//! Configuration management for roastlog.
//!
//! Configuration is loaded with figment from defaults, a TOML file and
//! `ROASTLOG_` environment variables. Nested keys are separated by a double
//! underscore, e.g. `ROASTLOG_TIMER__ACCELERATION=10`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::{default_advance_table, AdvanceStep, ControllerOptions, MAX_BASE};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "roastlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "roastlog.db";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ROASTLOG_";

/// Application configuration.
///
/// Sources in order of precedence, highest first:
/// 1. Environment variables (prefixed with `ROASTLOG_`)
/// 2. TOML config file at `~/.config/roastlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Roast timer configuration.
    pub timer: TimerConfig,
    /// Quick selector configuration.
    pub selector: SelectorConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/roastlog/roastlog.db`
    pub database_path: Option<PathBuf>,
}

/// Roast timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Wall-clock length of one roast second in milliseconds.
    pub tick_interval_ms: u64,
    /// Speed-up factor for rehearsals; 1 is real time.
    pub acceleration: u32,
    /// How long a notice stays up, in milliseconds.
    pub notice_timeout_ms: u64,
    /// Print a status line every this many roast seconds; 0 disables it.
    pub status_every_secs: u32,
}

/// Quick selector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Move the tens value along `advance_table` as the roast progresses.
    pub auto_advance: bool,
    /// `(seconds, base)` rows, ascending by seconds.
    pub advance_table: Vec<AdvanceStep>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            acceleration: 1,
            notice_timeout_ms: 3000,
            status_every_secs: 30,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            auto_advance: false,
            advance_table: default_advance_table(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.timer.tick_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "tick_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.timer.acceleration == 0 {
            return Err(Error::ConfigValidation {
                message: "acceleration must be at least 1".to_string(),
            });
        }

        let table = &self.selector.advance_table;
        for step in table {
            if step.base > MAX_BASE || step.base % 10 != 0 {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "advance_table base {} must be a multiple of 10 between 0 and {MAX_BASE}",
                        step.base
                    ),
                });
            }
        }
        if let Some(pair) = table.windows(2).find(|w| w[1].seconds <= w[0].seconds) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "advance_table must be strictly ascending in seconds ({} then {})",
                    pair[0].seconds, pair[1].seconds
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Wall-clock time between roast ticks, after acceleration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        let accel = u64::from(self.timer.acceleration.max(1));
        Duration::from_millis((self.timer.tick_interval_ms / accel).max(1))
    }

    /// How long a notice stays up, after acceleration.
    #[must_use]
    pub fn notice_timeout(&self) -> Duration {
        let accel = u64::from(self.timer.acceleration.max(1));
        Duration::from_millis((self.timer.notice_timeout_ms / accel).max(1))
    }

    /// Controller options derived from the selector settings.
    #[must_use]
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            auto_advance: self.selector.auto_advance,
            advance_table: self.selector.advance_table.clone(),
        }
    }
}
