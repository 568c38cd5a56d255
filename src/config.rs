//! Layered application configuration.
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! then environment variables prefixed with `TASKBOARD__` using `__` as the
//! nesting separator (for example `TASKBOARD__DATABASE__URL`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, resolved relative to the working
/// directory with any supported extension.
pub const DEFAULT_CONFIG_FILE: &str = "taskboard";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "TASKBOARD";

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was loaded but is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    /// Work factor used when hashing passwords.
    pub bcrypt_cost: u32,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info,taskboard=debug`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from the default file (if present) and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source is malformed or a value is out
    /// of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Loads configuration from an explicit file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing or malformed, or a
    /// value is out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let loaded: Self = Config::builder()
            .set_default("database.url", "postgres://localhost/taskboard")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.bcrypt_cost", bcrypt::DEFAULT_COST)?
            .set_default("logging.filter", "info")?
            .set_default("logging.json", false)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "database.url",
                reason: "must not be empty".to_owned(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_connections",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                field: "auth.bcrypt_cost",
                reason: format!(
                    "{} is outside {MIN_BCRYPT_COST}..={MAX_BCRYPT_COST}",
                    self.auth.bcrypt_cost
                ),
            });
        }
        Ok(())
    }
}
