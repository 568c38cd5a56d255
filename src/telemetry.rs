//! Structured logging setup.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        /// Directive that failed to parse.
        directive: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber is already installed.
    #[error("global tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the [`EnvFilter`] for a logging configuration.
///
/// A non-empty `RUST_LOG` takes precedence over the configured directive.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the chosen directive is
/// malformed.
pub fn filter_for(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok(), config)
}

fn filter_from(
    env_directive: Option<String>,
    config: &LoggingConfig,
) -> Result<EnvFilter, TelemetryError> {
    let directive = env_directive
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone());
    EnvFilter::try_new(&directive)
        .map_err(|source| TelemetryError::InvalidFilter { directive, source })
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is malformed or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = filter_for(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}
