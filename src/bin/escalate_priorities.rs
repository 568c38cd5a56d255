//! Runs the priority escalation sweep for one company.
//!
//! Usage:
//!
//! ```text
//! escalate_priorities <company> [config-path]
//! ```
//!
//! Configuration is read from `config-path` when given, otherwise from an
//! optional `taskboard.toml` in the working directory, and is overridden by
//! `TASKBOARD__*` environment variables. Every task with two or more
//! dependents that is not already high priority is raised to high.

use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use taskboard::account::adapters::{PostgresUserRepository, RepositoryUserDirectory};
use taskboard::config::{AppConfig, ConfigError};
use taskboard::database::build_pool;
use taskboard::task::adapters::postgres::PostgresTaskRepository;
use taskboard::task::services::{TaskLifecycleError, TaskLifecycleService};
use taskboard::telemetry::{self, TelemetryError};
use taskboard::tenancy::{CompanyName, TenancyError};
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during an escalation run.
#[derive(Debug, Error)]
enum SweepError {
    #[error("usage: escalate_priorities <company> [config-path]")]
    Usage,
    #[error(transparent)]
    Company(#[from] TenancyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to connect to the database: {0}")]
    Database(#[from] diesel::r2d2::PoolError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error(transparent)]
    Escalation(#[from] TaskLifecycleError),
}

struct Args {
    company: CompanyName,
    config_path: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, SweepError> {
    let company = args.next().ok_or(SweepError::Usage)?;
    let config_path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return Err(SweepError::Usage);
    }
    Ok(Args {
        company: CompanyName::new(company)?,
        config_path,
    })
}

fn main() -> Result<(), BoxError> {
    run().map_err(Into::into)
}

fn run() -> Result<(), SweepError> {
    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config_path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    telemetry::init(&config.logging)?;

    let pool = build_pool(&config.database)?;
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let users = Arc::new(PostgresUserRepository::new(pool));
    let directory = Arc::new(RepositoryUserDirectory::new(users));
    let service = TaskLifecycleService::new(tasks, directory, Arc::new(DefaultClock));

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SweepError::RuntimeInit)?;
    let report = runtime.block_on(service.escalate_priorities(&args.company))?;

    info!(
        company = %args.company,
        escalated = report.escalated().len(),
        task_ids = ?report.escalated(),
        "priority escalation complete"
    );
    Ok(())
}
