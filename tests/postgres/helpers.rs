//! Shared setup for the `PostgreSQL` repository tests.

use super::cluster::{BoxError, ManagedCluster};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use rstest::fixture;
use std::collections::BTreeSet;
use taskboard::config::DatabaseConfig;
use taskboard::database::{DbPool, build_pool};
use taskboard::tenancy::{CompanyName, EmailAddress};
use uuid::Uuid;

pub use super::cluster::{PostgresCluster, postgres_cluster};

const TEMPLATE_DB: &str = "taskboard_test_template";
const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-18-000000_create_users_and_tasks/up.sql");

/// Builds the runtime used to drive the async repositories.
pub fn test_runtime() -> Result<tokio::runtime::Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Creates the migrated template database once per cluster.
pub fn ensure_template(cluster: &ManagedCluster) -> Result<(), BoxError> {
    cluster.ensure_template(TEMPLATE_DB, apply_migrations)
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut connection = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    connection
        .batch_execute(CREATE_SCHEMA_SQL)
        .map_err(|err| Box::new(err) as BoxError)
}

/// Per-test database cloned from the template, dropped on cleanup.
pub struct CleanupGuard {
    cluster: &'static ManagedCluster,
    db_name: String,
    dropped: bool,
}

impl CleanupGuard {
    /// Creates a fresh database for `prefix`, returning its guard and pool.
    pub fn create(
        cluster: &'static ManagedCluster,
        prefix: &str,
    ) -> Result<(Self, DbPool), BoxError> {
        let db_name = format!("{prefix}_{}", Uuid::new_v4().simple());
        cluster.create_database_from_template(&db_name, TEMPLATE_DB)?;
        let guard = Self {
            cluster,
            db_name,
            dropped: false,
        };
        let config = DatabaseConfig {
            url: cluster.database_url(&guard.db_name),
            max_connections: 2,
        };
        let pool = build_pool(&config).map_err(|err| Box::new(err) as BoxError)?;
        Ok((guard, pool))
    }

    /// Drops the database, reporting any failure.
    pub fn cleanup(mut self) -> Result<(), BoxError> {
        self.dropped = true;
        self.cluster.drop_database(&self.db_name)
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.dropped {
            drop(self.cluster.drop_database(&self.db_name));
        }
    }
}

pub fn company(name: &str) -> CompanyName {
    CompanyName::new(name).expect("valid company name")
}

pub fn email(address: &str) -> EmailAddress {
    EmailAddress::new(address).expect("valid email")
}

pub fn emails(addresses: &[&str]) -> BTreeSet<EmailAddress> {
    addresses.iter().map(|address| email(address)).collect()
}
