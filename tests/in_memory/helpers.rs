//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::account::{
    adapters::{BcryptPasswordHasher, InMemoryUserRepository, RepositoryUserDirectory},
    services::AuthService,
};
use taskboard::task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService};
use taskboard::tenancy::CompanyName;

/// Bcrypt cost used by integration tests.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Task service wired to in-memory adapters.
pub type MemoryTaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    RepositoryUserDirectory<InMemoryUserRepository>,
    DefaultClock,
>;

/// Auth service wired to in-memory adapters.
pub type MemoryAuthService =
    AuthService<InMemoryUserRepository, BcryptPasswordHasher, DefaultClock>;

/// Both services sharing one user store.
pub struct App {
    pub tasks: MemoryTaskService,
    pub auth: MemoryAuthService,
}

/// Provides services over fresh in-memory stores.
#[fixture]
pub fn app() -> App {
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);
    App {
        tasks: TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(RepositoryUserDirectory::new(Arc::clone(&users))),
            Arc::clone(&clock),
        ),
        auth: AuthService::new(
            users,
            Arc::new(BcryptPasswordHasher::new(TEST_BCRYPT_COST)),
            clock,
        ),
    }
}

/// Provides the default test company.
#[fixture]
pub fn company() -> CompanyName {
    CompanyName::new("Acme").expect("valid company name")
}
