//! Adapter implementations of the account ports.

pub mod directory;
pub mod memory;
pub mod password;
pub mod postgres;

pub use directory::RepositoryUserDirectory;
pub use memory::InMemoryUserRepository;
pub use password::BcryptPasswordHasher;
pub use postgres::PostgresUserRepository;
