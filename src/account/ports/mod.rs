//! Port contracts for the credential store.

pub mod hasher;
pub mod repository;

pub use hasher::{PasswordHashError, PasswordHasher};
pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
