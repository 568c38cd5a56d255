//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod directory;
pub mod repository;

pub use directory::{UserDirectory, UserDirectoryError};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
