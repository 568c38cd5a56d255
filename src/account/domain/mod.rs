//! Domain model for user credentials.

mod error;
mod user;

pub use error::{AccountDomainError, ParseRoleError};
pub use user::{PasswordHash, PersistedUserData, Role, User, UserProfile};
