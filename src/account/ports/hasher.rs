//! Port for salted password hashing.

use crate::account::domain::PasswordHash;
use thiserror::Error;

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError`] when the hashing backend fails.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Checks a plaintext password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError`] when the stored hash is malformed.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}

/// Error raised by password hashing backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(pub String);
