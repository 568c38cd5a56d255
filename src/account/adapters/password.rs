//! Bcrypt implementation of the password hashing port.

use crate::account::{
    domain::PasswordHash,
    ports::{PasswordHashError, PasswordHasher},
};

/// Password hasher backed by bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Creates a hasher with the given bcrypt cost.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Returns the configured cost.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        bcrypt::hash(password, self.cost)
            .map(PasswordHash::from_encoded)
            .map_err(|err| PasswordHashError(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        bcrypt::verify(password, hash.as_str()).map_err(|err| PasswordHashError(err.to_string()))
    }
}
