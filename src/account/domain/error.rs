//! Error types for account domain validation and parsing.

use crate::tenancy::TenancyError;
use thiserror::Error;

/// Errors returned while constructing account domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountDomainError {
    /// The email or company name is malformed.
    #[error(transparent)]
    Tenancy(#[from] TenancyError),

    /// The display name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyName,

    /// The password is empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Error returned while parsing roles from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
