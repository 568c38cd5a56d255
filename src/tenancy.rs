//! Tenant and identity scalars shared by the account and task contexts.
//!
//! Every company owns one logical task partition named after it, while user
//! credentials live in a single global collection. Tasks refer to users by
//! [`EmailAddress`] only; the reference is never followed for ownership.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing tenancy scalars.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenancyError {
    /// The company name is empty after trimming.
    #[error("company name must not be empty")]
    EmptyCompanyName,

    /// The email address is not of the form `local@domain`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// Name of a company, used as the tenant partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyName(String);

impl CompanyName {
    /// Creates a validated company name.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::EmptyCompanyName`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TenancyError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TenancyError::EmptyCompanyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the company name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CompanyName {
    type Error = TenancyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompanyName> for String {
    fn from(value: CompanyName) -> Self {
        value.0
    }
}

impl AsRef<str> for CompanyName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized user email address.
///
/// Addresses are trimmed and lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::InvalidEmail`] unless the value contains exactly
    /// one `@` separating non-empty local and domain parts, with no
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, TenancyError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        let mut parts = normalized.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        let is_valid = !local.is_empty()
            && !domain.is_empty()
            && parts.next().is_none()
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(TenancyError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the email address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = TenancyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
