//! Repository port for the global user credential store.

use crate::account::domain::User;
use crate::tenancy::{CompanyName, EmailAddress};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
///
/// Users are unique on `(email, company_name)`. The same email may exist in
/// several companies; global lookups return the oldest record.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateUser`] when the email already
    /// exists within the company.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Persists changes to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not exist.
    async fn update(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds the oldest user with the given email in any company.
    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>>;

    /// Finds the user with the given email in one company.
    async fn find_in_company(
        &self,
        email: &EmailAddress,
        company: &CompanyName,
    ) -> UserRepositoryResult<Option<User>>;

    /// Returns every user of a company, oldest first.
    async fn find_by_company(&self, company: &CompanyName) -> UserRepositoryResult<Vec<User>>;

    /// Returns `true` when the company has at least one admin.
    async fn admin_exists(&self, company: &CompanyName) -> UserRepositoryResult<bool>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// A user with the same email already exists in the company.
    #[error("user {email} already exists in company {company}")]
    DuplicateUser {
        /// Conflicting email.
        email: EmailAddress,
        /// Company of the existing user.
        company: CompanyName,
    },

    /// The user was not found.
    #[error("user {email} not found in company {company}")]
    NotFound {
        /// Email that was looked up.
        email: EmailAddress,
        /// Company that was searched.
        company: CompanyName,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
