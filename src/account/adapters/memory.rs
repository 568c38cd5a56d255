//! In-memory user repository for tests and embedding.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::account::{
    domain::User,
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::tenancy::{CompanyName, EmailAddress};

/// Thread-safe in-memory user repository.
///
/// Users are kept in insertion order so global lookups return the oldest
/// matching record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, predicate: impl Fn(&User) -> bool) -> UserRepositoryResult<Vec<User>> {
        let users = self.users.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(users.iter().filter(|user| predicate(user)).cloned().collect())
    }
}

fn same_key(user: &User, email: &EmailAddress, company: &CompanyName) -> bool {
    user.email() == email && user.company_name() == company
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.users.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if users
            .iter()
            .any(|existing| same_key(existing, user.email(), user.company_name()))
        {
            return Err(UserRepositoryError::DuplicateUser {
                email: user.email().clone(),
                company: user.company_name().clone(),
            });
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.users.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = users
            .iter_mut()
            .find(|existing| same_key(existing, user.email(), user.company_name()))
            .ok_or_else(|| UserRepositoryError::NotFound {
                email: user.email().clone(),
                company: user.company_name().clone(),
            })?;
        *stored = user.clone();
        Ok(())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        Ok(self
            .select(|user| user.email() == email)?
            .into_iter()
            .next())
    }

    async fn find_in_company(
        &self,
        email: &EmailAddress,
        company: &CompanyName,
    ) -> UserRepositoryResult<Option<User>> {
        Ok(self
            .select(|user| same_key(user, email, company))?
            .into_iter()
            .next())
    }

    async fn find_by_company(&self, company: &CompanyName) -> UserRepositoryResult<Vec<User>> {
        self.select(|user| user.company_name() == company)
    }

    async fn admin_exists(&self, company: &CompanyName) -> UserRepositoryResult<bool> {
        Ok(!self
            .select(|user| user.is_admin() && user.company_name() == company)?
            .is_empty())
    }
}
