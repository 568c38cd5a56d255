//! User directory backed by the credential store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::account::ports::UserRepository;
use crate::task::ports::{UserDirectory, UserDirectoryError};
use crate::tenancy::{CompanyName, EmailAddress};

/// Resolves task assignee names through a [`UserRepository`].
#[derive(Debug)]
pub struct RepositoryUserDirectory<R>
where
    R: UserRepository,
{
    users: Arc<R>,
}

impl<R> RepositoryUserDirectory<R>
where
    R: UserRepository,
{
    /// Creates a directory over the given user repository.
    #[must_use]
    pub const fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

impl<R> Clone for RepositoryUserDirectory<R>
where
    R: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
        }
    }
}

#[async_trait]
impl<R> UserDirectory for RepositoryUserDirectory<R>
where
    R: UserRepository,
{
    async fn display_names(
        &self,
        company: &CompanyName,
        emails: &[EmailAddress],
    ) -> Result<HashMap<EmailAddress, String>, UserDirectoryError> {
        let members = self
            .users
            .find_by_company(company)
            .await
            .map_err(UserDirectoryError::new)?;
        Ok(members
            .into_iter()
            .filter(|user| emails.contains(user.email()))
            .map(|user| (user.email().clone(), user.name().to_owned()))
            .collect())
    }
}
