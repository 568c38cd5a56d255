//! Port for resolving user display names referenced by tasks.

use crate::tenancy::{CompanyName, EmailAddress};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Lookup of user display names by email within a company.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the display names of the known users among `emails`.
    ///
    /// Unknown emails are simply absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the lookup fails.
    async fn display_names(
        &self,
        company: &CompanyName,
        emails: &[EmailAddress],
    ) -> Result<HashMap<EmailAddress, String>, UserDirectoryError>;
}

/// Error returned when the user directory cannot be queried.
#[derive(Debug, Clone, Error)]
#[error("user directory lookup failed: {0}")]
pub struct UserDirectoryError(pub Arc<dyn std::error::Error + Send + Sync>);

impl UserDirectoryError {
    /// Wraps an underlying lookup error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
