//! Per-request identity passed explicitly to the services.

use crate::account::domain::{Role, User};
use crate::task::domain::{TaskId, TaskStatus};
use crate::task::services::UpdateTaskStatusRequest;
use crate::tenancy::{CompanyName, EmailAddress};

/// Identity of the logged-in user for one request.
///
/// Built from the [`User`] returned by login and handed to every service
/// call that needs to know who is acting and for which company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user_email: EmailAddress,
    display_label: String,
    company: CompanyName,
    role: Role,
}

impl RequestContext {
    /// Creates the context for an authenticated user.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            user_email: user.email().clone(),
            display_label: user.display_label(),
            company: user.company_name().clone(),
            role: user.role(),
        }
    }

    /// Returns the acting user's email.
    #[must_use]
    pub const fn user_email(&self) -> &EmailAddress {
        &self.user_email
    }

    /// Returns the author label recorded on status updates.
    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// Returns the company partition the request operates on.
    #[must_use]
    pub const fn company(&self) -> &CompanyName {
        &self.company
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` when the acting user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Starts a status update authored by the acting user.
    #[must_use]
    pub fn status_update(&self, task_id: TaskId, status: TaskStatus) -> UpdateTaskStatusRequest {
        UpdateTaskStatusRequest::new(task_id, status, self.display_label.clone())
    }
}
