//! Authentication, user creation and password management.

use crate::account::{
    domain::{AccountDomainError, Role, User, UserProfile},
    ports::{PasswordHashError, PasswordHasher, UserRepository, UserRepositoryError},
};
use crate::tenancy::{CompanyName, EmailAddress};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    email: String,
    name: String,
    password: String,
    role: Role,
}

impl CreateUserRequest {
    /// Creates a request with the user's credentials and role.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            role,
        }
    }
}

/// Request payload for changing a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    email: String,
    old_password: String,
    new_password: String,
    confirm_password: String,
    is_first_login: bool,
}

impl ChangePasswordRequest {
    /// Creates a request that verifies the current password.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        old_password: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            old_password: old_password.into(),
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
            is_first_login: false,
        }
    }

    /// Marks the request as part of the first-login flow, which skips the
    /// current-password check.
    #[must_use]
    pub const fn first_login(mut self) -> Self {
        self.is_first_login = true;
        self
    }
}

/// Service-level errors for authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] AccountDomainError),

    /// Login failed. Unknown users and wrong passwords are not distinguished.
    #[error("invalid email or password")]
    AuthenticationFailed,

    /// A user with the same email already exists in the company.
    #[error("user {email} already exists in company {company}")]
    Conflict {
        /// Conflicting email.
        email: EmailAddress,
        /// Company that already holds the email.
        company: CompanyName,
    },

    /// The company already has an admin.
    #[error("company {0} already has an admin")]
    AdminAlreadyExists(CompanyName),

    /// The current password did not match.
    #[error("the current password is incorrect")]
    InvalidCredentials,

    /// The new password and its confirmation differ.
    #[error("new password and confirmed password do not match")]
    PasswordMismatch,

    /// No user exists with the email.
    #[error("user {0} not found")]
    NotFound(EmailAddress),

    /// The password hasher failed.
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and user management service.
#[derive(Clone)]
pub struct AuthService<R, H, C>
where
    R: UserRepository,
    H: PasswordHasher,
    C: Clock + Send + Sync,
{
    users: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<C>,
}

impl<R, H, C> AuthService<R, H, C>
where
    R: UserRepository,
    H: PasswordHasher,
    C: Clock + Send + Sync,
{
    /// Creates a new authentication service.
    #[must_use]
    pub const fn new(users: Arc<R>, hasher: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }

    /// Verifies credentials and returns the matching user.
    ///
    /// The lookup is global: when the email exists in several companies the
    /// oldest record is checked.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] for an unknown email or a
    /// wrong password, and [`AuthError::Repository`] or
    /// [`AuthError::Hashing`] for infrastructure failures.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<User> {
        let Ok(address) = EmailAddress::new(email) else {
            warn!(email, "login rejected: malformed email");
            return Err(AuthError::AuthenticationFailed);
        };
        let Some(user) = self.users.find_by_email(&address).await? else {
            warn!(email = %address, "login failed: user not found");
            return Err(AuthError::AuthenticationFailed);
        };
        if !self.hasher.verify(password, user.password())? {
            warn!(email = %address, "login failed: password check failed");
            return Err(AuthError::AuthenticationFailed);
        }
        info!(email = %address, company = %user.company_name(), "user logged in");
        Ok(user)
    }

    /// Creates a user in a company.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] when the email already exists in the
    /// company and [`AuthError::Domain`] when the input is invalid.
    pub async fn create_user(
        &self,
        company: &CompanyName,
        request: CreateUserRequest,
        is_initial_admin: bool,
    ) -> AuthResult<User> {
        let profile = UserProfile::new(request.email, request.name, request.role)?;
        if request.password.is_empty() {
            return Err(AccountDomainError::EmptyPassword.into());
        }
        if self
            .users
            .find_in_company(profile.email(), company)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict {
                email: profile.email().clone(),
                company: company.clone(),
            });
        }

        let hash = self.hasher.hash(&request.password)?;
        let user = User::new(profile, hash, company.clone(), is_initial_admin, &*self.clock);
        self.users.store(&user).await.map_err(|err| match err {
            UserRepositoryError::DuplicateUser { email, company } => {
                AuthError::Conflict { email, company }
            }
            other => AuthError::Repository(other),
        })?;
        info!(email = %user.email(), company = %company, role = user.role().as_str(), "user created");
        Ok(user)
    }

    /// Changes a user's password and clears the first-login flag.
    ///
    /// On the first-login path the current password is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the current password is
    /// wrong or the user is unknown outside the first-login path,
    /// [`AuthError::PasswordMismatch`] when the confirmation differs, and
    /// [`AuthError::NotFound`] when a first-login user is unknown.
    pub async fn change_password(&self, request: ChangePasswordRequest) -> AuthResult<User> {
        let address = EmailAddress::new(request.email)
            .map_err(|err| AuthError::Domain(AccountDomainError::Tenancy(err)))?;
        let existing = self.users.find_by_email(&address).await?;

        if !request.is_first_login {
            let verified = match &existing {
                Some(user) => self.hasher.verify(&request.old_password, user.password())?,
                None => false,
            };
            if !verified {
                warn!(email = %address, "password change rejected: current password incorrect");
                return Err(AuthError::InvalidCredentials);
            }
        }

        if request.new_password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if request.new_password.is_empty() {
            return Err(AccountDomainError::EmptyPassword.into());
        }

        let mut user = existing.ok_or_else(|| AuthError::NotFound(address.clone()))?;
        user.change_password(self.hasher.hash(&request.new_password)?);
        self.users.update(&user).await?;
        info!(email = %address, "password changed");
        Ok(user)
    }

    /// Returns `true` when the company has at least one admin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Repository`] when the lookup fails.
    pub async fn admin_exists(&self, company: &CompanyName) -> AuthResult<bool> {
        Ok(self.users.admin_exists(company).await?)
    }

    /// Creates the first admin of a company.
    ///
    /// The request's role is ignored; the user is always an admin flagged as
    /// the initial admin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AdminAlreadyExists`] when the company already has
    /// an admin, plus any error of [`Self::create_user`].
    pub async fn bootstrap_admin(
        &self,
        company: &CompanyName,
        request: CreateUserRequest,
    ) -> AuthResult<User> {
        if self.users.admin_exists(company).await? {
            return Err(AuthError::AdminAlreadyExists(company.clone()));
        }
        let admin_request = CreateUserRequest {
            role: Role::Admin,
            ..request
        };
        self.create_user(company, admin_request, true).await
    }

    /// Returns every user of a company, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Repository`] when the lookup fails.
    pub async fn list_company_users(&self, company: &CompanyName) -> AuthResult<Vec<User>> {
        Ok(self.users.find_by_company(company).await?)
    }
}
