//! User credential records.

use super::{AccountDomainError, ParseRoleError};
use crate::tenancy::{CompanyName, EmailAddress};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization role of a user within their company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May create tasks and manage users.
    Admin,
    /// May update tasks assigned to them.
    User,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Salted password hash.
///
/// `Debug` output never reveals the hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an encoded hash produced by a password hasher.
    #[must_use]
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Validated fields for a user about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    email: EmailAddress,
    name: String,
    role: Role,
}

impl UserProfile {
    /// Creates a validated profile.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError`] when the email is malformed or the name
    /// is blank.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Result<Self, AccountDomainError> {
        let parsed_email = EmailAddress::new(email)?;
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(AccountDomainError::EmptyName);
        }
        Ok(Self {
            email: parsed_email,
            name: trimmed.to_owned(),
            role,
        })
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }
}

/// A user credential record in the global users collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    email: EmailAddress,
    name: String,
    password: PasswordHash,
    role: Role,
    company_name: CompanyName,
    is_first_login: bool,
    is_initial_admin: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted email.
    pub email: EmailAddress,
    /// Persisted display name.
    pub name: String,
    /// Persisted password hash.
    pub password: PasswordHash,
    /// Persisted role.
    pub role: Role,
    /// Persisted company.
    pub company_name: CompanyName,
    /// Persisted first-login flag.
    pub is_first_login: bool,
    /// Persisted bootstrap-admin flag.
    pub is_initial_admin: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user record from a validated profile and a password hash.
    ///
    /// New users start with `is_first_login` cleared.
    #[must_use]
    pub fn new(
        profile: UserProfile,
        password: PasswordHash,
        company_name: CompanyName,
        is_initial_admin: bool,
        clock: &impl Clock,
    ) -> Self {
        Self {
            email: profile.email,
            name: profile.name,
            password,
            role: profile.role,
            company_name,
            is_first_login: false,
            is_initial_admin,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            email: data.email,
            name: data.name,
            password: data.password,
            role: data.role,
            company_name: data.company_name,
            is_first_login: data.is_first_login,
            is_initial_admin: data.is_initial_admin,
            created_at: data.created_at,
        }
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the full display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the first word of the display name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Returns the author label recorded on status updates, e.g.
    /// `"Ada (ada@example.com)"`.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.first_name(), self.email)
    }

    /// Returns the stored password hash.
    #[must_use]
    pub const fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns the company the user belongs to.
    #[must_use]
    pub const fn company_name(&self) -> &CompanyName {
        &self.company_name
    }

    /// Returns `true` while the user still has to change their password.
    #[must_use]
    pub const fn is_first_login(&self) -> bool {
        self.is_first_login
    }

    /// Returns `true` for the bootstrap admin of the company.
    #[must_use]
    pub const fn is_initial_admin(&self) -> bool {
        self.is_initial_admin
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the password hash and clears the first-login flag.
    pub fn change_password(&mut self, password: PasswordHash) {
        self.password = password;
        self.is_first_login = false;
    }
}
