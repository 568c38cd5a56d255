//! Diesel row models for user persistence.

use super::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Full user row, used for both queries and inserts.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Normalized email address.
    pub email: String,
    /// Company the user belongs to.
    pub company_name: String,
    /// Display name.
    pub name: String,
    /// Salted password hash.
    pub password_hash: String,
    /// Authorization role.
    pub role: String,
    /// Whether the user must change their password.
    pub is_first_login: bool,
    /// Whether the user is the bootstrap admin.
    pub is_initial_admin: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Mutable user columns written by updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    /// Display name.
    pub name: String,
    /// Salted password hash.
    pub password_hash: String,
    /// Authorization role.
    pub role: String,
    /// Whether the user must change their password.
    pub is_first_login: bool,
    /// Whether the user is the bootstrap admin.
    pub is_initial_admin: bool,
}

impl From<UserRow> for UserChangeset {
    fn from(row: UserRow) -> Self {
        Self {
            name: row.name,
            password_hash: row.password_hash,
            role: row.role,
            is_first_login: row.is_first_login,
            is_initial_admin: row.is_initial_admin,
        }
    }
}
