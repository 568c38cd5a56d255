//! `PostgreSQL` repository implementation for user storage.

use super::{
    models::{UserChangeset, UserRow},
    schema::users,
};
use crate::account::{
    domain::{PasswordHash, PersistedUserData, Role, User},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::database::DbPool;
use crate::tenancy::{CompanyName, EmailAddress};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: DbPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserRepositoryError::persistence)?
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let row = user_to_row(user);
        let email = user.email().clone();
        let company = user.company_name().clone();

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateUser { email, company }
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let changeset = UserChangeset::from(user_to_row(user));
        let email = user.email().clone();
        let company = user.company_name().clone();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                users::table
                    .filter(users::email.eq(email.as_str()))
                    .filter(users::company_name.eq(company.as_str())),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(UserRepositoryError::persistence)?;

            if affected == 0 {
                return Err(UserRepositoryError::NotFound { email, company });
            }
            Ok(())
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        let email_key = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email.eq(email_key))
                .order(users::created_at.asc())
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_in_company(
        &self,
        email: &EmailAddress,
        company: &CompanyName,
    ) -> UserRepositoryResult<Option<User>> {
        let email_key = email.as_str().to_owned();
        let company_key = company.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email.eq(email_key))
                .filter(users::company_name.eq(company_key))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_company(&self, company: &CompanyName) -> UserRepositoryResult<Vec<User>> {
        let company_key = company.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = users::table
                .filter(users::company_name.eq(company_key))
                .order(users::created_at.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }

    async fn admin_exists(&self, company: &CompanyName) -> UserRepositoryResult<bool> {
        let company_key = company.as_str().to_owned();
        self.run_blocking(move |connection| {
            diesel::select(diesel::dsl::exists(
                users::table
                    .filter(users::company_name.eq(company_key))
                    .filter(users::role.eq(Role::Admin.as_str())),
            ))
            .get_result::<bool>(connection)
            .map_err(UserRepositoryError::persistence)
        })
        .await
    }
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        email: user.email().as_str().to_owned(),
        company_name: user.company_name().as_str().to_owned(),
        name: user.name().to_owned(),
        password_hash: user.password().as_str().to_owned(),
        role: user.role().as_str().to_owned(),
        is_first_login: user.is_first_login(),
        is_initial_admin: user.is_initial_admin(),
        created_at: user.created_at(),
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let data = PersistedUserData {
        email: EmailAddress::new(row.email).map_err(UserRepositoryError::persistence)?,
        name: row.name,
        password: PasswordHash::from_encoded(row.password_hash),
        role: Role::try_from(row.role.as_str()).map_err(UserRepositoryError::persistence)?,
        company_name: CompanyName::new(row.company_name)
            .map_err(UserRepositoryError::persistence)?,
        is_first_login: row.is_first_login,
        is_initial_admin: row.is_initial_admin,
        created_at: row.created_at,
    };
    Ok(User::from_persisted(data))
}
