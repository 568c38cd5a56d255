//! `PostgreSQL` user repository behaviour: uniqueness, lookup order and
//! company scoping.

use crate::postgres::helpers::{
    CleanupGuard, PostgresCluster, company, email, ensure_template, postgres_cluster,
    test_runtime,
};
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;
use taskboard::account::adapters::PostgresUserRepository;
use taskboard::account::domain::{PasswordHash, PersistedUserData, Role, User};
use taskboard::account::ports::{UserRepository, UserRepositoryError};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn user(address: &str, company_name: &str, role: Role, created_at: DateTime<Utc>) -> User {
    User::from_persisted(PersistedUserData {
        email: email(address),
        name: "Ada Lovelace".to_owned(),
        password: PasswordHash::from_encoded("$2b$04$abcdefghijklmnopqrstuv"),
        role,
        company_name: company(company_name),
        is_first_login: true,
        is_initial_admin: false,
        created_at,
    })
}

#[rstest]
fn duplicate_users_in_one_company_are_rejected(postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "user_duplicate").expect("database");
    let repo = PostgresUserRepository::new(pool);
    let rt = test_runtime().expect("tokio runtime");

    let first = user("ada@acme.test", "Acme", Role::Admin, at(9));
    rt.block_on(repo.store(&first)).expect("first store");

    let again = user("ADA@acme.test", "Acme", Role::User, at(10));
    let result = rt.block_on(repo.store(&again));
    assert!(
        matches!(
            &result,
            Err(UserRepositoryError::DuplicateUser { email: e, company: c })
                if e.as_str() == "ada@acme.test" && c.as_str() == "Acme"
        ),
        "expected DuplicateUser, got: {result:?}"
    );

    let elsewhere = user("ada@acme.test", "Globex", Role::User, at(11));
    rt.block_on(repo.store(&elsewhere))
        .expect("same email in another company");

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn email_lookup_returns_the_oldest_record(postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "user_oldest").expect("database");
    let repo = PostgresUserRepository::new(pool);
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(repo.store(&user("ada@acme.test", "Globex", Role::User, at(12))))
        .expect("store newer");
    rt.block_on(repo.store(&user("ada@acme.test", "Acme", Role::Admin, at(8))))
        .expect("store older");

    let found = rt
        .block_on(repo.find_by_email(&email("ada@acme.test")))
        .expect("lookup")
        .expect("user exists");
    assert_eq!(found.company_name().as_str(), "Acme");
    assert_eq!(found.created_at(), at(8));

    let scoped = rt
        .block_on(repo.find_in_company(&email("ada@acme.test"), &company("Globex")))
        .expect("scoped lookup")
        .expect("user exists in Globex");
    assert_eq!(scoped.role(), Role::User);

    let missing = rt
        .block_on(repo.find_by_email(&email("nobody@acme.test")))
        .expect("lookup");
    assert!(missing.is_none());

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn updates_persist_and_missing_users_are_not_found(postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "user_update").expect("database");
    let repo = PostgresUserRepository::new(pool);
    let rt = test_runtime().expect("tokio runtime");

    let mut ada = user("ada@acme.test", "Acme", Role::User, at(9));
    rt.block_on(repo.store(&ada)).expect("store");
    ada.change_password(PasswordHash::from_encoded("$2b$04$zyxwvutsrqponmlkjihgfe"));
    rt.block_on(repo.update(&ada)).expect("update");

    let stored = rt
        .block_on(repo.find_in_company(&email("ada@acme.test"), &company("Acme")))
        .expect("lookup")
        .expect("user exists");
    assert_eq!(stored.password().as_str(), "$2b$04$zyxwvutsrqponmlkjihgfe");
    assert!(!stored.is_first_login());

    let stranger = user("ada@acme.test", "Globex", Role::User, at(9));
    let result = rt.block_on(repo.update(&stranger));
    assert!(
        matches!(
            &result,
            Err(UserRepositoryError::NotFound { company: c, .. }) if c.as_str() == "Globex"
        ),
        "expected NotFound, got: {result:?}"
    );

    drop(repo);
    guard.cleanup().expect("cleanup database");
}

#[rstest]
fn company_queries_are_scoped(postgres_cluster: PostgresCluster) {
    let cluster = postgres_cluster;
    ensure_template(cluster).expect("template setup");
    let (guard, pool) = CleanupGuard::create(cluster, "user_scope").expect("database");
    let repo = PostgresUserRepository::new(pool);
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(repo.store(&user("grace@acme.test", "Acme", Role::Admin, at(9))))
        .expect("store admin");
    rt.block_on(repo.store(&user("ada@acme.test", "Acme", Role::User, at(10))))
        .expect("store user");
    rt.block_on(repo.store(&user("linus@globex.test", "Globex", Role::User, at(11))))
        .expect("store other company");

    assert!(rt.block_on(repo.admin_exists(&company("Acme"))).expect("admin check"));
    assert!(!rt.block_on(repo.admin_exists(&company("Globex"))).expect("admin check"));

    let members = rt
        .block_on(repo.find_by_company(&company("Acme")))
        .expect("list company");
    let addresses: Vec<&str> = members.iter().map(|member| member.email().as_str()).collect();
    assert_eq!(addresses, ["grace@acme.test", "ada@acme.test"]);

    drop(repo);
    guard.cleanup().expect("cleanup database");
}
