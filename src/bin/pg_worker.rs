//! Runs one embedded `PostgreSQL` lifecycle step for the integration tests.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <payload-path>
//! ```
//!
//! The payload is the JSON `WorkerPayload` written by
//! `pg-embed-setup-unpriv`: cluster settings plus environment overrides.
//! When started as root the worker switches to `nobody` before touching the
//! data directory, since `PostgreSQL` refuses to run as root.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use thiserror::Error;
#[cfg(unix)]
use tokio::runtime::Builder;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

/// Errors that can occur while running a lifecycle step.
#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("usage: pg_worker <setup|start|stop> <payload-path>")]
    Usage,
    #[error("unknown operation '{0}'; expected setup, start or stop")]
    UnknownOperation(String),
    #[error("failed to read payload: {0}")]
    PayloadRead(#[source] BoxError),
    #[error("failed to parse payload: {0}")]
    PayloadParse(#[from] serde_json::Error),
    #[error("invalid cluster settings: {0}")]
    Settings(String),
    #[error("failed to switch to '{user}': {reason}")]
    PrivilegeDrop { user: String, reason: String },
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("postgres {operation} failed: {reason}")]
    Postgres {
        operation: Operation,
        reason: String,
    },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    fn parse(raw: &str) -> Result<Self, WorkerError> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::UnknownOperation(other.to_owned())),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

#[cfg(unix)]
impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    run(std::env::args().skip(1)).map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}

#[cfg(unix)]
fn run(args: impl Iterator<Item = String>) -> Result<(), WorkerError> {
    let (operation, payload_path) = parse_args(args)?;
    let payload = load_payload(&payload_path)?;
    drop_privileges_if_root(UNPRIVILEGED_USER)?;

    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::Settings(err.to_string()))?;
    apply_environment(&payload.environment);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::RuntimeInit)?;
    // Dropping the handle would stop the server this process just started.
    let mut postgres = std::mem::ManuallyDrop::new(PostgreSQL::new(settings));
    runtime.block_on(execute(operation, &mut postgres))
}

#[cfg(unix)]
fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(Operation, Utf8PathBuf), WorkerError> {
    let operation = Operation::parse(&args.next().ok_or(WorkerError::Usage)?)?;
    let payload_path = args.next().map(Utf8PathBuf::from).ok_or(WorkerError::Usage)?;
    if args.next().is_some() {
        return Err(WorkerError::Usage);
    }
    Ok((operation, payload_path))
}

#[cfg(unix)]
fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let bytes = read_payload(path).map_err(WorkerError::PayloadRead)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(unix)]
fn read_payload(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    let mut file = dir.open(relative.as_std_path())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(unix)]
fn drop_privileges_if_root(username: &str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }
    let failure = |reason: String| WorkerError::PrivilegeDrop {
        user: username.to_owned(),
        reason,
    };

    let user = User::from_name(username)
        .map_err(|err| failure(err.to_string()))?
        .ok_or_else(|| failure("no such user".to_owned()))?;
    let name = CString::new(user.name.clone()).map_err(|err| failure(err.to_string()))?;
    initgroups(&name, user.gid).map_err(|err| failure(err.to_string()))?;
    setgid(user.gid).map_err(|err| failure(err.to_string()))?;
    setuid(user.uid).map_err(|err| failure(err.to_string()))?;

    // SAFETY: no other threads exist yet; the runtime is built afterwards.
    unsafe {
        std::env::set_var("HOME", &user.dir);
        std::env::set_var("USER", &user.name);
        std::env::set_var("LOGNAME", &user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the worker is still single-threaded here.
        unsafe {
            match value {
                Some(secret) => std::env::set_var(key, secret.expose()),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[cfg(unix)]
async fn execute(operation: Operation, postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    match operation {
        Operation::Setup => {
            postgres
                .setup()
                .await
                .map_err(|err| postgres_failure(operation, &err))?;
            start_if_stopped(operation, postgres).await
        }
        Operation::Start => start_if_stopped(operation, postgres).await,
        Operation::Stop => postgres
            .stop()
            .await
            .map_err(|err| postgres_failure(operation, &err)),
    }
}

#[cfg(unix)]
async fn start_if_stopped(operation: Operation, postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres
        .start()
        .await
        .map_err(|err| postgres_failure(operation, &err))
}

#[cfg(unix)]
fn postgres_failure(operation: Operation, err: &impl std::fmt::Display) -> WorkerError {
    WorkerError::Postgres {
        operation,
        reason: err.to_string(),
    }
}
