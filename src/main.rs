use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use topic7_session::backend;
use topic7_session::config::{BackendConfig, ConfigError};
use topic7_session::session::Session;
use topic7_session::storage::{FileStore, StorageError};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("login rejected: username and password must be non-empty")]
    LoginRejected,
    #[error("session store failed: {0}")]
    Storage(#[from] StorageError),
    #[error("backend config invalid: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "topic7-session", about = "Local session and backend bootstrap CLI")]
struct Cli {
    #[arg(long, env = "SESSION_STORE_PATH", default_value = ".session.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the restored session.
    Status,
    /// Log in with any non-empty username and password.
    Login {
        username: String,
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Initialize the backend app from `BAAS_*` env vars and describe its handles.
    Backend,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Backend => describe_backend(),
        Command::Status => with_session(&cli.store, |_| Ok(())),
        Command::Login { username, password } => with_session(&cli.store, |session| {
            if session.login(&username, &password) { Ok(()) } else { Err(CliError::LoginRejected) }
        }),
        Command::Logout => with_session(&cli.store, |session| {
            session.logout();
            Ok(())
        }),
    }
}

/// Open the session over the store file, apply `f`, then print the result.
fn with_session(
    path: &Path,
    f: impl FnOnce(&mut Session<FileStore>) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let mut session = Session::new(FileStore::open(path)?);
    f(&mut session)?;
    print_status(&session);
    Ok(())
}

fn print_status(session: &Session<FileStore>) {
    match session.user() {
        Some(user) => println!("authenticated as {} <{}>", user.username, user.email),
        None => println!("not authenticated"),
    }
}

fn describe_backend() -> Result<(), CliError> {
    let app = backend::initialize_app(BackendConfig::from_env()?)?;
    let auth = app.auth();
    let db = app.firestore();
    println!("app:      {}", app.name());
    println!("auth:     {} (api key: {})", auth.auth_domain(), if auth.has_api_key() { "set" } else { "missing" });
    println!("database: {}", db.database_path());
    Ok(())
}
