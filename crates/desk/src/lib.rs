//! Wiring for the `desk` binary: command line options, logging and
//! the application `Context`.
use accounts::{Account, Accounts, AccountsPlugin, IdentityProvider, LocalIdentityProvider};
use clap::Parser;
use clap::builder::FalseyValueParser;
use dashboard::DashboardPlugin;
use framework::prelude::*;
use roster::{RosterContextExt, RosterPlugin, SeedMode, bundled_fixture, load_fixture, seed};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Command line options. Anything after the options is run as a
/// command; with no command the terminal dashboard opens.
#[derive(Parser, Debug, Clone)]
#[command(name = "desk", version, about = "Browse and edit trainer profiles")]
pub struct Cli {
    /// Database file. Defaults to the platform data directory.
    #[arg(long, env = "TRAINER_DESK_DB")]
    pub db: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk.
    #[arg(long, env = "TRAINER_DESK_IN_MEMORY", value_parser = FalseyValueParser::new())]
    pub in_memory: bool,

    /// Fixture used to seed an empty roster. Defaults to the bundled
    /// sample roster.
    #[arg(long, env = "TRAINER_DESK_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Log file. Defaults to the platform data directory.
    #[arg(long, env = "TRAINER_DESK_LOG")]
    pub log_file: Option<PathBuf>,

    #[arg(long, env = "TRAINER_DESK_ADMIN_EMAIL", default_value = "admin@example.com")]
    pub admin_email: String,

    /// Enables the admin account when set.
    #[arg(long, env = "TRAINER_DESK_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Gives every trainer on the roster an account with this password.
    #[arg(long, env = "TRAINER_DESK_TRAINER_PASSWORD", hide_env_values = true)]
    pub trainer_password: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// The command to run, quoted for `Context::execute`.
    pub fn command_line(&self) -> Result<String> {
        if self.command.is_empty() {
            return Ok("tui".into());
        }
        shlex::try_join(self.command.iter().map(String::as_str))
            .map_err(|e| Error::Command(e.to_string()))
    }
}

/// Sends `tracing` output to the log file so it never lands on the
/// terminal the dashboard draws to. Returns the file in use.
pub fn init_logging(cli: &Cli) -> Result<PathBuf> {
    let path = match &cli.log_file {
        Some(path) => path.clone(),
        None => DataDirs::locate()?.log_path(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::new(format!("logging already initialised: {e}")))?;
    Ok(path)
}

/// Builds a started `Context` with every plugin, a seeded roster and
/// the configured accounts.
pub fn build_context(cli: &Cli) -> Result<Context> {
    let mut context = Context::new();
    if cli.in_memory {
        context.in_memory_db(true);
    } else if let Some(db) = &cli.db {
        context.db_path(db.clone());
    }

    context
        .add_plugin(DbPlugin)?
        .add_plugin(RosterPlugin)?
        .add_plugin(AccountsPlugin)?
        .add_plugin(DashboardPlugin)?;

    #[cfg(feature = "db_commands")]
    context.add_plugin(db_commands::DbCommandsPlugin)?;

    context.startup()?;
    seed_if_empty(&mut context, cli.fixture.as_deref())?;

    let provider = identity_provider(&mut context, cli)?;
    context.add_resource(Accounts::new(provider));
    Ok(context)
}

/// Loads `fixture` (or the bundled roster) when the store holds no
/// trainers. Returns how many were added.
pub fn seed_if_empty(context: &mut Context, fixture: Option<&Path>) -> Result<usize> {
    if !context.trainers()?.is_empty()? {
        return Ok(0);
    }
    let records = match fixture {
        Some(path) => load_fixture(path)?,
        None => bundled_fixture()?,
    };
    seed(context.trainers()?, records, SeedMode::KeepExisting)
}

fn identity_provider(context: &mut Context, cli: &Cli) -> Result<LocalIdentityProvider> {
    let mut provider = LocalIdentityProvider::new();
    match &cli.admin_password {
        Some(password) => provider.enroll(Account::admin(cli.admin_email.as_str(), password.as_str()))?,
        None => tracing::warn!("no admin password set, admin sign-in is disabled"),
    }

    if let Some(password) = &cli.trainer_password {
        for record in context.trainers()?.all()? {
            if record.email.trim().is_empty() || provider.is_enrolled(&record.email) {
                continue;
            }
            provider.enroll(Account::trainer(record.email, password.as_str(), record.id))?;
        }
    }
    Ok(provider)
}
