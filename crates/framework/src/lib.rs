//! A loose application layer shared by the Trainer Desk command line
//! and terminal UI. Plugins register commands, tables and resources
//! with a `Context`, which owns the database connection.

mod config;
mod context;
mod db;

pub use config::DataDirs;
pub use context::{CommandResponse, Context, Plugin, Resource};
pub use db::{DbConnection, DbContextExt, DbPlugin, TableConfig};

/// The error type shared by every Trainer Desk crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying SQLite database reported a failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A trainer fixture document could not be read.
    #[error("invalid fixture: {0}")]
    Fixture(String),

    /// Sign-in or registration was refused.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// User supplied input failed a check.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A command line could not be parsed. Holds the rendered
    /// `clap` message, which also covers `--help` output.
    #[error("{0}")]
    Command(String),

    #[error("no active db connection")]
    NoConnection,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a free-form error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Fixture(e.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implements `Resource` for one or more concrete types.
///
/// ```
/// # use framework::impl_resource;
/// #[derive(Default)]
/// struct Counter(u32);
/// impl_resource!(Counter);
/// ```
#[macro_export]
macro_rules! impl_resource {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Resource for $ty {
                fn as_any(&self) -> &dyn ::std::any::Any { self }
                fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any { self }
                fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> { self }
            }
        )+
    };
}

/// Re-exports for the symbols nearly every plugin needs.
pub mod prelude {
    pub use crate::{
        CommandResponse, Context, DataDirs, DbConnection, DbContextExt,
        DbPlugin, Error, Plugin, Resource, Result, TableConfig,
        impl_resource,
    };
}
