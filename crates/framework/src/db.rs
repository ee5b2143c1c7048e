use crate::{
    Error, Result,
    context::{Context, Plugin},
};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

//////////////////////////////////////////////////////
// PUBLIC API
//////////////////////////////////////////////////////

/// Add this plugin to a `Context` before any plugin that registers
/// tables.
#[derive(Default, Clone)]
pub struct DbPlugin;

/// A connection to the underlying SQLite database.
pub struct DbConnection {
    // The rusqlite connection. None once the database is erased.
    connection: Option<Connection>,

    // The file the database was opened from.
    // None if it's an in-memory connection.
    db_path: Option<PathBuf>,

    // The tables created when the connection was opened.
    tables: Vec<TableConfig>,
}

crate::impl_resource!(DbConnection);

impl DbConnection {
    /// Opens an in-memory database with the given tables.
    pub fn open_in_memory(tables: Vec<TableConfig>) -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        Self::setup_connection(&connection, &tables)?;

        Ok(Self {
            connection: Some(connection),
            db_path: None,
            tables,
        })
    }

    /// Opens (or creates) a database file, creating any missing
    /// parent directories.
    pub fn open_from_path(path: &Path, tables: Vec<TableConfig>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let connection = Connection::open(path)?;
        Self::setup_connection(&connection, &tables)?;
        tracing::info!(path = %path.display(), "opened database");

        Ok(Self {
            connection: Some(connection),
            db_path: Some(path.to_path_buf()),
            tables,
        })
    }

    /// Returns true if the connection is open.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Gets the path of the database file opened by this connection.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// The open rusqlite connection.
    pub fn connection(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or(Error::NoConnection)
    }

    /// Gets the `TableConfig`s this connection was opened with.
    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }

    /// Counts the rows in a registered table.
    pub fn row_count(&self, table: &str) -> Result<i64> {
        self.check_table(table)?;
        let count = self.connection()?.query_row(
            &format!("SELECT COUNT(*) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Writes a consistent copy of the database to `out_path`,
    /// overwriting the file if it exists.
    pub fn backup_to(&self, out_path: &Path) -> Result<()> {
        let connection = self.connection()?;
        if out_path.exists() {
            fs::remove_file(out_path)?;
        }
        let target = out_path
            .to_str()
            .ok_or_else(|| Error::Validation(format!("non utf-8 path {out_path:?}")))?;
        connection.execute("VACUUM INTO ?1", [target])?;
        Ok(())
    }

    /// Closes and deletes the database. In-memory databases are just
    /// closed. Fails if the connection is already closed.
    pub fn delete_db(&mut self) -> Result<()> {
        let connection = self.connection.take().ok_or(Error::NoConnection)?;
        connection.close().map_err(|(_, e)| e)?;

        if let Some(db_path) = self.db_path.take() {
            fs::remove_file(&db_path)?;
            tracing::warn!(path = %db_path.display(), "erased database");
        }

        Ok(())
    }
}

/// The schema for one SQL table. Every table gets an integer
/// `id` primary key in addition to its declared columns.
#[derive(Clone, Debug)]
pub struct TableConfig {
    table_name: String,
    columns: Vec<(String, String)>,
}

impl TableConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column with its SQL type and constraints,
    /// e.g. `"TEXT NOT NULL DEFAULT ''"`.
    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), sql_type.into()));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    fn create_sql(&self) -> String {
        let mut columns = vec!["id INTEGER PRIMARY KEY".to_string()];
        columns.extend(self.columns.iter().map(|(name, ty)| format!("{name} {ty}")));
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table_name,
            columns.join(", ")
        )
    }
}

/// An extension to `Context` for database access.
pub trait DbContextExt {
    /// Gets the database connection, if `startup` has opened it.
    fn db_connection(&mut self) -> Result<&mut DbConnection>;

    /// Registers a table to create on `Context::startup`.
    fn add_table(&mut self, table: TableConfig) -> &mut Context;
}

impl DbContextExt for Context {
    fn db_connection(&mut self) -> Result<&mut DbConnection> {
        self.get_resource_mut::<DbConnection>().ok_or(Error::NoConnection)
    }

    fn add_table(&mut self, table: TableConfig) -> &mut Context {
        if let Some(configs) = self.get_resource_mut::<DbTableConfigs>() {
            configs.configs.push(table);
        } else {
            self.add_resource(DbTableConfigs {
                configs: vec![table],
            });
        }
        self
    }
}

//////////////////////////////////////////////////////
// PRIVATE IMPLEMENTATION
//////////////////////////////////////////////////////

/// The tables requested before startup.
#[derive(Default)]
pub(crate) struct DbTableConfigs {
    configs: Vec<TableConfig>,
}

crate::impl_resource!(DbTableConfigs);

impl DbTableConfigs {
    pub(crate) fn configs(&self) -> &[TableConfig] {
        &self.configs
    }
}

impl Plugin for DbPlugin {
    fn build(self, context: &mut Context) -> Result<()> {
        if !context.has_resource::<DbTableConfigs>() {
            context.add_resource(DbTableConfigs::default());
        }
        Ok(())
    }
}

impl DbConnection {
    fn setup_connection(connection: &Connection, tables: &[TableConfig]) -> Result<()> {
        for table in tables {
            connection.execute(&table.create_sql(), [])?;
        }
        Ok(())
    }

    // table names are interpolated into SQL, so only registered ones
    // are accepted
    fn check_table(&self, table: &str) -> Result<()> {
        if self.tables.iter().any(|t| t.table_name == table) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("table {table:?}")))
        }
    }
}
