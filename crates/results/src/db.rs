//! Database connections.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::{Connection, SqliteConnection};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// The one table of interest in every results database.
pub const TABLE: &str = "test_results";

/// A single connection to one results database file.
///
/// Every file is handled by exactly one connection at a time; nothing here
/// is pooled.
#[derive(Debug)]
pub struct Database {
    conn: SqliteConnection,
    path: PathBuf,
}

impl Database {
    async fn connect(path: &Path, options: SqliteConnectOptions) -> Result<Self> {
        let conn = SqliteConnection::connect_with(&options)
            .await
            .or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Open an existing database file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::connect(path, Self::base_options().filename(path).create_if_missing(false)).await
    }

    /// Create a new, empty database file (or open it if it already exists).
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::connect(path, Self::base_options().filename(path).create_if_missing(true)).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // Rollback journal, not WAL: once the connection is closed the
            // main file alone is the complete database, so it can be copied
            // byte for byte (the merge seed relies on this).
            .journal_mode(SqliteJournalMode::Delete)
            .synchronous(SqliteSynchronous::Full)
            .foreign_keys(false)
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the underlying connection.
    ///
    /// This is useful for running custom queries or transactions.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Number of rows in the results table.
    pub async fn count(&mut self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {TABLE}"))
            .fetch_one(&mut self.conn)
            .await
            .or_raise(|| ErrorKind::MissingTable(self.path.clone()))?;
        u64::try_from(count).or_raise(|| ErrorKind::Database)
    }

    /// Close the connection, flushing everything to the file.
    pub async fn close(self) {
        _ = self.conn.close().await;
    }
}

/// Double-quote an identifier for use in SQL text.
pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
