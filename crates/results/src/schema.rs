//! Live schema introspection.

use crate::db::{Database, TABLE};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;

impl Database {
    /// Column names of the results table, in declaration order.
    ///
    /// Read from SQLite's own catalog, so columns added after the table was
    /// created (tagging, union merges) are included.
    pub async fn columns(&mut self) -> Result<Vec<String>> {
        let path = self.path().to_path_buf();
        let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(TABLE)
            .fetch_all(self.connection())
            .await
            .or_raise(|| ErrorKind::Database)?;
        if columns.is_empty() {
            exn::bail!(ErrorKind::MissingTable(path));
        }
        Ok(columns)
    }

    /// Add an untyped, nullable column to the results table.
    pub(crate) async fn add_column(&mut self, name: &str) -> Result<()> {
        let statement = format!("ALTER TABLE {TABLE} ADD COLUMN {}", crate::db::quote(name));
        sqlx::query(&statement)
            .execute(self.connection())
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

/// Column names of the results table in the database at `path`.
pub async fn columns(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut db = Database::open(path).await?;
    let columns = db.columns().await;
    db.close().await;
    columns
}
