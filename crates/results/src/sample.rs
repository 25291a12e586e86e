//! Sample results databases.
//!
//! Do NOT apply `#[cfg(test)]` to this module, so that other crates can also
//! use it in their tests.

use crate::db::{Database, TABLE};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;

/// The `test_results` table as uploaded by CI, before tagging.
pub const SCHEMA: &str = "CREATE TABLE test_results (Time TEXT, Action TEXT, Package TEXT, Test TEXT, Elapsed REAL)";

/// Create a results database at `path` from a `CREATE TABLE` statement, with
/// `rows` passing tests.
///
/// Rows only fill the `Test` and `Action` columns. Test names are prefixed
/// with the file name (`<name>/Test<i>`), so rows can be traced back to
/// their source after a merge.
pub async fn create(path: impl AsRef<Path>, schema: &str, rows: usize) -> Result<()> {
    let path = path.as_ref();
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut db = Database::create(path).await?;
    let result = fill(&mut db, &name, schema, rows).await;
    db.close().await;
    result
}

async fn fill(db: &mut Database, name: &str, schema: &str, rows: usize) -> Result<()> {
    sqlx::query(schema).execute(db.connection()).await.or_raise(|| ErrorKind::Database)?;
    let insert = format!("INSERT INTO {TABLE} (Test, Action) VALUES (?, 'pass')");
    for i in 0..rows {
        sqlx::query(&insert)
            .bind(format!("{name}/Test{i}"))
            .execute(db.connection())
            .await
            .or_raise(|| ErrorKind::Database)?;
    }
    Ok(())
}
