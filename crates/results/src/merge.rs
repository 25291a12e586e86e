//! Merging many results databases into one.

use crate::db::{Database, TABLE, quote};
use crate::error::{ErrorKind, Result};
use crate::value::Value;
use exn::ResultExt;
use futures::TryStreamExt;
use sqlx::Connection;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// How the destination schema is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SchemaPolicy {
    /// The destination has exactly the seed's columns. A later source with a
    /// column the seed lacks fails the merge.
    #[default]
    Seed,
    /// Every column of every source is added to the destination before any
    /// row is copied.
    Union,
}

/// What a successful merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub destination: PathBuf,
    /// Number of source files, including the seed.
    pub sources: usize,
    /// Rows in the destination table after the merge.
    pub rows: u64,
    /// Columns added to the seed's schema ([`SchemaPolicy::Union`] only).
    pub added_columns: Vec<String>,
}

/// Merges tagged results databases.
///
/// The first source is the seed: its file is copied byte for byte to the
/// destination, which fixes the initial schema and rows. Every other source
/// is then appended in order, one transaction per source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Merger {
    policy: SchemaPolicy,
}

impl Merger {
    #[must_use]
    pub fn new(policy: SchemaPolicy) -> Self {
        Self { policy }
    }

    /// Merge `sources` into a new database at `destination`.
    ///
    /// Any existing file at `destination` is replaced. Sources are only read.
    ///
    /// # Errors
    ///
    /// [`NoSources`](ErrorKind::NoSources) if `sources` is empty, in which
    /// case nothing is written. [`Merge`](ErrorKind::Merge) naming the
    /// source whose rows could not be copied; rows already committed from
    /// earlier sources stay in the destination.
    #[instrument(skip_all, fields(destination = %destination.display(), policy = ?self.policy))]
    pub async fn merge<P: AsRef<Path>>(&self, sources: &[P], destination: &Path) -> Result<MergeSummary> {
        let Some((seed, rest)) = sources.split_first() else {
            exn::bail!(ErrorKind::NoSources);
        };
        let seed = seed.as_ref();

        match fs::remove_file(destination).await {
            Ok(()) => tracing::debug!("Removed stale output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io(destination.to_path_buf())),
        }
        fs::copy(seed, destination)
            .await
            .or_raise(|| ErrorKind::Io(seed.to_path_buf()))?;
        tracing::info!(seed = %seed.display(), "Seeded output");

        let mut output = Database::open(destination).await?;
        let result = self.append_all(&mut output, rest).await;
        let result = match result {
            Ok(added_columns) => output.count().await.map(|rows| MergeSummary {
                destination: destination.to_path_buf(),
                sources: sources.len(),
                rows,
                added_columns,
            }),
            Err(e) => Err(e),
        };
        output.close().await;
        let summary = result?;
        tracing::info!(sources = summary.sources, rows = summary.rows, "Merge complete");
        Ok(summary)
    }

    async fn append_all<P: AsRef<Path>>(&self, output: &mut Database, sources: &[P]) -> Result<Vec<String>> {
        let added_columns = match self.policy {
            SchemaPolicy::Seed => Vec::new(),
            SchemaPolicy::Union => widen(output, sources).await?,
        };
        for source in sources {
            let source = source.as_ref();
            let rows = append(output, source)
                .await
                .or_raise(|| ErrorKind::Merge(source.to_path_buf()))?;
            tracing::info!(source = %source.display(), rows, "Merged source");
        }
        Ok(added_columns)
    }
}

/// Add every column of `sources` that `output` lacks. Returns the added
/// names in the order they were first seen.
async fn widen<P: AsRef<Path>>(output: &mut Database, sources: &[P]) -> Result<Vec<String>> {
    let mut known = output.columns().await?;
    let mut added = Vec::new();
    for source in sources {
        let source = source.as_ref();
        let columns = crate::schema::columns(source)
            .await
            .or_raise(|| ErrorKind::Merge(source.to_path_buf()))?;
        for column in columns {
            if known.iter().any(|k| k.eq_ignore_ascii_case(&column)) {
                continue;
            }
            output.add_column(&column).await?;
            tracing::debug!(column, source = %source.display(), "Added column to output");
            known.push(column.clone());
            added.push(column);
        }
    }
    Ok(added)
}

/// Copy every row of `source` into `output` in one transaction. Returns the
/// number of rows copied.
async fn append(output: &mut Database, source: &Path) -> Result<u64> {
    let mut input = Database::open(source).await?;
    let result = copy_rows(output, &mut input).await;
    input.close().await;
    result
}

async fn copy_rows(output: &mut Database, input: &mut Database) -> Result<u64> {
    let columns = input.columns().await?;
    let names = columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let insert = format!("INSERT INTO {TABLE} ({names}) VALUES ({placeholders})");
    let select = format!("SELECT {names} FROM {TABLE}");
    tracing::debug!(statement = %insert, "Prepared insert");

    let mut tx = output.connection().begin().await.or_raise(|| ErrorKind::Database)?;
    let mut rows = sqlx::query(&select).fetch(input.connection());
    let mut copied = 0;
    while let Some(row) = rows.try_next().await.or_raise(|| ErrorKind::Database)? {
        let mut query = sqlx::query(&insert);
        for index in 0..columns.len() {
            query = Value::read(&row, index)?.bind(query);
        }
        query.execute(&mut *tx).await.or_raise(|| ErrorKind::Database)?;
        copied += 1;
    }
    drop(rows);
    tx.commit().await.or_raise(|| ErrorKind::Database)?;
    Ok(copied)
}
