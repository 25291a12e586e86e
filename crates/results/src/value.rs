//! Dynamically typed SQLite values.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, TypeInfo, ValueRef};

/// One cell, keeping the SQLite storage class it was stored with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Read column `index` of `row`.
    pub(crate) fn read(row: &SqliteRow, index: usize) -> Result<Self> {
        let raw = row.try_get_raw(index).or_raise(|| ErrorKind::Database)?;
        // A NULL reports the declared column type, so check it first.
        if raw.is_null() {
            return Ok(Self::Null);
        }
        let storage_class = raw.type_info().name().to_string();
        let value = match storage_class.as_str() {
            "INTEGER" => Self::Integer(row.try_get(index).or_raise(|| ErrorKind::Database)?),
            "REAL" => Self::Real(row.try_get(index).or_raise(|| ErrorKind::Database)?),
            "TEXT" => Self::Text(row.try_get(index).or_raise(|| ErrorKind::Database)?),
            "BLOB" => Self::Blob(row.try_get(index).or_raise(|| ErrorKind::Database)?),
            _ => exn::bail!(ErrorKind::UnsupportedValue(storage_class)),
        };
        Ok(value)
    }

    /// Bind as the next positional parameter of `query`.
    pub(crate) fn bind<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            Self::Null => query.bind(None::<String>),
            Self::Integer(v) => query.bind(v),
            Self::Real(v) => query.bind(v),
            Self::Text(v) => query.bind(v),
            Self::Blob(v) => query.bind(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_storage_classes_survive_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::create(dir.path().join("values.db")).await.unwrap();
        sqlx::query("CREATE TABLE t (v)").execute(db.connection()).await.unwrap();
        sqlx::query("INSERT INTO t (v) VALUES (NULL), (42), (1.5), ('text'), (x'00ff')")
            .execute(db.connection())
            .await
            .unwrap();

        let rows = sqlx::query("SELECT v FROM t ORDER BY rowid").fetch_all(db.connection()).await.unwrap();
        let values: Vec<Value> = rows.iter().map(|row| Value::read(row, 0).unwrap()).collect();
        assert_eq!(
            values,
            [
                Value::Null,
                Value::Integer(42),
                Value::Real(1.5),
                Value::Text("text".to_string()),
                Value::Blob(vec![0x00, 0xff]),
            ]
        );

        sqlx::query("CREATE TABLE u (v)").execute(db.connection()).await.unwrap();
        for value in values {
            value
                .bind(sqlx::query("INSERT INTO u (v) VALUES (?)"))
                .execute(db.connection())
                .await
                .unwrap();
        }
        let types: Vec<String> = sqlx::query_scalar("SELECT typeof(v) FROM u ORDER BY rowid")
            .fetch_all(db.connection())
            .await
            .unwrap();
        assert_eq!(types, ["null", "integer", "real", "text", "blob"]);
        db.close().await;
    }

    #[tokio::test]
    async fn test_null_in_typed_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::create(dir.path().join("values.db")).await.unwrap();
        let row = sqlx::query("SELECT CAST(NULL AS TEXT)").fetch_one(db.connection()).await.unwrap();
        assert_eq!(Value::read(&row, 0).unwrap(), Value::Null);
        db.close().await;
    }
}
