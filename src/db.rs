//! # Database Module (Garage-Store)
//!
//! Owns the SQLite connection. All statements run on the single background
//! thread of a `tokio_rusqlite::Connection`, so writes are serialized by the
//! store itself and callers never hold a lock.
//!
//! Three primitives are exposed on top of that connection: `execute` for
//! mutating statements, `fetch_one` and `fetch_all` for reads.

use crate::error::{GarageError, GarageResult};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::OptionalExtension;
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Path reported for in-memory stores
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Outcome of a mutating statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Rowid of the most recent successful INSERT on this connection
    pub last_insert_id: i64,
}

/// The Garage-Store: manages the database connection and query primitives
pub struct GarageStore {
    conn: Connection,
    path: String,
}

impl GarageStore {
    /// Opens (or creates) the database file at `path`.
    ///
    /// Missing parent directories are created first.
    pub async fn open<P: AsRef<Path>>(path: P) -> GarageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                GarageError::store(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let path_str = path.to_string_lossy().to_string();
        info!("Opening SQLite store at: {}", path_str);

        let conn = Connection::open(path)
            .await
            .map_err(|e| GarageError::store(format!("Failed to open database: {}", e)))?;

        Self::initialize_pragmas(&conn).await?;

        Ok(Self {
            conn,
            path: path_str,
        })
    }

    /// Creates an in-memory store (used by tests and `--memory`)
    pub async fn in_memory() -> GarageResult<Self> {
        info!("Opening in-memory SQLite store");

        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| GarageError::store(format!("Failed to create database: {}", e)))?;

        Self::initialize_pragmas(&conn).await?;

        Ok(Self {
            conn,
            path: IN_MEMORY_PATH.to_string(),
        })
    }

    async fn initialize_pragmas(conn: &Connection) -> GarageResult<()> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(|e| GarageError::store(format!("Failed to set pragmas: {}", e)))?;

        debug!("Database pragmas configured");
        Ok(())
    }

    /// Database file path, or `:memory:`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    /// Executes a mutating statement (INSERT, UPDATE, DELETE).
    ///
    /// The rowid is read inside the same connection call as the statement,
    /// so a concurrent insert cannot slip in between.
    pub async fn execute(&self, sql: String, params: Vec<SqlValue>) -> GarageResult<ExecOutcome> {
        debug!("execute: {} ({} params)", sql, params.len());
        self.conn
            .call(move |conn| {
                let affected = conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?;
                Ok(ExecOutcome {
                    rows_affected: affected as u64,
                    last_insert_id: conn.last_insert_rowid(),
                })
            })
            .await
            .map_err(GarageError::from)
    }

    /// Executes several statements without parameters (schema setup, seeding)
    pub async fn execute_batch(&self, sql: String) -> GarageResult<()> {
        self.conn
            .call(move |conn| {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await
            .map_err(GarageError::from)
    }

    /// Fetches the first row of a query, mapped through `map`
    pub async fn fetch_one<T, F>(
        &self,
        sql: String,
        params: Vec<SqlValue>,
        map: F,
    ) -> GarageResult<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        debug!("fetch_one: {} ({} params)", sql, params.len());
        self.conn
            .call(move |conn| {
                let row = conn
                    .query_row(&sql, rusqlite::params_from_iter(params.iter()), map)
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(GarageError::from)
    }

    /// Fetches every row of a query, mapped through `map`
    pub async fn fetch_all<T, F>(
        &self,
        sql: String,
        params: Vec<SqlValue>,
        mut map: F,
    ) -> GarageResult<Vec<T>>
    where
        T: Send + 'static,
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        debug!("fetch_all: {} ({} params)", sql, params.len());
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(map(row)?);
                }
                Ok(out)
            })
            .await
            .map_err(GarageError::from)
    }

    /// Round-trips a trivial query; used by the health check
    pub async fn ping(&self) -> GarageResult<()> {
        self.fetch_one("SELECT 1".to_string(), vec![], |row| row.get::<_, i64>(0))
            .await
            .map(|_| ())
    }
}

/// SQL value wrapper for statement parameters
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl rusqlite::ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            SqlValue::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
