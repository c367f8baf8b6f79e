//! Embedded SQLite driver over rusqlite.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use tracing::{debug, info};

use crate::core::value::SqlValue;
use crate::error::{MapError, Result};
use crate::store::driver::{SqlDriver, TableRows};

/// SQLite driver. Clones share one connection behind a mutex, so a test
/// can keep a handle for verification queries while the store writes.
#[derive(Clone)]
pub struct SqliteDriver {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDriver {
    /// Open or create a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let driver = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), "sqlite database opened");
        Ok(driver)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(SqliteDriver {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MapError::system("sqlite connection mutex poisoned"))
    }

    /// Run a query returning a single integer, like a COUNT.
    pub fn query_i64(&self, sql: &str) -> Result<i64> {
        let conn = self.lock()?;
        let value = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(value)
    }
}

#[async_trait]
impl SqlDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn execute_ddl(&self, statements: &[String]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for statement in statements {
            debug!(sql = %statement, "executing ddl");
            tx.execute_batch(statement)?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn insert_rows(&self, batches: &[TableRows]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for batch in batches {
            if batch.rows.is_empty() {
                continue;
            }
            debug!(table = %batch.table, rows = batch.rows.len(), "inserting rows");
            let mut statement = tx.prepare(&batch.sql)?;
            for row in &batch.rows {
                statement.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            SqlValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            SqlValue::Bool(flag) => {
                ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*flag)))
            }
            SqlValue::Integer(number) => ToSqlOutput::Owned(SqliteValue::Integer(*number)),
            SqlValue::Real(number) => ToSqlOutput::Owned(SqliteValue::Real(*number)),
            SqlValue::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
            SqlValue::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
            SqlValue::Timestamp(at) => at.to_sql()?,
        };
        Ok(output)
    }
}
