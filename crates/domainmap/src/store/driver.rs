//! Driver abstraction: executes generated DDL and row batches.

use async_trait::async_trait;

use crate::core::value::SqlValue;
use crate::error::Result;

/// One table's worth of rows, ready for insertion.
#[derive(Debug, Clone)]
pub struct TableRows {
    /// Physical table name.
    pub table: String,
    /// Insert column names, in table declaration order.
    pub columns: Vec<String>,
    /// Parameterized INSERT statement matching `columns`.
    pub sql: String,
    /// Row values, one entry per column each.
    pub rows: Vec<Vec<SqlValue>>,
}

/// A database backend able to run the generated DDL and batched inserts.
///
/// Each call runs in one transaction: all statements apply or none do.
#[async_trait]
pub trait SqlDriver: Send + Sync {
    /// Driver identifier for logs.
    fn name(&self) -> &'static str;

    /// Execute DDL statements in order, atomically.
    async fn execute_ddl(&self, statements: &[String]) -> Result<()>;

    /// Insert all batches atomically. Batch order is execution order, so
    /// owning tables come before their helper tables.
    async fn insert_rows(&self, batches: &[TableRows]) -> Result<()>;
}
