//! PostgreSQL driver over a deadpool connection pool.

use async_trait::async_trait;
use bytes::BytesMut;
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::core::value::SqlValue;
use crate::error::{MapError, Result};
use crate::store::driver::{SqlDriver, TableRows};

/// Connection settings for [`PostgresDriver`].
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub max_connections: usize,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        PostgresConfig {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "domainmap".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 8,
        }
    }
}

/// PostgreSQL driver.
pub struct PostgresDriver {
    pool: Pool,
}

impl PostgresDriver {
    /// Build a pool from the settings. Connections are checked out lazily,
    /// so this does not touch the server yet.
    pub fn connect(config: &PostgresConfig) -> Result<Self> {
        let mut pg = Config::new();
        pg.host = Some(config.host.clone());
        pg.port = Some(config.port);
        pg.dbname = Some(config.dbname.clone());
        pg.user = Some(config.user.clone());
        pg.password = Some(config.password.clone());
        pg.pool = Some(deadpool_postgres::PoolConfig::new(config.max_connections));
        let pool = pg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| MapError::Pool(e.to_string()))?;
        info!(host = %config.host, dbname = %config.dbname, "postgres pool created");
        Ok(PostgresDriver { pool })
    }
}

#[async_trait]
impl SqlDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn execute_ddl(&self, statements: &[String]) -> Result<()> {
        let mut client = self
            .pool
            .get()
            .await
            .map_err(|e| MapError::Pool(e.to_string()))?;
        let tx = client.transaction().await?;
        for statement in statements {
            debug!(sql = %statement, "executing ddl");
            tx.batch_execute(statement).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_rows(&self, batches: &[TableRows]) -> Result<()> {
        let mut client = self
            .pool
            .get()
            .await
            .map_err(|e| MapError::Pool(e.to_string()))?;
        let tx = client.transaction().await?;
        for batch in batches {
            if batch.rows.is_empty() {
                continue;
            }
            debug!(table = %batch.table, rows = batch.rows.len(), "inserting rows");
            let statement = tx.prepare(&batch.sql).await?;
            for row in &batch.rows {
                let params: Vec<&(dyn ToSql + Sync)> =
                    row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
                tx.execute(&statement, &params).await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(flag) => flag.to_sql(ty, out),
            SqlValue::Integer(number) => number.to_sql(ty, out),
            SqlValue::Real(number) => number.to_sql(ty, out),
            SqlValue::Text(text) => text.to_sql(ty, out),
            SqlValue::Blob(bytes) => bytes.to_sql(ty, out),
            SqlValue::Timestamp(at) => at.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // the mapper guarantees values match their column's type
        true
    }

    to_sql_checked!();
}
