//! The store: domain registration, DDL execution, and transactional writes.
//!
//! A [`Store`] pairs one SQL driver with one dialect. Registering a domain
//! maps every object once, creates the tables, and caches the mapping;
//! inserts consult the cache and hand complete row batches to the driver.

mod batch;
pub mod driver;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

pub use driver::{SqlDriver, TableRows};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresConfig, PostgresDriver};
pub use sqlite::SqliteDriver;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::domain::Domain;
use crate::core::names::CodeName;
use crate::core::value::Value;
use crate::dialect::{Dialect, SqliteDialect};
use crate::error::{MapError, Result, ThingKind};
use crate::schema::build::{domain_info, DomainInfo};
use crate::schema::ddl::create_table;
use crate::store::batch::BatchBuilder;

/// Store behavior switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Key every main table by the auto-assigned `_id` column, ignoring
    /// declared identities for primary key selection. Identities still
    /// become UNIQUE constraints.
    pub surrogate_keys: bool,
}

impl StoreOptions {
    #[must_use]
    pub fn with_surrogate_keys(mut self, surrogate_keys: bool) -> Self {
        self.surrogate_keys = surrogate_keys;
        self
    }
}

/// Insert input: object name to a record, or to a sequence of records.
pub type ObjectValues = IndexMap<CodeName, Value>;

/// A database with registered domains.
///
/// The store owns the driver and the dialect. Domain mappings are built
/// once at registration and are read-only afterwards, so inserts can run
/// concurrently on a shared reference.
pub struct Store {
    driver: Box<dyn SqlDriver>,
    dialect: Box<dyn Dialect>,
    options: StoreOptions,
    domains: IndexMap<CodeName, DomainInfo>,
    default_domain: Option<CodeName>,
}

impl Store {
    pub fn new(driver: impl SqlDriver + 'static, dialect: impl Dialect + 'static) -> Self {
        Store::with_options(driver, dialect, StoreOptions::default())
    }

    pub fn with_options(
        driver: impl SqlDriver + 'static,
        dialect: impl Dialect + 'static,
        options: StoreOptions,
    ) -> Self {
        Store {
            driver: Box::new(driver),
            dialect: Box::new(dialect),
            options,
            domains: IndexMap::new(),
            default_domain: None,
        }
    }

    /// Open a file backed sqlite store with default options.
    pub fn sqlite(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Store::new(SqliteDriver::open(path)?, SqliteDialect::new()))
    }

    /// Open a sqlite store that lives in memory, for tests and scratch
    /// work.
    pub fn sqlite_in_memory() -> Result<Self> {
        Ok(Store::new(
            SqliteDriver::open_in_memory()?,
            SqliteDialect::new(),
        ))
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The mapped form of a registered domain.
    pub fn domain(&self, name: &str) -> Option<&DomainInfo> {
        self.domains.get(name)
    }

    /// Map the domain, create its tables, and register it for inserts.
    ///
    /// The first domain added becomes the default target of
    /// [`insert_objects`](Store::insert_objects). Fails without side
    /// effects if the name is already taken or the domain cannot be
    /// mapped; the DDL itself runs in one transaction.
    pub async fn add_domain(&mut self, domain: &Domain) -> Result<()> {
        if self.domains.contains_key(domain.name().as_str()) {
            return Err(MapError::code_name_exists(
                domain.name().as_str(),
                ThingKind::Domain,
            ));
        }
        let info = domain_info(self.dialect.as_ref(), !self.options.surrogate_keys, domain)?;
        let mut statements = Vec::new();
        for (_, object) in info.objects() {
            let main = create_table(object.main_table()).map_err(|e| {
                e.with_context(format!("in main table {}", object.main_table().name))
            })?;
            statements.push(main);
            for helper in object.helper_tables() {
                let ddl = create_table(helper)
                    .map_err(|e| e.with_context(format!("in helper table {}", helper.name)))?;
                statements.push(ddl);
            }
        }
        self.driver.execute_ddl(&statements).await?;
        info!(
            domain = %info.name(),
            objects = info.objects().count(),
            tables = statements.len(),
            "domain registered"
        );
        if self.default_domain.is_none() {
            self.default_domain = Some(info.name().clone());
        }
        self.domains.insert(info.name().clone(), info);
        Ok(())
    }

    /// Insert into the default domain, the first one added.
    pub async fn insert_objects(&self, values: &ObjectValues) -> Result<()> {
        let domain = self
            .default_domain
            .as_ref()
            .ok_or_else(|| MapError::system("no domain registered"))?;
        self.insert_domain_objects(domain, values, None).await
    }

    /// Insert values into the named domain.
    ///
    /// All rows across all objects run in one transaction: either every
    /// record lands or none do. The cancel channel, when given, is read
    /// once per named object while rows are still being built; a true
    /// value abandons the call before anything reaches the database.
    pub async fn insert_domain_objects(
        &self,
        domain: &CodeName,
        values: &ObjectValues,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<()> {
        let info = self
            .domains
            .get(domain.as_str())
            .ok_or_else(|| MapError::domain_not_found(domain.as_str()))?;
        let mut builder = BatchBuilder::new(self.dialect.as_ref());
        for (name, value) in values {
            if let Some(rx) = &cancel {
                if *rx.borrow() {
                    return Err(MapError::Cancelled);
                }
            }
            let object = info
                .object(name.as_str())
                .ok_or_else(|| MapError::object_not_found(name.as_str()))?;
            builder.append_object(object, value)?;
        }
        let batches = builder.finish();
        debug!(domain = %domain, tables = batches.len(), "insert prepared");
        self.driver.insert_rows(&batches).await
    }
}
