//! # domainmap
//!
//! Schema-to-relational mapping engine for abstract domain models.
//!
//! Applications describe their data as named fields with bounded value
//! domains; this library derives a working relational schema from that
//! description and moves values through the generated mapping:
//!
//! - **Field algebra** with a covers relation over value ranges
//! - **Recursive fallback mapping** that decomposes fields no native
//!   column type can hold into supported primitives (extra columns,
//!   helper tables)
//! - **Derived constraints** from identity and range declarations
//! - **Dialect catalogs** for sqlite and PostgreSQL
//! - **Transactional batch writes** through the generated encoders
//!
//! ## Example
//!
//! ```rust,no_run
//! use domainmap::{
//!     CodeName, Domain, Field, Object, ObjectValues, Setting, Store, StringSetting, Value,
//! };
//!
//! #[tokio::main]
//! async fn main() -> domainmap::Result<()> {
//!     let title = Setting::String(StringSetting {
//!         min_code_points: 1,
//!         max_code_points: 200,
//!         single_line: true,
//!     });
//!     let domain = Domain::new("library")?
//!         .with_object(Object::new("book")?.with_field(Field::new("title", title)?)?)?;
//!
//!     let mut store = Store::sqlite("library.db")?;
//!     store.add_domain(&domain).await?;
//!
//!     let mut values = ObjectValues::new();
//!     values.insert(
//!         CodeName::new("book")?,
//!         Value::record([("title", Value::from("Dune"))]),
//!     );
//!     store.insert_objects(&values).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod dialect;
pub mod error;
pub mod mapper;
pub mod schema;
pub mod store;

// Re-exports for convenient access
pub use crate::core::{
    BinarySetting, CodeName, CombinationSetting, Domain, Field, FieldType, Identity,
    IntegerSetting, ListSetting, NameRegistry, Object, Range, RealBounds, RealSetting,
    ReferenceSetting, Setting, SqlValue, StringSetting, TimestampSetting, Unit, Value,
};
pub use crate::dialect::{Dialect, PostgresDialect, SqliteDialect};
pub use crate::error::{MapError, Result, ThingKind};
pub use crate::mapper::{FieldDefinition, Mapper, ValueCodec};
pub use crate::schema::build::{DomainInfo, ObjectInfo, PrimaryKey};
pub use crate::schema::ddl::create_table;
pub use crate::schema::{Column, Table, TableName};
#[cfg(feature = "postgres")]
pub use crate::store::{PostgresConfig, PostgresDriver};
pub use crate::store::{ObjectValues, SqlDriver, SqliteDriver, Store, StoreOptions, TableRows};
