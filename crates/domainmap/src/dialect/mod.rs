//! Dialect abstraction: native column catalogs and SQL syntax rules.
//!
//! A [`Dialect`] owns a [`ColumnFeatures`] catalog describing which native
//! column types exist and the widest field setting each one can hold. The
//! mapper consults the catalog first and falls back to decomposition when
//! nothing matches, so a dialect only ever lists what it truly supports.

pub mod postgres;
pub mod sqlite;

pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::core::domain::Object;
use crate::core::field::{Field, FieldType, Setting};

/// One native column type and the widest field setting it can represent.
#[derive(Debug, Clone)]
pub struct ColumnFeature {
    /// SQL column type name, written into DDL verbatim.
    pub type_name: String,
    /// Whether the type takes standard arguments (`VARCHAR(40)` style).
    /// No shipped dialect uses this yet; the mapper rejects it.
    pub accepts_arguments: bool,
    /// The widest field setting this column can hold.
    pub coverage: Setting,
}

/// Native column types per field type, ordered by preference.
#[derive(Debug, Clone, Default)]
pub struct ColumnFeatures {
    features: [Vec<ColumnFeature>; FieldType::COUNT],
}

impl ColumnFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column type under its coverage's field type. Later
    /// entries for the same field type are tried in registration order.
    pub fn append(
        &mut self,
        type_name: impl Into<String>,
        accepts_arguments: bool,
        coverage: Setting,
    ) {
        let index = coverage.field_type().index();
        self.features[index].push(ColumnFeature {
            type_name: type_name.into(),
            accepts_arguments,
            coverage,
        });
    }

    /// First registered feature that covers the field's setting, if any.
    /// No match is not an error; it sends the mapper into fallback.
    pub fn matched(&self, field: &Field) -> Option<&ColumnFeature> {
        self.features[field.field_type().index()]
            .iter()
            .find(|feature| feature.coverage.covers(&field.setting))
    }
}

/// How the main table of an object gets its primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKeyPolicy {
    /// Use the object's identity at this index; its fields' equality
    /// columns become the table primary key.
    Identity(usize),
    /// Synthesize a surrogate auto-increment column of this native type.
    Surrogate { column_type: String },
}

/// SQL dialect: column catalog, syntax fragments, and schema policies.
pub trait Dialect: Send + Sync {
    /// Dialect identifier for logs (e.g. "sqlite", "postgres").
    fn name(&self) -> &'static str;

    /// The native column catalog.
    fn features(&self) -> &ColumnFeatures;

    /// Parameter placeholder for the given 1-based index.
    ///
    /// - sqlite: `?`
    /// - postgres: `$1`, `$2`, ...
    fn param_placeholder(&self, index: usize) -> String;

    /// Table options appended after the column list. `auto_id_key` is true
    /// when the table uses a surrogate auto-increment key.
    fn table_options(&self, auto_id_key: bool) -> Vec<String>;

    /// Native column type of a surrogate auto-increment key.
    fn auto_id_type(&self) -> &'static str;

    /// Native column type used when another table references the surrogate
    /// key. Dialects whose auto-increment type carries a generation clause
    /// override this with the bare type.
    fn auto_id_reference_type(&self) -> &'static str {
        self.auto_id_type()
    }

    /// Whether `word` needs escaping as a column name.
    fn is_reserved_word(&self, word: &str) -> bool;

    /// Choose the primary key for an object: the first identity whose
    /// fields are all key-eligible, or a surrogate key.
    fn primary_key_policy(&self, object: &Object, prefer_identities: bool) -> PrimaryKeyPolicy {
        if prefer_identities {
            if let Some(index) = first_eligible_identity(object) {
                return PrimaryKeyPolicy::Identity(index);
            }
        }
        PrimaryKeyPolicy::Surrogate {
            column_type: self.auto_id_type().to_string(),
        }
    }

    /// Escape a field name for use as a column name. User names never end
    /// in `_`, so appending one cannot collide.
    fn external_name(&self, name: &str) -> String {
        if self.is_reserved_word(name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }

    /// Undo [`Dialect::external_name`].
    fn internal_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_suffix('_').unwrap_or(name)
    }
}

/// Index of the first identity usable as a primary key: non-empty, no
/// ranges, and every field present, non-nullable, non-i18n, and not a
/// composite type.
pub(crate) fn first_eligible_identity(object: &Object) -> Option<usize> {
    object.identities().iter().position(|identity| {
        !identity.fields.is_empty()
            && identity.ranges.is_empty()
            && identity.fields.iter().all(|name| {
                object.field(name.as_str()).is_some_and(|field| {
                    !field.nullable
                        && !field.is_i18n
                        && !matches!(
                            field.field_type(),
                            FieldType::List | FieldType::Combination
                        )
                })
            })
    })
}
