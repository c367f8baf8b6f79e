//! Field mapper: resolves each abstract field to physical columns, a value
//! codec, and any helper tables.
//!
//! Mapping consults the dialect catalog first. When nothing covers a field
//! the mapper decomposes it into supported primitives and recurses: booleans
//! become a 0/1 integer, timestamps become sortable text, zoned timestamps
//! become an instant plus an offset column, lists become a helper table.
//! Every step strictly reduces the unresolved settings, so the recursion
//! terminates.

mod codec;

pub use codec::ValueCodec;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::core::field::{Field, IntegerSetting, Setting, StringSetting, TimestampSetting};
use crate::core::names::CodeName;
use crate::dialect::{ColumnFeature, Dialect};
use crate::error::{MapError, Result};
use crate::schema::{Column, ForeignKey, OnAction, Table, TableName};

use codec::{
    BoolAsIntCodec, NoScalarCodec, ScalarCodec, TimestampLayout, TimestampTextCodec,
    ZonedTimestampCodec,
};

/// Everything the schema builder and the batch writer need to know about
/// one mapped field.
#[derive(Debug)]
pub struct FieldDefinition {
    /// Columns the field occupies in the owning table, in order.
    pub columns: Vec<Column>,
    /// Helper tables the field needs besides its columns.
    pub helper_tables: Vec<Table>,
    /// Columns usable for equality comparisons and keys.
    pub equality_columns: Vec<String>,
    /// Columns that sort in value order.
    pub sort_columns: Vec<String>,
    /// Columns that take part in value ordering with inverted direction.
    pub inverted_sort_columns: Vec<String>,
    /// Converts field values to column values and back.
    pub codec: Arc<dyn ValueCodec>,
    /// Present when the field stores its values as helper table rows.
    pub list: Option<ListPlan>,
}

/// How a list field stores its elements in a helper table.
#[derive(Debug)]
pub struct ListPlan {
    /// Helper table name, also the key into the object's helper tables.
    pub table: String,
    pub min_length: u64,
    pub max_length: u64,
    pub ordered: bool,
    pub unique: bool,
    /// Codec of the synthetic 1-based position field.
    pub order: Arc<dyn ValueCodec>,
    /// Codec of the synthetic element field.
    pub item: Arc<dyn ValueCodec>,
}

/// Maps abstract fields onto a dialect's physical columns.
pub struct Mapper<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> Mapper<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Mapper { dialect }
    }

    /// Map one field to columns and a codec. List fields carry owner
    /// context and go through [`Mapper::list_definition`] instead; a list
    /// reaching this entry (as a nested item does) is unsupported.
    pub fn field_definition(&self, field: &Field) -> Result<FieldDefinition> {
        if field.is_i18n {
            return Err(MapError::setting_not_supported(
                field.field_type().name(),
                field.name.as_str(),
                "is_i18n",
                "true",
            ));
        }
        if let Some(feature) = self.dialect.features().matched(field) {
            return self.direct_definition(field, feature);
        }
        match &field.setting {
            Setting::Boolean => self.boolean_fallback(field),
            Setting::Timestamp(setting) if setting.with_time_zone_offset => {
                self.zoned_timestamp_fallback(field, setting)
            }
            Setting::Timestamp(setting) => self.timestamp_fallback(field, setting),
            _ => Err(MapError::field_not_supported(
                field.field_type().name(),
                field.name.as_str(),
            )),
        }
    }

    /// One column of the feature's native type, carrying values through
    /// unchanged.
    fn direct_definition(
        &self,
        field: &Field,
        feature: &ColumnFeature,
    ) -> Result<FieldDefinition> {
        if feature.accepts_arguments {
            return Err(MapError::system(format!(
                "arguments not implemented for SQL column {}",
                feature.type_name
            )));
        }
        let name = self.dialect.external_name(field.name.as_str());
        let column =
            Column::new(name.clone(), feature.type_name.clone()).not_null(!field.nullable);
        Ok(FieldDefinition {
            columns: vec![column],
            helper_tables: Vec::new(),
            equality_columns: vec![name.clone()],
            sort_columns: vec![name],
            inverted_sort_columns: Vec::new(),
            codec: Arc::new(ScalarCodec::new(field.name.clone(), field.setting.clone())),
            list: None,
        })
    }

    /// Booleans without a native column become a 0/1 integer.
    fn boolean_fallback(&self, field: &Field) -> Result<FieldDefinition> {
        debug!(field = %field.name, "boolean stored as integer");
        let synthetic = Field {
            name: field.name.clone(),
            setting: Setting::Integer(IntegerSetting {
                min: 0,
                max: 1,
                unit: None,
            }),
            is_i18n: false,
            nullable: field.nullable,
        };
        let mut definition = self.field_definition(&synthetic)?;
        let inner = Arc::clone(&definition.codec);
        definition.codec = Arc::new(BoolAsIntCodec::new(field.name.clone(), inner));
        Ok(definition)
    }

    /// Timestamps without a native column become fixed-width ISO-8601 text,
    /// which sorts chronologically. The field's envelope must fit the
    /// four-digit year range of the layouts.
    fn timestamp_fallback(
        &self,
        field: &Field,
        setting: &TimestampSetting,
    ) -> Result<FieldDefinition> {
        if setting.min < text_envelope_min() {
            return Err(MapError::setting_not_supported(
                field.field_type().name(),
                field.name.as_str(),
                "min",
                setting.min.to_rfc3339(),
            ));
        }
        if setting.max > text_envelope_max() {
            return Err(MapError::setting_not_supported(
                field.field_type().name(),
                field.name.as_str(),
                "max",
                setting.max.to_rfc3339(),
            ));
        }
        let layout = TimestampLayout::for_scale(setting.scale);
        debug!(field = %field.name, ?layout, "timestamp stored as text");
        let synthetic = Field {
            name: field.name.clone(),
            setting: Setting::String(StringSetting {
                min_code_points: 1,
                max_code_points: layout.text_width(),
                single_line: false,
            }),
            is_i18n: false,
            nullable: field.nullable,
        };
        let mut definition = self.field_definition(&synthetic)?;
        let inner = Arc::clone(&definition.codec);
        definition.codec = Arc::new(TimestampTextCodec::new(
            field.name.clone(),
            layout,
            setting.min,
            setting.max,
            inner,
        ));
        Ok(definition)
    }

    /// Zoned timestamps split into the plain timestamp mapping, normalized
    /// to UTC, plus a `<name>_tz` integer column holding the offset in
    /// seconds east. Equality and ordering go by the instant alone.
    fn zoned_timestamp_fallback(
        &self,
        field: &Field,
        setting: &TimestampSetting,
    ) -> Result<FieldDefinition> {
        debug!(field = %field.name, "time zone offset stored as extra column");
        let instant_field = Field {
            name: field.name.clone(),
            setting: Setting::Timestamp(TimestampSetting {
                with_time_zone_offset: false,
                ..setting.clone()
            }),
            is_i18n: false,
            nullable: field.nullable,
        };
        let instant = self.field_definition(&instant_field)?;

        let offset_field = Field {
            name: CodeName::raw(format!("{}_tz", field.name)),
            setting: Setting::Integer(IntegerSetting {
                min: -86_400,
                max: 86_400,
                unit: None,
            }),
            is_i18n: false,
            nullable: field.nullable,
        };
        let offset = self.field_definition(&offset_field)?;

        let mut columns = instant.columns;
        columns.extend(offset.columns);
        let codec = ZonedTimestampCodec::new(field.name.clone(), instant.codec, offset.codec);
        Ok(FieldDefinition {
            columns,
            helper_tables: Vec::new(),
            equality_columns: instant.equality_columns,
            sort_columns: instant.sort_columns,
            inverted_sort_columns: offset.sort_columns,
            codec: Arc::new(codec),
            list: None,
        })
    }

    /// Map a list field onto a helper table keyed by the owning table's
    /// primary key columns plus a position column. The field itself stores
    /// nothing in the owning row.
    pub fn list_definition(
        &self,
        field: &Field,
        owner_table: &TableName,
        owner_key: &[Column],
    ) -> Result<FieldDefinition> {
        let Setting::List(setting) = &field.setting else {
            return Err(MapError::system(format!(
                "field \"{}\" of {} mapped as a list",
                field.name,
                field.field_type()
            )));
        };
        if field.is_i18n {
            return Err(MapError::setting_not_supported(
                field.field_type().name(),
                field.name.as_str(),
                "is_i18n",
                "true",
            ));
        }
        let table_name = owner_table.with_field(&field.name);
        debug!(field = %field.name, table = %table_name, "list stored in helper table");

        let order_field = Field {
            name: CodeName::raw(format!("{}_order", field.name)),
            setting: Setting::Integer(IntegerSetting {
                min: 1,
                max: i128::from(setting.max_length),
                unit: None,
            }),
            is_i18n: false,
            nullable: false,
        };
        let order = self.field_definition(&order_field)?;

        let item_field = Field {
            name: CodeName::raw(format!("{}_item", field.name)),
            setting: (*setting.item).clone(),
            is_i18n: false,
            nullable: false,
        };
        let item = self.field_definition(&item_field)?;

        let mut table = Table::new(table_name, self.dialect.table_options(false));
        let mut fk_columns = Vec::with_capacity(owner_key.len());
        let mut references = Vec::with_capacity(owner_key.len());
        for parent in owner_key {
            let column = Column {
                not_null: true,
                primary_key: false,
                ..parent.clone()
            };
            fk_columns.push(column.name.clone());
            references.push(parent.name.clone());
            table.push_column(column)?;
        }
        for column in &order.columns {
            table.push_column(column.clone())?;
        }
        for column in &item.columns {
            table.push_column(column.clone())?;
        }
        let mut primary_key = fk_columns.clone();
        primary_key.extend(order.equality_columns.iter().cloned());
        table.constraint.primary_key = primary_key;
        table.constraint.foreign_keys.push(ForeignKey {
            columns: fk_columns,
            parent: owner_table.clone(),
            references,
            on_delete: Some(OnAction::Cascade),
            on_update: Some(OnAction::Cascade),
        });

        let plan = ListPlan {
            table: table.name.to_string(),
            min_length: setting.min_length,
            max_length: setting.max_length,
            ordered: setting.ordered,
            unique: setting.unique,
            order: order.codec,
            item: item.codec,
        };
        Ok(FieldDefinition {
            columns: Vec::new(),
            helper_tables: vec![table],
            equality_columns: Vec::new(),
            sort_columns: Vec::new(),
            inverted_sort_columns: Vec::new(),
            codec: Arc::new(NoScalarCodec::new(field.name.clone())),
            list: Some(plan),
        })
    }
}

/// Earliest instant the text layouts represent.
fn text_envelope_min() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Latest instant the text layouts represent.
fn text_envelope_max() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .unwrap()
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap()
        .and_utc()
}
