//! Turns loosely typed input into per-table row batches.
//!
//! One builder serves one insert call. Rows accumulate per table in
//! first-use order, which puts every main table ahead of its helper
//! tables, so foreign keys hold when the driver executes the batches
//! front to back inside one transaction.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::core::names::CodeName;
use crate::core::value::{SqlValue, Value};
use crate::dialect::Dialect;
use crate::error::{MapError, Result};
use crate::mapper::ListPlan;
use crate::schema::build::{FieldInfo, ObjectInfo, PrimaryKey};
use crate::schema::Table;
use crate::store::driver::TableRows;

/// Accumulates rows per table for one insert call.
pub(crate) struct BatchBuilder<'a> {
    dialect: &'a dyn Dialect,
    batches: IndexMap<String, TableRows>,
}

impl<'a> BatchBuilder<'a> {
    pub(crate) fn new(dialect: &'a dyn Dialect) -> Self {
        BatchBuilder {
            dialect,
            batches: IndexMap::new(),
        }
    }

    /// Append input for one object. A record becomes one row, a sequence
    /// appends element by element, null appends nothing.
    pub(crate) fn append_object(&mut self, object: &ObjectInfo, value: &Value) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::Seq(items) => {
                for item in items {
                    self.append_object(object, item)?;
                }
                Ok(())
            }
            Value::Record(record) => self.append_record(object, record),
            other => Err(MapError::system(format!(
                "input of kind {} is not handled, use a record for one row and a sequence for many",
                other.kind()
            ))),
        }
    }

    fn append_record(
        &mut self,
        object: &ObjectInfo,
        record: &IndexMap<CodeName, Value>,
    ) -> Result<()> {
        for name in record.keys() {
            if object.field(name.as_str()).is_none() {
                return Err(MapError::field_not_found(name.as_str()));
            }
        }
        let mut row: Vec<SqlValue> = Vec::new();
        let mut lists: Vec<(&CodeName, &FieldInfo)> = Vec::new();
        // fields drive the iteration, not the input keys, so the row
        // shape matches the table no matter how the record was built
        for (name, info) in object.fields() {
            if info.definition.list.is_some() {
                lists.push((name, info));
                continue;
            }
            match record.get(name.as_str()) {
                Some(value) if !value.is_null() => {
                    row.extend(info.definition.codec.encode(value)?);
                }
                _ => {
                    if !info.field.nullable {
                        return Err(MapError::value_required(name.as_str()));
                    }
                    row.resize(row.len() + info.definition.codec.width(), SqlValue::Null);
                }
            }
        }
        self.push_row(object.main_table(), row)?;
        for (name, info) in lists {
            if let Some(plan) = &info.definition.list {
                self.append_list(object, name, info.field.nullable, plan, record)?;
            }
        }
        Ok(())
    }

    fn append_list(
        &mut self,
        object: &ObjectInfo,
        name: &CodeName,
        nullable: bool,
        plan: &ListPlan,
        record: &IndexMap<CodeName, Value>,
    ) -> Result<()> {
        let items = match record.get(name.as_str()) {
            None | Some(Value::Null) => {
                // an absent list with no minimum length means empty
                if !nullable && plan.min_length > 0 {
                    return Err(MapError::value_required(name.as_str()));
                }
                return Ok(());
            }
            Some(Value::Seq(items)) => items,
            Some(other) => {
                return Err(MapError::value_not_supported(
                    name.as_str(),
                    format!("expected a sequence, got {}", other.kind()),
                ))
            }
        };
        // encode first: a unique list ignores repeated items, so bounds
        // and positions go by what is kept, not by what was sent
        let mut kept: Vec<Vec<SqlValue>> = Vec::new();
        for item in items {
            let cells = plan.item.encode(item)?;
            if plan.unique && kept.contains(&cells) {
                continue;
            }
            kept.push(cells);
        }
        let count = kept.len() as u64;
        if count < plan.min_length || count > plan.max_length {
            return Err(MapError::value_not_supported(
                name.as_str(),
                format!(
                    "{count} elements is outside the range [{}, {}]",
                    plan.min_length, plan.max_length
                ),
            ));
        }
        if kept.is_empty() {
            return Ok(());
        }
        let table = object.helper_table(&plan.table).ok_or_else(|| {
            MapError::system(format!(
                "helper table \"{}\" is missing, this should never happen",
                plan.table
            ))
        })?;
        let prefix = key_prefix(object, record, name)?;
        for (index, cells) in kept.into_iter().enumerate() {
            let mut row = prefix.clone();
            row.extend(plan.order.encode(&Value::Integer(index as i128 + 1))?);
            row.extend(cells);
            self.push_row(table, row)?;
        }
        Ok(())
    }

    fn push_row(&mut self, table: &Table, row: Vec<SqlValue>) -> Result<()> {
        let batch = match self.batches.entry(table.name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                let columns = table.data_columns();
                let sql = insert_sql(self.dialect, &key, &columns);
                entry.insert(TableRows {
                    table: key,
                    columns,
                    sql,
                    rows: Vec::new(),
                })
            }
        };
        if row.len() != batch.columns.len() {
            return Err(MapError::system(format!(
                "can not set {} values to {} columns",
                row.len(),
                batch.columns.len()
            )));
        }
        batch.rows.push(row);
        Ok(())
    }

    /// The accumulated batches in first-use order, empty ones dropped.
    pub(crate) fn finish(self) -> Vec<TableRows> {
        self.batches
            .into_values()
            .filter(|batch| !batch.rows.is_empty())
            .collect()
    }
}

/// Column values identifying the owning row, for helper table rows.
///
/// Equality columns lead every composite mapping, so the encoded value
/// of each key field starts with exactly the cells the key needs.
fn key_prefix(
    object: &ObjectInfo,
    record: &IndexMap<CodeName, Value>,
    list_field: &CodeName,
) -> Result<Vec<SqlValue>> {
    let PrimaryKey::Identity { fields } = object.primary_key() else {
        return Err(MapError::field_not_supported("list", list_field.as_str()));
    };
    let mut prefix = Vec::new();
    for field_name in fields {
        let info = object.field(field_name.as_str()).ok_or_else(|| {
            MapError::system(format!(
                "key field \"{field_name}\" has no mapping, this should never happen"
            ))
        })?;
        let value = match record.get(field_name.as_str()) {
            Some(value) if !value.is_null() => value,
            _ => return Err(MapError::value_required(field_name.as_str())),
        };
        let mut cells = info.definition.codec.encode(value)?;
        cells.truncate(info.definition.equality_columns.len());
        prefix.extend(cells);
    }
    Ok(prefix)
}

fn insert_sql(dialect: &dyn Dialect, table: &str, columns: &[String]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {table} DEFAULT VALUES");
    }
    let placeholders: Vec<String> = (1..=columns.len())
        .map(|index| dialect.param_placeholder(index))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}
