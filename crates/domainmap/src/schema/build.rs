//! Table builder: turns an object's field definitions into one main table
//! with derived constraints, plus any helper tables.
//!
//! Build order per object: map every scalar field, derive the primary key
//! (identity columns or a surrogate `_id`), turn the remaining identities
//! into UNIQUE constraints and the declared ranges into CHECK constraints,
//! then map list fields, which need the finished key for their foreign
//! keys. The resulting info is cached by the store and never mutated.

use indexmap::IndexMap;
use tracing::debug;

use crate::core::domain::{Domain, Object, Range};
use crate::core::field::{Field, FieldType};
use crate::core::names::CodeName;
use crate::dialect::{Dialect, PrimaryKeyPolicy};
use crate::error::{MapError, Result};
use crate::mapper::{FieldDefinition, Mapper};
use crate::schema::{Column, Expression, Table, TableName, AUTO_ID_COLUMN};

/// One field together with its physical mapping.
#[derive(Debug)]
pub struct FieldInfo {
    pub field: Field,
    pub definition: FieldDefinition,
}

/// How an object's main table is keyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    /// The chosen identity's fields; their equality columns form the
    /// table primary key.
    Identity { fields: Vec<CodeName> },
    /// Auto-assigned `_id` column.
    Surrogate,
}

/// Everything derived from one object: per-field mappings in declared
/// order, the main table, and helper tables keyed by name.
#[derive(Debug)]
pub struct ObjectInfo {
    name: CodeName,
    fields: IndexMap<CodeName, FieldInfo>,
    main_table: Table,
    helper_tables: IndexMap<String, Table>,
    primary_key: PrimaryKey,
}

impl ObjectInfo {
    pub fn name(&self) -> &CodeName {
        &self.name
    }

    /// Field mappings in the object's declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&CodeName, &FieldInfo)> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }

    pub fn main_table(&self) -> &Table {
        &self.main_table
    }

    pub fn helper_tables(&self) -> impl Iterator<Item = &Table> {
        self.helper_tables.values()
    }

    pub fn helper_table(&self, name: &str) -> Option<&Table> {
        self.helper_tables.get(name)
    }

    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }
}

/// All object mappings of one registered domain.
#[derive(Debug)]
pub struct DomainInfo {
    name: CodeName,
    objects: IndexMap<CodeName, ObjectInfo>,
}

impl DomainInfo {
    pub fn name(&self) -> &CodeName {
        &self.name
    }

    pub fn objects(&self) -> impl Iterator<Item = (&CodeName, &ObjectInfo)> {
        self.objects.iter()
    }

    pub fn object(&self, name: &str) -> Option<&ObjectInfo> {
        self.objects.get(name)
    }
}

/// Build the full mapping of a domain. Fails on the first object that
/// cannot be mapped, naming it in the error context.
pub(crate) fn domain_info(
    dialect: &dyn Dialect,
    prefer_identities: bool,
    domain: &Domain,
) -> Result<DomainInfo> {
    let mut objects = IndexMap::with_capacity(domain.objects().len());
    for (name, object) in domain.objects().iter() {
        let info = object_info(dialect, prefer_identities, domain.name(), object)
            .map_err(|e| e.with_context(format!("in object {name}")))?;
        objects.insert(name.clone(), info);
    }
    Ok(DomainInfo {
        name: domain.name().clone(),
        objects,
    })
}

fn object_info(
    dialect: &dyn Dialect,
    prefer_identities: bool,
    domain_name: &CodeName,
    object: &Object,
) -> Result<ObjectInfo> {
    let mapper = Mapper::new(dialect);
    let policy = dialect.primary_key_policy(object, prefer_identities);
    let auto_id = matches!(policy, PrimaryKeyPolicy::Surrogate { .. });
    let table_name = TableName::main(domain_name, object.name());
    let mut table = Table::new(table_name, dialect.table_options(auto_id));

    // scalar fields first; lists need the finished primary key
    let mut definitions: IndexMap<CodeName, FieldDefinition> = IndexMap::new();
    let mut list_fields: Vec<(CodeName, Field)> = Vec::new();
    for (name, field) in object.fields().iter() {
        if field.field_type() == FieldType::List {
            list_fields.push((name.clone(), field.clone()));
            continue;
        }
        let definition = mapper.field_definition(field)?;
        if definition.codec.width() != definition.columns.len() {
            return Err(MapError::system(format!(
                "field \"{name}\" maps {} columns but encodes {} values, this should never happen",
                definition.columns.len(),
                definition.codec.width()
            )));
        }
        for column in &definition.columns {
            table.push_column(column.clone())?;
        }
        definitions.insert(name.clone(), definition);
    }

    let mut chosen = None;
    let primary_key = match policy {
        PrimaryKeyPolicy::Identity(index) => {
            chosen = Some(index);
            let identity = &object.identities()[index];
            let mut key_columns = Vec::new();
            for field_name in &identity.fields {
                let definition = definitions.get(field_name).ok_or_else(|| {
                    MapError::system(format!(
                        "identity field \"{field_name}\" has no mapping, this should never happen"
                    ))
                })?;
                key_columns.extend(definition.equality_columns.iter().cloned());
            }
            table.constraint.primary_key = key_columns;
            PrimaryKey::Identity {
                fields: identity.fields.clone(),
            }
        }
        PrimaryKeyPolicy::Surrogate { column_type } => {
            let mut column = Column::new(AUTO_ID_COLUMN, column_type);
            column.not_null = true;
            column.primary_key = true;
            table.push_column_front(column)?;
            PrimaryKey::Surrogate
        }
    };

    // remaining identities become UNIQUE constraints, ranges become CHECKs
    for (index, identity) in object.identities().iter().enumerate() {
        if chosen == Some(index) {
            continue;
        }
        let mut unique = Vec::new();
        for field_name in &identity.fields {
            unique.extend(equality_columns(object, &definitions, field_name)?);
        }
        if !unique.is_empty() {
            table.constraint.uniques.push(unique);
        }
        for range in &identity.ranges {
            table.constraint.checks.push(range_check(object, &definitions, range)?);
        }
    }
    for range in object.ranges() {
        table.constraint.checks.push(range_check(object, &definitions, range)?);
    }

    // list fields, keyed by the owner primary key
    let owner_key = owner_key_columns(dialect, &table, &definitions, &primary_key)?;
    let mut helper_tables: IndexMap<String, Table> = IndexMap::new();
    for (name, field) in &list_fields {
        let definition = mapper.list_definition(field, &table.name, &owner_key)?;
        for helper in &definition.helper_tables {
            let helper_name = helper.name.to_string();
            if helper_tables.contains_key(&helper_name) {
                return Err(MapError::system(format!(
                    "table with name=\"{helper_name}\" inserted again, this should never happen"
                )));
            }
            helper_tables.insert(helper_name, helper.clone());
        }
        definitions.insert(name.clone(), definition);
    }

    // rebuild per-field info in the object's declared order; list
    // mappings were appended last
    let mut fields = IndexMap::with_capacity(object.fields().len());
    for (name, field) in object.fields().iter() {
        let definition = definitions.shift_remove(name).ok_or_else(|| {
            MapError::system(format!(
                "field \"{name}\" has no mapping, this should never happen"
            ))
        })?;
        fields.insert(
            name.clone(),
            FieldInfo {
                field: field.clone(),
                definition,
            },
        );
    }

    debug!(
        object = %object.name(),
        table = %table.name,
        columns = table.column_count(),
        helpers = helper_tables.len(),
        "object mapped"
    );
    Ok(ObjectInfo {
        name: object.name().clone(),
        fields,
        main_table: table,
        helper_tables,
        primary_key,
    })
}

/// Equality columns of a field named by an identity. The field must exist
/// and must store comparable columns in the main table.
fn equality_columns(
    object: &Object,
    definitions: &IndexMap<CodeName, FieldDefinition>,
    name: &CodeName,
) -> Result<Vec<String>> {
    let field = object
        .field(name.as_str())
        .ok_or_else(|| MapError::field_not_found(name.as_str()))?;
    let definition = definitions
        .get(name)
        .filter(|d| !d.equality_columns.is_empty())
        .ok_or_else(|| {
            MapError::field_not_supported(field.field_type().name(), name.as_str())
        })?;
    Ok(definition.equality_columns.clone())
}

/// CHECK expression for a range: `start < end`, or `<=` when the end value
/// is included. Composite fields compare by their first sort column.
fn range_check(
    object: &Object,
    definitions: &IndexMap<CodeName, FieldDefinition>,
    range: &Range,
) -> Result<Expression> {
    let operator = if range.include_end { "<=" } else { "<" };
    Ok(Expression::binary(
        operator,
        vec![
            Expression::value(sort_column(object, definitions, &range.start)?),
            Expression::value(sort_column(object, definitions, &range.end)?),
        ],
    ))
}

fn sort_column(
    object: &Object,
    definitions: &IndexMap<CodeName, FieldDefinition>,
    name: &CodeName,
) -> Result<String> {
    let field = object
        .field(name.as_str())
        .ok_or_else(|| MapError::field_not_found(name.as_str()))?;
    definitions
        .get(name)
        .and_then(|d| d.sort_columns.first())
        .cloned()
        .ok_or_else(|| MapError::field_not_supported(field.field_type().name(), name.as_str()))
}

/// Columns a helper table copies to reference the owner's primary key.
fn owner_key_columns(
    dialect: &dyn Dialect,
    table: &Table,
    definitions: &IndexMap<CodeName, FieldDefinition>,
    primary_key: &PrimaryKey,
) -> Result<Vec<Column>> {
    match primary_key {
        PrimaryKey::Identity { fields } => {
            let mut columns = Vec::new();
            for field_name in fields {
                let definition = definitions.get(field_name).ok_or_else(|| {
                    MapError::system(format!(
                        "identity field \"{field_name}\" has no mapping, this should never happen"
                    ))
                })?;
                for column_name in &definition.equality_columns {
                    let column = table.column(column_name).ok_or_else(|| {
                        MapError::system(format!(
                            "key column \"{column_name}\" is missing from the table, this should never happen"
                        ))
                    })?;
                    columns.push(column.clone());
                }
            }
            Ok(columns)
        }
        PrimaryKey::Surrogate => Ok(vec![
            Column::new(AUTO_ID_COLUMN, dialect.auto_id_reference_type()).not_null(true),
        ]),
    }
}
