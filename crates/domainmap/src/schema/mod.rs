//! Physical schema model: tables, columns, constraints, and expressions.
//!
//! These types are a database-agnostic description of what a dialect will
//! receive as DDL. They are produced by the table builder, serialized by
//! [`ddl`], and consulted by the insert path for column order and counts.

pub mod build;
pub mod ddl;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::names::CodeName;
use crate::error::{MapError, Result};

/// Prefix marking engine-generated columns. User names can never start
/// with an underscore, so the namespaces cannot collide.
pub const SYSTEM_PREFIX: &str = "_";

/// Name of a surrogate auto-increment key column.
pub const AUTO_ID_COLUMN: &str = "_id";

/// A physical table name derived from the abstract model: main tables are
/// `{domain}_{object}`, helper tables `{main}__{field}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub domain: CodeName,
    pub object: CodeName,
    pub field: Option<CodeName>,
}

impl TableName {
    pub fn main(domain: &CodeName, object: &CodeName) -> Self {
        TableName {
            domain: domain.clone(),
            object: object.clone(),
            field: None,
        }
    }

    /// The helper table name for a field of this table.
    pub fn with_field(&self, field: &CodeName) -> Self {
        TableName {
            domain: self.domain.clone(),
            object: self.object.clone(),
            field: Some(field.clone()),
        }
    }

    pub fn is_helper(&self) -> bool {
        self.field.is_some()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.domain, self.object)?;
        if let Some(field) = &self.field {
            write!(f, "__{field}")?;
        }
        Ok(())
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    /// Native type name, written verbatim.
    pub type_name: String,

    /// Type arguments, when the type takes any (`VARCHAR(40)` style).
    pub type_args: Vec<String>,

    pub not_null: bool,

    /// Column-level PRIMARY KEY marker, used for surrogate keys.
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            type_name: type_name.into(),
            type_args: Vec::new(),
            not_null: false,
            primary_key: false,
        }
    }

    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    pub fn is_system(&self) -> bool {
        self.name.starts_with(SYSTEM_PREFIX)
    }
}

/// Referential action for foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnAction {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl fmt::Display for OnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnAction::NoAction => write!(f, "NO ACTION"),
            OnAction::Restrict => write!(f, "RESTRICT"),
            OnAction::SetNull => write!(f, "SET NULL"),
            OnAction::SetDefault => write!(f, "SET DEFAULT"),
            OnAction::Cascade => write!(f, "CASCADE"),
        }
    }
}

/// A foreign key from this table to a parent table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub parent: TableName,
    pub references: Vec<String>,
    pub on_delete: Option<OnAction>,
    pub on_update: Option<OnAction>,
}

/// A minimal expression tree, sufficient for generated CHECK constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A literal value, column name, or function name.
    Value(String),
    Unary {
        op: String,
        operand: Box<Expression>,
    },
    /// Two or more operands with the operator interleaved.
    Binary {
        op: String,
        operands: Vec<Expression>,
    },
    /// Parenthesized, comma-joined operands.
    List(Vec<Expression>),
}

impl Expression {
    pub fn value(v: impl Into<String>) -> Self {
        Expression::Value(v.into())
    }

    pub fn binary(op: impl Into<String>, operands: Vec<Expression>) -> Self {
        Expression::Binary {
            op: op.into(),
            operands,
        }
    }
}

/// Table-level constraints in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConstraint {
    /// Composite primary key column names; empty when a column-level
    /// primary key (surrogate) is used instead.
    pub primary_key: Vec<String>,
    pub uniques: Vec<Vec<String>>,
    pub foreign_keys: Vec<ForeignKey>,
    pub checks: Vec<Expression>,
}

/// A physical table: ordered columns plus constraints and dialect options.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: TableName,
    columns: IndexMap<String, Column>,
    pub constraint: TableConstraint,
    /// Dialect table options, appended after the closing parenthesis.
    pub options: Vec<String>,
}

impl Table {
    pub fn new(name: TableName, options: Vec<String>) -> Self {
        Table {
            name,
            columns: IndexMap::new(),
            constraint: TableConstraint::default(),
            options,
        }
    }

    /// Append a column. A duplicate name means a synthetic name clashed
    /// with an existing column, which the builder treats as a defect.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.columns.contains_key(&column.name) {
            return Err(MapError::system(format!(
                "column with name=\"{}\" inserted again, this should never happen",
                column.name
            )));
        }
        self.columns.insert(column.name.clone(), column);
        Ok(())
    }

    /// Insert a column in front of all existing ones (surrogate keys go
    /// first).
    pub fn push_column_front(&mut self, column: Column) -> Result<()> {
        if self.columns.contains_key(&column.name) {
            return Err(MapError::system(format!(
                "column with name=\"{}\" inserted again, this should never happen",
                column.name
            )));
        }
        self.columns.shift_insert(0, column.name.clone(), column);
        Ok(())
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Names of the columns that take part in INSERT statements, in
    /// declaration order. System columns are left to the database.
    pub fn data_columns(&self) -> Vec<String> {
        self.columns
            .values()
            .filter(|c| !c.is_system())
            .map(|c| c.name.clone())
            .collect()
    }
}
