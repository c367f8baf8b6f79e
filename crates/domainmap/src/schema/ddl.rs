//! Serialize the physical table model into CREATE TABLE statements.
//!
//! Output is deterministic: columns in declaration order, then primary key,
//! uniques, foreign keys, and checks. The dialect has already chosen type
//! names and table options; this module only formats.

use crate::error::{MapError, Result};
use crate::schema::{Expression, Table};

/// Render one CREATE TABLE statement.
///
/// A table without columns renders no valid SQL and fails with
/// [`MapError::FieldsNotDefined`].
pub fn create_table(table: &Table) -> Result<String> {
    if table.column_count() == 0 {
        return Err(MapError::fields_not_defined(table.name.to_string()));
    }
    let mut sql = format!("CREATE TABLE {} (", table.name);
    let mut first = true;
    for column in table.columns() {
        if first {
            first = false;
            sql.push_str("\n\t");
        } else {
            sql.push_str(",\n\t");
        }
        sql.push_str(&column.name);
        sql.push(' ');
        sql.push_str(&column.type_name);
        if !column.type_args.is_empty() {
            sql.push('(');
            sql.push_str(&column.type_args.join(", "));
            sql.push(')');
        }
        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if column.not_null {
            sql.push_str(" NOT NULL");
        }
    }

    let constraint = &table.constraint;
    if !constraint.primary_key.is_empty() {
        sql.push_str(&format!(
            ",\n\tPRIMARY KEY ({})",
            constraint.primary_key.join(",")
        ));
    }
    for unique in &constraint.uniques {
        sql.push_str(&format!(",\n\t     UNIQUE ({})", unique.join(",")));
    }
    for fk in &constraint.foreign_keys {
        sql.push_str(&format!(
            ",\n\tFOREIGN KEY ({}) REFERENCES {}({})",
            fk.columns.join(", "),
            fk.parent,
            fk.references.join(", ")
        ));
        if let Some(action) = fk.on_delete {
            sql.push_str(&format!(" ON DELETE {action}"));
        }
        if let Some(action) = fk.on_update {
            sql.push_str(&format!(" ON UPDATE {action}"));
        }
    }
    for check in &constraint.checks {
        sql.push_str(",\n\t      CHECK (");
        write_expression(&mut sql, check);
        sql.push(')');
    }

    sql.push_str("\n)");
    if !table.options.is_empty() {
        sql.push(' ');
        sql.push_str(&table.options.join(", "));
    }
    sql.push(';');
    Ok(sql)
}

fn write_expression(sql: &mut String, expression: &Expression) {
    match expression {
        Expression::Value(v) => sql.push_str(v),
        Expression::Unary { op, operand } => {
            sql.push_str(op);
            sql.push(' ');
            write_expression(sql, operand);
        }
        Expression::Binary { op, operands } => {
            let mut first = true;
            for operand in operands {
                if first {
                    first = false;
                } else {
                    sql.push(' ');
                    sql.push_str(op);
                    sql.push(' ');
                }
                write_expression(sql, operand);
            }
        }
        Expression::List(operands) => {
            sql.push('(');
            let mut first = true;
            for operand in operands {
                if first {
                    first = false;
                } else {
                    sql.push_str(", ");
                }
                write_expression(sql, operand);
            }
            sql.push(')');
        }
    }
}
