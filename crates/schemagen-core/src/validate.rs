//! Structural checks run before any code is generated.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. table names are non-empty and unique (case-sensitive);
//! 2. every table has columns, and their names are non-empty and unique
//!    within the table;
//! 3. every foreign key resolves to an existing table and column;
//! 4. every primary key column has a type;
//!
//! followed by the checks that need a well-formed schema: foreign key source
//! columns exist, enumerations carry values, and auto-increment columns are
//! integers.

use std::collections::HashSet;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::schema::{SchemaData, Table};
use crate::types::TypeToken;

/// Validates `schema`.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, identifying the offending
/// table, column or reference.
pub fn validate(schema: &SchemaData) -> Result<(), ValidationError> {
    check_table_names(schema)?;
    for table in &schema.tables {
        check_column_names(table)?;
    }
    for table in &schema.tables {
        check_references(schema, table)?;
    }
    for table in &schema.tables {
        check_primary_key_types(table)?;
    }
    for table in &schema.tables {
        check_foreign_key_columns(table)?;
        check_enum_values(table)?;
        check_auto_increment(table)?;
    }
    Ok(())
}

fn check_table_names(schema: &SchemaData) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for (index, table) in schema.tables.iter().enumerate() {
        if table.name.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::EmptyTableName,
                format!("table #{} has no name", index + 1),
            ));
        }
        if !seen.insert(table.name.as_str()) {
            return Err(ValidationError::new(
                ValidationErrorKind::DuplicateTable,
                format!("table '{}' is defined more than once", table.name),
            ));
        }
    }
    Ok(())
}

fn check_column_names(table: &Table) -> Result<(), ValidationError> {
    if table.columns.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::NoColumns,
            format!("table '{}' has no columns", table.name),
        ));
    }
    let mut seen = HashSet::new();
    for (index, column) in table.columns.iter().enumerate() {
        if column.name.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::EmptyColumnName,
                format!("column #{} of table '{}' has no name", index + 1, table.name),
            ));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(ValidationError::new(
                ValidationErrorKind::DuplicateColumn,
                format!(
                    "column '{}' is defined more than once in table '{}'",
                    column.name, table.name
                ),
            ));
        }
    }
    Ok(())
}

fn check_references(schema: &SchemaData, table: &Table) -> Result<(), ValidationError> {
    for fk in &table.foreign_keys {
        let target = &fk.references;
        let Some(referenced) = schema.get_table(&target.table) else {
            return Err(ValidationError::new(
                ValidationErrorKind::UnknownReferencedTable,
                format!(
                    "{}.{} references missing table '{}'",
                    table.name, fk.column, target.table
                ),
            ));
        };
        if referenced.get_column(&target.column).is_none() {
            return Err(ValidationError::new(
                ValidationErrorKind::UnknownReferencedColumn,
                format!(
                    "{}.{} references missing column '{}.{}'",
                    table.name, fk.column, target.table, target.column
                ),
            ));
        }
    }
    Ok(())
}

fn check_primary_key_types(table: &Table) -> Result<(), ValidationError> {
    match table
        .columns
        .iter()
        .find(|c| c.primary_key && c.data_type.trim().is_empty())
    {
        Some(column) => Err(ValidationError::new(
            ValidationErrorKind::MissingPrimaryKeyType,
            format!("primary key {}.{} has no type", table.name, column.name),
        )),
        None => Ok(()),
    }
}

fn check_foreign_key_columns(table: &Table) -> Result<(), ValidationError> {
    match table
        .foreign_keys
        .iter()
        .find(|fk| table.get_column(&fk.column).is_none())
    {
        Some(fk) => Err(ValidationError::new(
            ValidationErrorKind::UnknownForeignKeyColumn,
            format!(
                "foreign key on missing column {}.{}",
                table.name, fk.column
            ),
        )),
        None => Ok(()),
    }
}

fn check_enum_values(table: &Table) -> Result<(), ValidationError> {
    match table
        .columns
        .iter()
        .find(|c| c.is_enum() && c.enum_values_or_empty().is_empty())
    {
        Some(column) => Err(ValidationError::new(
            ValidationErrorKind::EmptyEnumValues,
            format!(
                "enumeration {}.{} has no values",
                table.name, column.name
            ),
        )),
        None => Ok(()),
    }
}

/// Unrecognized tokens are left for the type mapper to report.
fn check_auto_increment(table: &Table) -> Result<(), ValidationError> {
    for column in table.columns.iter().filter(|c| c.auto_increment) {
        if let Some(token) = TypeToken::parse(&column.data_type) {
            if !token.base.is_integer() {
                return Err(ValidationError::new(
                    ValidationErrorKind::NonIntegerAutoIncrement,
                    format!(
                        "auto-increment column {}.{} has type '{}'",
                        table.name, column.name, column.data_type
                    ),
                ));
            }
        }
    }
    Ok(())
}
