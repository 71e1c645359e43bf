//! PostgreSQL dialect.

use super::{Emitter, ScriptNames, SqlDialect, SqlTypeName, TypeMapper};
use crate::error::{ExportError, UnknownTypeError};
use crate::schema::{Column, Table};
use crate::types::AbstractType;

/// PostgreSQL dialect for DDL generation.
///
/// Enumerations become named types declared ahead of the table that uses
/// them, and auto-increment columns use the SERIAL family.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Base name of the enum type generated for `column` of `table`. The
    /// declared name gains a numeric suffix when another type or table
    /// already uses it.
    #[must_use]
    pub fn enum_type_name(table: &str, column: &Column) -> String {
        format!("{table}_{}_enum", column.name)
    }
}

impl SqlDialect for PostgresDialect {
    fn type_name(&self, ty: AbstractType) -> Option<SqlTypeName> {
        use AbstractType as T;
        let name = match ty {
            T::TinyInt | T::SmallInt | T::Year => SqlTypeName::plain("SMALLINT"),
            T::MediumInt | T::Integer => SqlTypeName::plain("INTEGER"),
            T::BigInt => SqlTypeName::plain("BIGINT"),
            T::Serial => SqlTypeName::plain("SERIAL"),
            T::BigSerial => SqlTypeName::plain("BIGSERIAL"),
            T::Decimal => SqlTypeName::sized("DECIMAL"),
            T::Numeric => SqlTypeName::sized("NUMERIC"),
            T::Real => SqlTypeName::plain("REAL"),
            T::Float => SqlTypeName::sized("FLOAT"),
            T::Double => SqlTypeName::plain("DOUBLE PRECISION"),
            T::Boolean => SqlTypeName::plain("BOOLEAN"),
            T::Date => SqlTypeName::plain("DATE"),
            T::Time => SqlTypeName::sized("TIME"),
            T::DateTime | T::Timestamp => SqlTypeName::sized("TIMESTAMP"),
            T::TimestampTz => SqlTypeName::sized("TIMESTAMPTZ"),
            T::Interval => SqlTypeName::plain("INTERVAL"),
            T::Char => SqlTypeName::sized("CHAR"),
            T::Varchar => SqlTypeName::sized("VARCHAR"),
            T::Text | T::TinyText | T::MediumText | T::LongText => SqlTypeName::plain("TEXT"),
            T::Binary
            | T::VarBinary
            | T::Blob
            | T::TinyBlob
            | T::MediumBlob
            | T::LongBlob
            | T::Bytea => SqlTypeName::plain("BYTEA"),
            T::Json => SqlTypeName::plain("JSON"),
            T::Jsonb => SqlTypeName::plain("JSONB"),
            T::Uuid => SqlTypeName::plain("UUID"),
            T::Enum | T::Set => return None,
        };
        Some(name)
    }

    fn serial_type(&self, ty: AbstractType) -> Option<&'static str> {
        match ty {
            AbstractType::TinyInt | AbstractType::SmallInt => Some("SMALLSERIAL"),
            AbstractType::MediumInt | AbstractType::Integer | AbstractType::Serial => {
                Some("SERIAL")
            }
            AbstractType::BigInt | AbstractType::BigSerial => Some("BIGSERIAL"),
            _ => None,
        }
    }

    fn enum_type(&self, table: &str, column: &Column, set: bool, names: &ScriptNames) -> String {
        let name = names.enum_type(table, &column.name).map_or_else(
            || self.quote_identifier(&Self::enum_type_name(table, column)),
            |declared| self.quote_identifier(declared),
        );
        if set {
            format!("{name}[]")
        } else {
            name
        }
    }

    fn before_table(&self, table: &Table, names: &mut ScriptNames) -> Vec<String> {
        table
            .columns
            .iter()
            .filter(|c| c.is_enum())
            .map(|column| {
                let name = names.declare_enum_type(
                    &table.name,
                    &column.name,
                    Self::enum_type_name(&table.name, column),
                );
                let values: Vec<String> = column
                    .enum_values_or_empty()
                    .iter()
                    .map(|v| self.quote_string(v))
                    .collect();
                format!(
                    "CREATE TYPE {} AS ENUM ({});",
                    self.quote_identifier(&name),
                    values.join(", ")
                )
            })
            .collect()
    }
}

impl TypeMapper for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn map_type(&self, table: &str, column: &Column) -> Result<String, UnknownTypeError> {
        self.column_type(TypeMapper::name(self), table, column, &ScriptNames::default())
    }
}

impl Emitter for PostgresDialect {
    fn emit(&self, tables: &[&Table]) -> Result<String, ExportError> {
        Ok(self.script(TypeMapper::name(self), tables)?)
    }
}
