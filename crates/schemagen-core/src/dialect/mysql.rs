//! MySQL dialect.

use super::{Emitter, ScriptNames, SqlDialect, SqlTypeName, TypeMapper};
use crate::error::{ExportError, UnknownTypeError};
use crate::schema::{Column, Table};
use crate::types::AbstractType;

/// Storage engines written into `ENGINE=`, in their canonical spelling.
const ENGINES: &[&str] = &[
    "InnoDB",
    "MyISAM",
    "MEMORY",
    "CSV",
    "ARCHIVE",
    "BLACKHOLE",
    "MERGE",
    "FEDERATED",
    "NDB",
    "Aria",
    "RocksDB",
];

/// Index prefix used when a TEXT, BLOB or JSON column is part of a key.
const KEY_PREFIX_LENGTH: u32 = 255;

/// MySQL dialect for DDL generation.
///
/// Keys on TEXT, BLOB and JSON columns use an index prefix, and their
/// defaults are written as parenthesized expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Canonical spelling of a known storage engine, matched
    /// case-insensitively.
    #[must_use]
    pub fn canonical_engine(engine: &str) -> Option<&'static str> {
        let engine = engine.trim();
        ENGINES
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(engine))
    }
}

impl SqlDialect for MysqlDialect {
    fn quote_char(&self) -> char {
        '`'
    }

    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn type_name(&self, ty: AbstractType) -> Option<SqlTypeName> {
        use AbstractType as T;
        let name = match ty {
            T::TinyInt => SqlTypeName::sized("TINYINT"),
            T::SmallInt => SqlTypeName::sized("SMALLINT"),
            T::MediumInt => SqlTypeName::sized("MEDIUMINT"),
            T::Integer => SqlTypeName::sized("INT"),
            T::BigInt => SqlTypeName::sized("BIGINT"),
            T::Serial => SqlTypeName::plain("INT"),
            T::BigSerial => SqlTypeName::plain("BIGINT"),
            T::Decimal | T::Numeric => SqlTypeName::sized("DECIMAL"),
            T::Real | T::Float => SqlTypeName::sized("FLOAT"),
            T::Double => SqlTypeName::sized("DOUBLE"),
            T::Boolean => SqlTypeName::plain("BOOLEAN"),
            T::Date => SqlTypeName::plain("DATE"),
            T::Time => SqlTypeName::sized("TIME"),
            T::DateTime => SqlTypeName::sized("DATETIME"),
            T::Timestamp | T::TimestampTz => SqlTypeName::sized("TIMESTAMP"),
            T::Year => SqlTypeName::plain("YEAR"),
            T::Char => SqlTypeName::sized("CHAR"),
            T::Varchar => SqlTypeName::sized_or("VARCHAR", "255"),
            T::Text => SqlTypeName::sized("TEXT"),
            T::TinyText => SqlTypeName::plain("TINYTEXT"),
            T::MediumText => SqlTypeName::plain("MEDIUMTEXT"),
            T::LongText => SqlTypeName::plain("LONGTEXT"),
            T::Binary => SqlTypeName::sized("BINARY"),
            T::VarBinary => SqlTypeName::sized_or("VARBINARY", "255"),
            T::Blob => SqlTypeName::sized("BLOB"),
            T::TinyBlob => SqlTypeName::plain("TINYBLOB"),
            T::MediumBlob => SqlTypeName::plain("MEDIUMBLOB"),
            T::LongBlob | T::Bytea => SqlTypeName::plain("LONGBLOB"),
            T::Json | T::Jsonb => SqlTypeName::plain("JSON"),
            T::Uuid => SqlTypeName::plain("CHAR(36)"),
            T::Interval | T::Enum | T::Set => return None,
        };
        Some(name)
    }

    fn auto_increment_keyword(&self) -> Option<&'static str> {
        Some("AUTO_INCREMENT")
    }

    fn parenthesized_default(&self, ty: AbstractType) -> bool {
        is_long_value(ty)
    }

    fn key_prefix(&self, ty: AbstractType) -> Option<u32> {
        is_long_value(ty).then_some(KEY_PREFIX_LENGTH)
    }

    fn enum_type(&self, _table: &str, column: &Column, set: bool, _names: &ScriptNames) -> String {
        let values: Vec<String> = column
            .enum_values_or_empty()
            .iter()
            .map(|v| self.quote_string(v))
            .collect();
        let keyword = if set { "SET" } else { "ENUM" };
        format!("{keyword}({})", values.join(", "))
    }

    fn table_options(&self, table: &Table) -> Option<String> {
        table
            .engine
            .as_deref()
            .and_then(Self::canonical_engine)
            .map(|engine| format!("ENGINE={engine}"))
    }
}

/// The TEXT and BLOB families and JSON.
const fn is_long_value(ty: AbstractType) -> bool {
    use AbstractType as T;
    matches!(
        ty,
        T::Text
            | T::TinyText
            | T::MediumText
            | T::LongText
            | T::Blob
            | T::TinyBlob
            | T::MediumBlob
            | T::LongBlob
            | T::Bytea
            | T::Json
            | T::Jsonb
    )
}

impl TypeMapper for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn map_type(&self, table: &str, column: &Column) -> Result<String, UnknownTypeError> {
        self.column_type(TypeMapper::name(self), table, column, &ScriptNames::default())
    }
}

impl Emitter for MysqlDialect {
    fn emit(&self, tables: &[&Table]) -> Result<String, ExportError> {
        Ok(self.script(TypeMapper::name(self), tables)?)
    }
}
