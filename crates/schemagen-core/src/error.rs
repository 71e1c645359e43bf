//! Error types for the export engine.
//!
//! Every stage of the pipeline has its own error type naming the entity that
//! made the export fail. [`ExportError`] wraps them so the dispatcher can
//! short-circuit with `?`.

use std::fmt;

/// The requested format identifier is not one of the recognized formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported export format '{format}'")]
pub struct UnsupportedFormatError {
    /// The identifier the caller asked for.
    pub format: String,
}

/// What kind of structural problem the validator found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// A table has an empty name.
    EmptyTableName,
    /// Two tables share a name.
    DuplicateTable,
    /// A table has no columns.
    NoColumns,
    /// A column has an empty name.
    EmptyColumnName,
    /// Two columns of the same table share a name.
    DuplicateColumn,
    /// A foreign key references a table that does not exist.
    UnknownReferencedTable,
    /// A foreign key references a column that does not exist.
    UnknownReferencedColumn,
    /// A primary key column has no type.
    MissingPrimaryKeyType,
    /// A foreign key is declared on a column the table does not have.
    UnknownForeignKeyColumn,
    /// An enumeration column has no values.
    EmptyEnumValues,
    /// An auto-increment column does not have an integer type.
    NonIntegerAutoIncrement,
}

impl ValidationErrorKind {
    /// Returns a short human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyTableName => "empty table name",
            Self::DuplicateTable => "duplicate table",
            Self::NoColumns => "no columns",
            Self::EmptyColumnName => "empty column name",
            Self::DuplicateColumn => "duplicate column",
            Self::UnknownReferencedTable => "unknown referenced table",
            Self::UnknownReferencedColumn => "unknown referenced column",
            Self::MissingPrimaryKeyType => "missing primary key type",
            Self::UnknownForeignKeyColumn => "unknown foreign key column",
            Self::EmptyEnumValues => "empty enum values",
            Self::NonIntegerAutoIncrement => "non-integer auto-increment",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural problem in the input schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid schema ({kind}): {detail}")]
pub struct ValidationError {
    /// Which check failed.
    pub kind: ValidationErrorKind,
    /// The offending table/column/reference.
    pub detail: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Foreign keys form a cycle through two or more distinct tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Circular foreign key dependency: {}", format_cycle(.tables))]
pub struct CycleError {
    /// Tables on the cycle, in traversal order.
    pub tables: Vec<String>,
}

fn format_cycle(tables: &[String]) -> String {
    let mut path = tables.join(" -> ");
    if let Some(first) = tables.first() {
        path.push_str(" -> ");
        path.push_str(first);
    }
    path
}

/// A column type has no mapping in the selected dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown type '{token}' for {dialect} (column {table}.{column})")]
pub struct UnknownTypeError {
    /// The abstract type token as written in the schema.
    pub token: String,
    /// Dialect that could not map it.
    pub dialect: &'static str,
    /// Table owning the column.
    pub table: String,
    /// Column carrying the token.
    pub column: String,
}

/// Any failure of a single export call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The requested format is not recognized.
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    /// The schema failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The foreign key graph has a cycle.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// A column type could not be mapped.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// Rendering failed for a reason unrelated to the input.
    #[error("Internal export failure: {0}")]
    Internal(String),
}

impl ExportError {
    /// Returns `true` when the failure is caused by the caller's input.
    ///
    /// An HTTP layer maps these to 400 and everything else to 500.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
