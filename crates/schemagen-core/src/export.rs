//! Export dispatch and the request/response contract.
//!
//! [`export`] is the single pipeline: resolve the format, validate, order,
//! emit. Each stage short-circuits, so a failed export never yields output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dialect::{Emitter, MongoDialect, MysqlDialect, PostgresDialect};
use crate::error::{Result, UnsupportedFormatError};
use crate::order::order;
use crate::schema::SchemaData;
use crate::validate::validate;

/// A supported export target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PostgreSQL DDL.
    #[default]
    Postgres,
    /// MySQL DDL.
    Mysql,
    /// MongoDB shell script with `$jsonSchema` validators.
    Mongo,
}

impl ExportFormat {
    /// Every supported format, in listing order.
    pub const ALL: [Self; 3] = [Self::Postgres, Self::Mysql, Self::Mongo];

    /// Returns the format identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mongo => "mongo",
        }
    }

    /// File extension of a downloaded artifact.
    #[must_use]
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Postgres | Self::Mysql => "sql",
            Self::Mongo => "js",
        }
    }

    /// Returns `true` for SQL targets.
    #[must_use]
    pub const fn is_relational(self) -> bool {
        matches!(self, Self::Postgres | Self::Mysql)
    }

    /// Resolves a caller-supplied format, treating an empty one as the
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormatError`] for any other unrecognized value.
    pub fn resolve(format: &str) -> std::result::Result<Self, UnsupportedFormatError> {
        if format.is_empty() {
            Ok(Self::default())
        } else {
            format.parse()
        }
    }

    const fn emitter(self) -> &'static dyn Emitter {
        match self {
            Self::Postgres => &PostgresDialect,
            Self::Mysql => &MysqlDialect,
            Self::Mongo => &MongoDialect,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = UnsupportedFormatError;

    /// Identifiers are case-sensitive.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnsupportedFormatError {
                format: s.to_string(),
            })
    }
}

/// Body of an export request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The schema to export.
    pub data: SchemaData,
    /// Requested format identifier; empty means the default.
    #[serde(default)]
    pub format: String,
}

/// Inline export result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    /// The generated script.
    pub sql: String,
    /// The format it was generated for.
    pub format: String,
}

/// Exports `schema` in the format named by `format`.
///
/// # Errors
///
/// Fails with the first error of the pipeline: an unsupported format, a
/// validation failure, a foreign key cycle or an unmappable column type.
pub fn export(schema: &SchemaData, format: &str) -> Result<String> {
    export_as(schema, ExportFormat::resolve(format)?)
}

/// Exports `schema` in an already resolved format.
///
/// # Errors
///
/// See [`export`].
pub fn export_as(schema: &SchemaData, format: ExportFormat) -> Result<String> {
    validate(schema)?;
    let tables = order(&schema.tables)?;
    format.emitter().emit(&tables)
}

/// Handles an export request, producing the inline response.
///
/// # Errors
///
/// See [`export`].
pub fn export_request(request: &ExportRequest) -> Result<ExportResponse> {
    let format = ExportFormat::resolve(&request.format)?;
    let sql = export_as(&request.data, format)?;
    Ok(ExportResponse {
        sql,
        format: format.as_str().to_string(),
    })
}

/// File name for a downloaded artifact: `<name>_<format>.<ext>`.
#[must_use]
pub fn attachment_filename(schema_name: &str, format: ExportFormat) -> String {
    format!(
        "{schema_name}_{}.{}",
        format.as_str(),
        format.file_extension()
    )
}
