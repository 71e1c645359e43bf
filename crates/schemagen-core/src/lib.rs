//! Dialect-aware DDL export for abstract database schemas.
//!
//! `schemagen-core` turns a designed schema (tables, columns, constraints and
//! foreign keys) into executable definition code for a target database:
//!
//! - **Schema model** - Plain data deserialized from the editor document
//! - **Validator** - Structural checks, stopping at the first failure
//! - **Orderer** - Puts referenced tables before the tables referencing them
//! - **Dialects** - Type mapping and script emission for PostgreSQL, MySQL
//!   and MongoDB
//! - **Export** - The pipeline tying the stages together by format
//!
//! # Example
//!
//! ```rust
//! use schemagen_core::prelude::*;
//!
//! let schema = SchemaData::new()
//!     .table(
//!         Table::new("users")
//!             .column(Column::new("id", "integer").primary_key().auto_increment())
//!             .column(Column::new("name", "varchar(64)").not_null()),
//!     )
//!     .table(
//!         Table::new("posts")
//!             .column(Column::new("id", "integer").primary_key().auto_increment())
//!             .column(Column::new("author_id", "integer"))
//!             .foreign_key(
//!                 ForeignKey::new("author_id", "users", "id")
//!                     .on_delete(ForeignKeyAction::Cascade),
//!             ),
//!     );
//!
//! let sql = export(&schema, "postgres").unwrap();
//! assert!(sql.find("\"users\"").unwrap() < sql.find("\"posts\"").unwrap());
//! assert!(sql.contains("ON DELETE CASCADE"));
//! ```

pub mod dialect;
pub mod error;
pub mod export;
pub mod order;
pub mod schema;
pub mod types;
pub mod validate;

pub use error::{
    CycleError, ExportError, Result, UnknownTypeError, UnsupportedFormatError, ValidationError,
    ValidationErrorKind,
};
pub use export::{
    attachment_filename, export, export_as, export_request, ExportFormat, ExportRequest,
    ExportResponse,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{
        Emitter, MongoDialect, MysqlDialect, PostgresDialect, SqlDialect, TypeMapper,
    };
    pub use crate::error::{ExportError, Result};
    pub use crate::export::{
        attachment_filename, export, export_as, export_request, ExportFormat, ExportRequest,
        ExportResponse,
    };
    pub use crate::order::order;
    pub use crate::schema::{
        Column, ForeignKey, ForeignKeyAction, Reference, RelationType, SchemaData, Table,
    };
    pub use crate::validate::validate;
}
