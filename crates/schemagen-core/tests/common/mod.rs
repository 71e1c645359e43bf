#![allow(dead_code)]

use schemagen_core::prelude::*;

/// `users` and `posts`, with `posts` authored first so ordering is
/// observable.
pub fn blog() -> SchemaData {
    SchemaData::new()
        .table(
            Table::new("posts")
                .column(Column::new("id", "integer").primary_key().auto_increment())
                .column(Column::new("title", "varchar(255)").not_null())
                .column(Column::new("author_id", "integer"))
                .foreign_key(
                    ForeignKey::new("author_id", "users", "id")
                        .on_delete(ForeignKeyAction::Cascade),
                ),
        )
        .table(
            Table::new("users")
                .column(Column::new("id", "integer").primary_key().auto_increment())
                .column(Column::new("name", "varchar(64)").not_null()),
        )
}

/// Three tables referencing each other in a loop.
pub fn cyclic() -> SchemaData {
    let link = |name: &str, target: &str| {
        Table::new(name)
            .column(Column::new("id", "integer").primary_key())
            .column(Column::new("next_id", "integer"))
            .foreign_key(ForeignKey::new("next_id", target, "id"))
    };
    SchemaData::new()
        .table(link("a", "b"))
        .table(link("b", "c"))
        .table(link("c", "a"))
}

pub fn load(json: &str) -> SchemaData {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("Invalid schema document: {e}\n{json}"))
}

pub fn export_ok(schema: &SchemaData, format: &str) -> String {
    export(schema, format).unwrap_or_else(|e| panic!("Export to {format} failed: {e}"))
}

/// Byte offset of `needle`, panicking with the script when it is missing.
pub fn position(script: &str, needle: &str) -> usize {
    script
        .find(needle)
        .unwrap_or_else(|| panic!("Expected {needle:?} in:\n{script}"))
}
