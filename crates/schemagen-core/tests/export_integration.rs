//! End-to-end tests for the export pipeline.

mod common;

use common::{blog, cyclic, export_ok, load, position};
use schemagen_core::prelude::*;
use schemagen_core::{CycleError, ValidationErrorKind};

const EDITOR_DOCUMENT: &str = r##"{
    "tables": [
        {
            "name": "orders",
            "color": "#f97316",
            "engine": "InnoDB",
            "columns": [
                {"name": "id", "type": "BIGINT", "primaryKey": true, "autoIncrement": true},
                {"name": "customer_id", "type": "INT", "notNull": true},
                {"name": "status", "type": "ENUM", "enumValues": ["new", "paid"], "default": "new"},
                {"name": "note", "type": "TEXT", "default": ""},
                {"name": "placed_at", "type": "DATETIME", "default": "CURRENT_TIMESTAMP"}
            ],
            "foreignKeys": [
                {
                    "column": "customer_id",
                    "references": {"table": "customers", "column": "id"},
                    "relationType": "n:1",
                    "onDelete": "RESTRICT",
                    "onUpdate": ""
                }
            ]
        },
        {
            "name": "customers",
            "engine": "",
            "columns": [
                {"name": "id", "type": "INT", "primaryKey": true, "autoIncrement": true},
                {"name": "email", "type": "VARCHAR(120)", "notNull": true, "unique": true}
            ]
        }
    ]
}"##;

#[test]
fn test_postgres_blog_script() {
    let sql = export_ok(&blog(), "postgres");
    assert_eq!(
        sql,
        concat!(
            "CREATE TABLE \"users\" (\n",
            "    \"id\" SERIAL PRIMARY KEY,\n",
            "    \"name\" VARCHAR(64) NOT NULL\n",
            ");\n",
            "\n",
            "CREATE TABLE \"posts\" (\n",
            "    \"id\" SERIAL PRIMARY KEY,\n",
            "    \"title\" VARCHAR(255) NOT NULL,\n",
            "    \"author_id\" INTEGER,\n",
            "    CONSTRAINT \"fk_posts_author_id\" FOREIGN KEY (\"author_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE\n",
            ");\n",
        )
    );
}

#[test]
fn test_mysql_blog_script() {
    let sql = export_ok(&blog(), "mysql");
    assert!(position(&sql, "CREATE TABLE `users`") < position(&sql, "CREATE TABLE `posts`"));
    assert!(sql.contains("`id` INT AUTO_INCREMENT PRIMARY KEY"));
    assert!(sql.contains("REFERENCES `users` (`id`) ON DELETE CASCADE"));
}

#[test]
fn test_export_is_deterministic() {
    let schema = load(EDITOR_DOCUMENT);
    for format in ExportFormat::ALL {
        let first = export_as(&schema, format).unwrap();
        let second = export_as(&schema.clone(), format).unwrap();
        assert_eq!(first, second, "{format} output differs between runs");
    }
}

#[test]
fn test_referenced_tables_come_first_in_every_format() {
    let schema = load(EDITOR_DOCUMENT);
    let pg = export_ok(&schema, "postgres");
    assert!(position(&pg, "CREATE TABLE \"customers\"") < position(&pg, "CREATE TABLE \"orders\""));

    let mongo = export_ok(&schema, "mongo");
    assert!(
        position(&mongo, "db.createCollection(\"customers\"")
            < position(&mongo, "db.createCollection(\"orders\"")
    );
}

#[test]
fn test_editor_document_to_mysql() {
    let sql = export_ok(&load(EDITOR_DOCUMENT), "mysql");
    assert!(sql.contains("`id` BIGINT AUTO_INCREMENT PRIMARY KEY"));
    assert!(sql.contains("`status` ENUM('new', 'paid') DEFAULT 'new'"));
    assert!(sql.contains("`note` TEXT DEFAULT ('')"));
    assert!(sql.contains("`placed_at` DATETIME DEFAULT CURRENT_TIMESTAMP"));
    assert!(sql.contains("REFERENCES `customers` (`id`) ON DELETE RESTRICT\n) ENGINE=InnoDB;"));
    assert!(!sql.contains("ON UPDATE"));
    assert!(sql.contains("`email` VARCHAR(120) NOT NULL UNIQUE\n);"));
}

#[test]
fn test_generated_names_are_unique_across_tables() {
    let schema = SchemaData::new()
        .table(Table::new("t").column(Column::new("id", "integer").primary_key()))
        .table(
            Table::new("a_b")
                .column(Column::new("c", "integer"))
                .column(Column::new("kind", "enum").enum_values(["x"]))
                .foreign_key(ForeignKey::new("c", "t", "id")),
        )
        .table(
            Table::new("a")
                .column(Column::new("b_c", "integer"))
                .column(Column::new("b_kind", "enum").enum_values(["y"]))
                .foreign_key(ForeignKey::new("b_c", "t", "id")),
        );

    let mysql = export_ok(&schema, "mysql");
    assert_eq!(mysql.matches("CONSTRAINT `fk_a_b_c` ").count(), 1);
    assert!(mysql.contains("CONSTRAINT `fk_a_b_c_2` FOREIGN KEY (`b_c`)"));

    let pg = export_ok(&schema, "postgres");
    assert!(pg.contains("CREATE TYPE \"a_b_kind_enum\" AS ENUM ('x');"));
    assert!(pg.contains("CREATE TYPE \"a_b_kind_enum_2\" AS ENUM ('y');"));
    assert!(pg.contains("\"b_kind\" \"a_b_kind_enum_2\""));
    assert!(pg.contains("CONSTRAINT \"fk_a_b_c_2\""));
}

#[test]
fn test_enum_values_are_exactly_the_declared_ones() {
    let schema = SchemaData::new().table(
        Table::new("paints")
            .column(Column::new("id", "integer").primary_key())
            .column(Column::new("color", "enum").enum_values(["red", "green"])),
    );

    let pg = export_ok(&schema, "postgres");
    assert!(pg.contains("CREATE TYPE \"paints_color_enum\" AS ENUM ('red', 'green');"));

    let mysql = export_ok(&schema, "mysql");
    assert!(mysql.contains("`color` ENUM('red', 'green')"));

    let mongo = export_ok(&schema, "mongo");
    let enum_start = position(&mongo, "\"enum\": [");
    let enum_block = &mongo[enum_start..enum_start + position(&mongo[enum_start..], "]")];
    assert!(enum_block.contains("\"red\"") && enum_block.contains("\"green\""));
    assert_eq!(enum_block.matches('"').count(), 6);
}

#[test]
fn test_three_table_cycle_fails() {
    let err = export(&cyclic(), "postgres").unwrap_err();
    match err {
        ExportError::Cycle(CycleError { ref tables }) => {
            assert_eq!(tables, &["a", "b", "c"]);
        }
        ref other => panic!("Expected cycle error, got {other:?}"),
    }
    assert!(err.to_string().contains("a -> b -> c -> a"));
}

#[test]
fn test_self_reference_exports() {
    let schema = SchemaData::new().table(
        Table::new("employees")
            .column(Column::new("id", "integer").primary_key().auto_increment())
            .column(Column::new("manager_id", "integer"))
            .foreign_key(
                ForeignKey::new("manager_id", "employees", "id")
                    .on_delete(ForeignKeyAction::SetNull),
            ),
    );
    for format in ExportFormat::ALL {
        assert!(export_as(&schema, format).is_ok(), "{format} rejected a self-reference");
    }
    let sql = export_ok(&schema, "postgres");
    assert!(sql.contains("REFERENCES \"employees\" (\"id\") ON DELETE SET NULL"));
}

#[test]
fn test_duplicate_table_is_rejected() {
    let users = Table::new("users").column(Column::new("id", "integer").primary_key());
    let schema = SchemaData::new().table(users.clone()).table(users);
    match export(&schema, "mysql").unwrap_err() {
        ExportError::Validation(err) => {
            assert_eq!(err.kind, ValidationErrorKind::DuplicateTable);
            assert!(err.detail.contains("users"));
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[test]
fn test_validation_runs_before_format_specific_work() {
    let schema = SchemaData::new().table(
        Table::new("posts")
            .column(Column::new("author_id", "integer"))
            .foreign_key(ForeignKey::new("author_id", "users", "id")),
    );
    for format in ExportFormat::ALL {
        let err = export_as(&schema, format).unwrap_err();
        assert!(matches!(err, ExportError::Validation(_)));
    }
}

#[test]
fn test_unsupported_format() {
    for format in ["oracle", "Postgres", "POSTGRES", "sqlite"] {
        match export(&blog(), format).unwrap_err() {
            ExportError::UnsupportedFormat(err) => assert_eq!(err.format, format),
            other => panic!("Expected unsupported format, got {other:?}"),
        }
    }
}

#[test]
fn test_unknown_type_produces_no_output() {
    let schema = blog().table(
        Table::new("places")
            .column(Column::new("id", "integer").primary_key())
            .column(Column::new("shape", "geometry")),
    );
    let err = export(&schema, "postgres").unwrap_err();
    match err {
        ExportError::UnknownType(ref e) => {
            assert_eq!(e.token, "geometry");
            assert_eq!(e.table, "places");
            assert_eq!(e.column, "shape");
        }
        ref other => panic!("Expected unknown type, got {other:?}"),
    }
    assert!(err.is_client_error());
}

#[test]
fn test_mongo_script() {
    let script = export_ok(&blog(), "mongo");
    assert!(position(&script, "db.createCollection(\"users\"") < position(&script, "db.createCollection(\"posts\""));
    assert!(script.contains("\"bsonType\": \"object\""));
    assert!(script.contains("\"required\": [\n"));
    assert!(script.contains("\"description\": \"references users.id (on delete CASCADE)\""));
    assert!(script.contains("db.getCollection(\"posts\").createIndex({\"id\":1}, { \"unique\": true });"));
}

#[test]
fn test_export_request_round_trip() {
    let request: ExportRequest = serde_json::from_value(serde_json::json!({
        "data": serde_json::to_value(blog()).unwrap(),
        "format": "mongo",
    }))
    .unwrap();
    let response = export_request(&request).unwrap();
    assert_eq!(response.format, "mongo");
    assert_eq!(response.sql, export_ok(&blog(), "mongo"));
    assert_eq!(
        attachment_filename("blog", ExportFormat::Mongo),
        "blog_mongo.js"
    );
}
