//! CLI integration tests for schemagen.
//!
//! These tests verify argument parsing, input handling, output placement
//! and exit codes for failing exports.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const BLOG: &str = r#"{
    "tables": [
        {
            "name": "posts",
            "columns": [
                {"name": "id", "type": "integer", "primaryKey": true, "autoIncrement": true},
                {"name": "author_id", "type": "integer"}
            ],
            "foreignKeys": [
                {"column": "author_id", "references": {"table": "users", "column": "id"}, "onDelete": "CASCADE"}
            ]
        },
        {
            "name": "users",
            "columns": [
                {"name": "id", "type": "integer", "primaryKey": true, "autoIncrement": true}
            ]
        }
    ]
}"#;

const CYCLE: &str = r#"{
    "tables": [
        {"name": "a", "columns": [{"name": "b_id", "type": "int"}, {"name": "id", "type": "int"}],
         "foreignKeys": [{"column": "b_id", "references": {"table": "b", "column": "id"}}]},
        {"name": "b", "columns": [{"name": "a_id", "type": "int"}, {"name": "id", "type": "int"}],
         "foreignKeys": [{"column": "a_id", "references": {"table": "a", "column": "id"}}]}
    ]
}"#;

/// Get a command for the schemagen binary, isolated from the caller's
/// environment.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("schemagen").unwrap();
    cmd.env_remove("SCHEMAGEN_FORMAT").env_remove("SCHEMAGEN_OUTPUT");
    cmd
}

fn schema_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn request(format: &str) -> String {
    format!(r#"{{"data": {BLOG}, "format": "{format}"}}"#)
}

// =============================================================================
// Help and Discovery
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("formats"));
}

#[test]
fn test_export_help_shows_env_fallbacks() {
    cmd()
        .args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SCHEMAGEN_FORMAT"))
        .stdout(predicate::str::contains("SCHEMAGEN_OUTPUT"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_formats_lists_extensions() {
    cmd()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres\t.sql"))
        .stdout(predicate::str::contains("mysql\t.sql"))
        .stdout(predicate::str::contains("mongo\t.js"));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_defaults_to_postgres() {
    let file = schema_file(BLOG);
    cmd()
        .arg("export")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("CREATE TABLE \"users\""))
        .stdout(predicate::str::contains("\"id\" SERIAL PRIMARY KEY"))
        .stdout(predicate::str::contains("ON DELETE CASCADE"));
}

#[test]
fn test_export_from_stdin() {
    cmd()
        .args(["export", "-", "--format", "mysql"])
        .write_stdin(BLOG)
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE `users`"))
        .stdout(predicate::str::contains("AUTO_INCREMENT"));
}

#[test]
fn test_request_format_is_used() {
    cmd()
        .args(["export", "-"])
        .write_stdin(request("mongo"))
        .assert()
        .success()
        .stdout(predicate::str::contains("db.createCollection(\"users\""));
}

#[test]
fn test_command_line_format_wins_over_request() {
    cmd()
        .args(["export", "-", "--format", "mysql"])
        .write_stdin(request("mongo"))
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE `posts`"))
        .stdout(predicate::str::contains("createCollection").not());
}

#[test]
fn test_format_from_environment() {
    cmd()
        .env("SCHEMAGEN_FORMAT", "mysql")
        .args(["export", "-"])
        .write_stdin(BLOG)
        .assert()
        .success()
        .stdout(predicate::str::contains("`users`"));
}

#[test]
fn test_json_payload() {
    let output = cmd()
        .args(["export", "-", "--json"])
        .write_stdin(BLOG)
        .output()
        .unwrap();
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["format"], "postgres");
    assert!(payload["sql"]
        .as_str()
        .unwrap()
        .contains("REFERENCES \"users\" (\"id\")"));
}

#[test]
fn test_output_directory_uses_attachment_name() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["export", "-", "--format", "mongo", "--name", "blog", "--output"])
        .arg(dir.path())
        .write_stdin(BLOG)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let script = std::fs::read_to_string(dir.path().join("blog_mongo.js")).unwrap();
    assert!(script.contains("$jsonSchema"));
}

#[test]
fn test_output_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.sql");
    cmd()
        .args(["export", "-", "--output"])
        .arg(&path)
        .write_stdin(BLOG)
        .assert()
        .success();

    let sql = std::fs::read_to_string(path).unwrap();
    assert!(sql.contains("CREATE TABLE \"posts\""));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unsupported_format_fails() {
    cmd()
        .args(["export", "-", "--format", "oracle"])
        .write_stdin(BLOG)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unsupported export format 'oracle'"));
}

#[test]
fn test_cycle_fails() {
    cmd()
        .args(["export", "-"])
        .write_stdin(CYCLE)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Circular foreign key dependency: a -> b -> a"));
}

#[test]
fn test_missing_input_file_fails() {
    cmd()
        .args(["export", "/nonexistent/schema.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_malformed_document_fails() {
    cmd()
        .args(["export", "-"])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schema document"));
}

#[test]
fn test_bad_field_value_is_reported() {
    let doc = BLOG.replace("\"CASCADE\"", "\"EXPLODE\"");
    cmd()
        .args(["export", "-"])
        .write_stdin(doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schema document"))
        .stderr(predicate::str::contains("unknown foreign key action 'EXPLODE'"));
}

#[test]
fn test_bad_field_value_in_request_is_reported() {
    let doc = request("mysql").replace("\"CASCADE\"", "\"EXPLODE\"");
    cmd()
        .args(["export", "-"])
        .write_stdin(doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown foreign key action 'EXPLODE'"));
}

#[test]
fn test_document_without_tables_fails() {
    cmd()
        .args(["export", "-"])
        .write_stdin(r#"{"foo": 1}"#)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid schema document"))
        .stderr(predicate::str::contains("\"tables\""));
}

// =============================================================================
// Validate
// =============================================================================

#[test]
fn test_validate_prints_creation_order() {
    let file = schema_file(BLOG);
    cmd()
        .arg("validate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("1. users\n2. posts\n"));
}

#[test]
fn test_validate_reports_dangling_reference() {
    let doc = r#"{"tables": [{"name": "posts", "columns": [{"name": "author_id", "type": "int"}],
        "foreignKeys": [{"column": "author_id", "references": {"table": "users", "column": "id"}}]}]}"#;
    cmd()
        .args(["validate", "-"])
        .write_stdin(doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing table 'users'"));
}
