//! MongoDB dialect.
//!
//! Emits a mongo shell script: one `db.createCollection` per table with a
//! `$jsonSchema` validator, followed by unique indexes for primary key and
//! unique columns. Foreign keys have no native counterpart and are recorded
//! in the field description only.

use serde_json::{json, Map, Value};

use super::{auto_increments, Emitter, TypeMapper};
use crate::error::{ExportError, UnknownTypeError};
use crate::schema::{Column, Table};
use crate::types::{AbstractType, TypeToken};

/// MongoDB dialect for collection validator scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDialect;

impl MongoDialect {
    /// Creates a new MongoDB dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    const fn bson_type(ty: AbstractType) -> &'static str {
        use AbstractType as T;
        match ty {
            T::TinyInt | T::SmallInt | T::MediumInt | T::Integer | T::Serial | T::Year => "int",
            T::BigInt | T::BigSerial => "long",
            T::Real | T::Float | T::Double => "double",
            T::Decimal | T::Numeric => "decimal",
            T::Boolean => "bool",
            T::Date | T::DateTime | T::Timestamp | T::TimestampTz => "date",
            T::Time
            | T::Interval
            | T::Char
            | T::Varchar
            | T::Text
            | T::TinyText
            | T::MediumText
            | T::LongText
            | T::Uuid
            | T::Enum => "string",
            T::Binary
            | T::VarBinary
            | T::Blob
            | T::TinyBlob
            | T::MediumBlob
            | T::LongBlob
            | T::Bytea => "binData",
            T::Json | T::Jsonb => "object",
            T::Set => "array",
        }
    }

    /// Builds the `$jsonSchema` property for one column.
    fn property(&self, table: &Table, column: &Column) -> Result<Value, UnknownTypeError> {
        let token =
            TypeToken::parse(&column.data_type).ok_or_else(|| self.unknown_type(&table.name, column))?;
        let bson_type = self.map_type(&table.name, column)?;

        let mut property = Map::new();
        property.insert("bsonType".to_string(), json!(bson_type));
        match token.base {
            AbstractType::Enum => {
                property.insert("enum".to_string(), json!(column.enum_values_or_empty()));
            }
            AbstractType::Set => {
                property.insert(
                    "items".to_string(),
                    json!({ "enum": column.enum_values_or_empty() }),
                );
            }
            AbstractType::Char | AbstractType::Varchar => {
                if let Some(length) = token.length() {
                    property.insert("maxLength".to_string(), json!(length));
                }
            }
            _ => {}
        }

        let description = describe(table, column);
        if !description.is_empty() {
            property.insert("description".to_string(), json!(description));
        }
        Ok(Value::Object(property))
    }

    /// Builds the `$jsonSchema` document for one table.
    fn json_schema(&self, table: &Table) -> Result<Value, UnknownTypeError> {
        let mut properties = Map::new();
        for column in &table.columns {
            properties.insert(column.name.clone(), self.property(table, column)?);
        }
        let required: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.primary_key || c.not_null)
            .map(|c| c.name.as_str())
            .collect();

        let mut schema = Map::new();
        schema.insert("bsonType".to_string(), json!("object"));
        schema.insert("title".to_string(), json!(table.name));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema.insert("properties".to_string(), Value::Object(properties));
        Ok(Value::Object(schema))
    }

    fn collection(&self, table: &Table) -> Result<String, ExportError> {
        let name = serde_json::to_string(&table.name)?;
        let options = json!({ "validator": { "$jsonSchema": self.json_schema(table)? } });
        let mut script = format!(
            "db.createCollection({name}, {});",
            serde_json::to_string_pretty(&options)?
        );

        for keys in unique_indexes(table) {
            let mut index_keys = Map::new();
            for key in keys {
                index_keys.insert(key.to_string(), json!(1));
            }
            script.push_str(&format!(
                "\ndb.getCollection({name}).createIndex({}, {{ \"unique\": true }});",
                serde_json::to_string(&index_keys)?
            ));
        }
        Ok(script)
    }
}

/// Key sets that need a unique index: the primary key (skipped when it is
/// just `_id`, which MongoDB indexes already) and every other unique column.
fn unique_indexes(table: &Table) -> Vec<Vec<&str>> {
    let mut indexes = Vec::new();
    let pk: Vec<&str> = table
        .primary_key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !pk.is_empty() && pk != ["_id"] {
        indexes.push(pk);
    }
    for column in table.columns.iter().filter(|c| c.unique && !c.primary_key) {
        indexes.push(vec![column.name.as_str()]);
    }
    indexes
}

/// Advisory metadata with no validator equivalent.
fn describe(table: &Table, column: &Column) -> String {
    let mut notes = Vec::new();
    if column.primary_key {
        notes.push("primary key".to_string());
    }
    if auto_increments(column) {
        notes.push("auto-increment".to_string());
    }
    if let Some(ref default) = column.default {
        notes.push(format!("default: {default}"));
    }
    for fk in table.foreign_keys.iter().filter(|fk| fk.column == column.name) {
        let mut note = format!("references {}.{}", fk.references.table, fk.references.column);
        let mut details = Vec::new();
        if let Some(relation) = fk.relation_type {
            details.push(relation.to_string());
        }
        if let Some(action) = fk.on_delete {
            details.push(format!("on delete {action}"));
        }
        if let Some(action) = fk.on_update {
            details.push(format!("on update {action}"));
        }
        if !details.is_empty() {
            note.push_str(&format!(" ({})", details.join(", ")));
        }
        notes.push(note);
    }
    notes.join("; ")
}

impl TypeMapper for MongoDialect {
    fn name(&self) -> &'static str {
        "mongo"
    }

    fn map_type(&self, table: &str, column: &Column) -> Result<String, UnknownTypeError> {
        TypeToken::parse(&column.data_type)
            .map(|token| Self::bson_type(token.base).to_string())
            .ok_or_else(|| self.unknown_type(table, column))
    }
}

impl Emitter for MongoDialect {
    fn emit(&self, tables: &[&Table]) -> Result<String, ExportError> {
        let mut blocks = Vec::with_capacity(tables.len());
        for table in tables {
            blocks.push(self.collection(table)?);
        }
        if blocks.is_empty() {
            return Ok(String::new());
        }
        let mut script = blocks.join("\n\n");
        script.push('\n');
        Ok(script)
    }
}
