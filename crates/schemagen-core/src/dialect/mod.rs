//! Dialect-specific code generation.
//!
//! Each supported target has one dialect struct implementing [`TypeMapper`]
//! and [`Emitter`]. The relational dialects share their statement layout
//! through [`SqlDialect`], overriding only quoting, type names and the few
//! clauses where they diverge.

mod mongo;
mod mysql;
mod postgres;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

pub use mongo::MongoDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;

use crate::error::{ExportError, UnknownTypeError};
use crate::schema::{Column, ForeignKey, Table};
use crate::types::{parens_wrap_suffix, AbstractType, TypeToken};

/// Maps a column's abstract type to the type syntax of one dialect.
pub trait TypeMapper {
    /// Returns the dialect name used in error messages.
    fn name(&self) -> &'static str;

    /// Maps the type of `column`, owned by table `table`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTypeError`] when the token is malformed or has no
    /// mapping in this dialect.
    fn map_type(&self, table: &str, column: &Column) -> Result<String, UnknownTypeError>;

    /// Builds the error for a column this dialect cannot map.
    fn unknown_type(&self, table: &str, column: &Column) -> UnknownTypeError {
        UnknownTypeError {
            token: column.data_type.clone(),
            dialect: self.name(),
            table: table.to_string(),
            column: column.name.clone(),
        }
    }
}

/// Produces the full definition script for tables in dependency order.
pub trait Emitter: TypeMapper {
    /// Emits the script. Either the whole script is returned or an error;
    /// nothing is produced partially.
    ///
    /// # Errors
    ///
    /// Fails when a column type cannot be mapped or rendering fails.
    fn emit(&self, tables: &[&Table]) -> Result<String, ExportError>;
}

/// How a dialect spells one abstract type, and what it does with the
/// token's parameter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTypeName {
    name: &'static str,
    params: ParamPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamPolicy {
    Drop,
    PassThrough,
    OrDefault(&'static str),
}

impl SqlTypeName {
    /// A type that takes no parameter; any given is dropped.
    #[must_use]
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            params: ParamPolicy::Drop,
        }
    }

    /// A type that accepts the parameter as written.
    #[must_use]
    pub const fn sized(name: &'static str) -> Self {
        Self {
            name,
            params: ParamPolicy::PassThrough,
        }
    }

    /// A type that requires a parameter, using `default` when none is given.
    #[must_use]
    pub const fn sized_or(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            params: ParamPolicy::OrDefault(default),
        }
    }

    /// Renders the type with the token's parameter text.
    #[must_use]
    pub fn render(&self, params: Option<&str>) -> String {
        match (self.params, params) {
            (ParamPolicy::PassThrough | ParamPolicy::OrDefault(_), Some(p)) => {
                format!("{}({p})", self.name)
            }
            (ParamPolicy::OrDefault(default), None) => format!("{}({default})", self.name),
            _ => self.name.to_string(),
        }
    }
}

/// Returns `true` if the column auto-increments, explicitly or through a
/// serial type.
#[must_use]
pub fn auto_increments(column: &Column) -> bool {
    column.auto_increment
        || TypeToken::parse(&column.data_type).is_some_and(|t| t.base.is_serial())
}

static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*\s*\(.*\)$").expect("function call pattern is valid")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("number pattern is valid")
});

const TEMPORAL_KEYWORDS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "LOCALTIME",
    "LOCALTIMESTAMP",
];

/// Text that ends a statement, starts a comment or escapes a quote in some
/// dialect. A default containing any of it is always written as a literal.
const UNSAFE_IN_EXPRESSION: &[&str] = &[";", "--", "/*", "\\"];

/// A single call such as `now()` or `nextval('seq')`: one argument list
/// with balanced quotes and parentheses that closes the value.
fn is_call_expression(value: &str) -> bool {
    FUNCTION_CALL.is_match(value)
        && parens_wrap_suffix(value)
        && !UNSAFE_IN_EXPRESSION.iter().any(|s| value.contains(s))
}

/// A raw default value classified by how it must be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultLiteral<'a> {
    Null,
    Expression(&'a str),
    Bool(bool),
    Number(&'a str),
    Text(&'a str),
}

impl<'a> DefaultLiteral<'a> {
    /// Classifies `raw` for a column of type `ty`.
    #[must_use]
    pub fn classify(raw: &'a str, ty: Option<AbstractType>) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Self::Null;
        }
        if is_call_expression(trimmed)
            || TEMPORAL_KEYWORDS
                .iter()
                .any(|k| trimmed.eq_ignore_ascii_case(k))
        {
            return Self::Expression(trimmed);
        }
        match ty {
            Some(AbstractType::Boolean) => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Self::Bool(true),
                "false" | "f" | "0" => Self::Bool(false),
                _ => Self::Text(raw),
            },
            Some(ty) if ty.is_numeric() && NUMBER.is_match(trimmed) => Self::Number(trimmed),
            _ => Self::Text(raw),
        }
    }
}

/// Names generated while emitting one script.
///
/// Constraint names and type names are each unique across the whole
/// script. Table names are reserved up front since PostgreSQL gives every
/// table a type of the same name.
#[derive(Debug, Default)]
pub struct ScriptNames {
    constraints: HashSet<String>,
    types: HashSet<String>,
    enum_types: HashMap<(String, String), String>,
}

impl ScriptNames {
    /// Creates the registry for a script over `tables`.
    #[must_use]
    pub fn new(tables: &[&Table]) -> Self {
        let mut names = Self::default();
        names.types.extend(tables.iter().map(|t| t.name.clone()));
        names
    }

    /// Claims a constraint name, suffixing `_2`, `_3`, ... when taken.
    pub fn constraint(&mut self, base: String) -> String {
        claim(&mut self.constraints, base)
    }

    /// Claims a type name for the enumeration on `table.column`.
    pub fn declare_enum_type(&mut self, table: &str, column: &str, base: String) -> String {
        let name = claim(&mut self.types, base);
        self.enum_types
            .insert((table.to_string(), column.to_string()), name.clone());
        name
    }

    /// The type name declared for `table.column`, if any.
    #[must_use]
    pub fn enum_type(&self, table: &str, column: &str) -> Option<&str> {
        self.enum_types
            .get(&(table.to_string(), column.to_string()))
            .map(String::as_str)
    }
}

fn claim(used: &mut HashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let name = format!("{base}_{n}");
        if used.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

/// Shared DDL generation for the relational dialects.
pub trait SqlDialect {
    /// Returns the identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Writes a string literal.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Maps a non-enumeration abstract type. `None` means unsupported.
    fn type_name(&self, ty: AbstractType) -> Option<SqlTypeName>;

    /// Dedicated auto-increment type for `ty`, if the dialect has one.
    fn serial_type(&self, _ty: AbstractType) -> Option<&'static str> {
        None
    }

    /// Clause appended to auto-increment columns, if the dialect uses one.
    fn auto_increment_keyword(&self) -> Option<&'static str> {
        None
    }

    /// Whether a non-NULL default on `ty` must be wrapped in parentheses.
    fn parenthesized_default(&self, _ty: AbstractType) -> bool {
        false
    }

    /// Index prefix length required when `ty` is part of a key.
    fn key_prefix(&self, _ty: AbstractType) -> Option<u32> {
        None
    }

    /// Column type for an `enum` (or `set` when `set` is true) column.
    fn enum_type(&self, table: &str, column: &Column, set: bool, names: &ScriptNames) -> String;

    /// Statements that must precede the table's CREATE TABLE.
    fn before_table(&self, _table: &Table, _names: &mut ScriptNames) -> Vec<String> {
        Vec::new()
    }

    /// Trailing table options, e.g. a storage engine clause.
    fn table_options(&self, _table: &Table) -> Option<String> {
        None
    }

    /// Boolean literal spelling.
    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Resolves the SQL type of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTypeError`] for malformed or unsupported tokens.
    fn column_type(
        &self,
        dialect: &'static str,
        table: &str,
        column: &Column,
        names: &ScriptNames,
    ) -> Result<String, UnknownTypeError> {
        let unknown = || UnknownTypeError {
            token: column.data_type.clone(),
            dialect,
            table: table.to_string(),
            column: column.name.clone(),
        };
        let token = TypeToken::parse(&column.data_type).ok_or_else(unknown)?;
        if token.base.is_enumeration() {
            return Ok(self.enum_type(table, column, token.base == AbstractType::Set, names));
        }
        if column.auto_increment || token.base.is_serial() {
            if let Some(serial) = self.serial_type(token.base) {
                return Ok(serial.to_string());
            }
        }
        let sql_type = self.type_name(token.base).ok_or_else(unknown)?;
        Ok(sql_type.render(token.params.as_deref()))
    }

    /// Renders a default value for `column`.
    fn render_default(&self, column: &Column, raw: &str) -> String {
        let ty = TypeToken::parse(&column.data_type).map(|t| t.base);
        let rendered = match DefaultLiteral::classify(raw, ty) {
            DefaultLiteral::Null => return "NULL".to_string(),
            DefaultLiteral::Expression(expr) | DefaultLiteral::Number(expr) => expr.to_string(),
            DefaultLiteral::Bool(b) => self.bool_literal(b).to_string(),
            DefaultLiteral::Text(text) => self.quote_string(text),
        };
        if ty.is_some_and(|ty| self.parenthesized_default(ty)) {
            format!("({rendered})")
        } else {
            rendered
        }
    }

    /// Returns `true` if `column` can only be keyed through a prefix.
    fn needs_key_prefix(&self, column: &Column) -> bool {
        TypeToken::parse(&column.data_type).is_some_and(|t| self.key_prefix(t.base).is_some())
    }

    /// Column reference inside a PRIMARY KEY or UNIQUE list.
    fn key_column(&self, column: &Column) -> String {
        let name = self.quote_identifier(&column.name);
        match TypeToken::parse(&column.data_type).and_then(|t| self.key_prefix(t.base)) {
            Some(length) => format!("{name}({length})"),
            None => name,
        }
    }

    /// Generates SQL for a column definition. `sole_pk` tells whether the
    /// table has exactly one primary key column.
    ///
    /// Clause order is fixed: NOT NULL, UNIQUE, DEFAULT, auto-increment,
    /// PRIMARY KEY. Keys on prefix-only types are left to table-level
    /// constraints.
    fn column_definition(&self, sql_type: &str, column: &Column, sole_pk: bool) -> String {
        let mut sql = format!("{} {}", self.quote_identifier(&column.name), sql_type);
        let is_sole_pk = sole_pk && column.primary_key;
        let prefixed = self.needs_key_prefix(column);

        if column.not_null {
            sql.push_str(" NOT NULL");
        }
        if column.unique && !is_sole_pk && !prefixed {
            sql.push_str(" UNIQUE");
        }
        if let Some(ref default) = column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.render_default(column, default));
        }
        if let Some(keyword) = self.auto_increment_keyword() {
            if auto_increments(column) {
                sql.push(' ');
                sql.push_str(keyword);
            }
        }
        if is_sole_pk && !prefixed {
            sql.push_str(" PRIMARY KEY");
        }
        sql
    }

    /// Generates a table-level foreign key constraint.
    fn foreign_key_constraint(&self, name: &str, fk: &ForeignKey) -> String {
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_identifier(name),
            self.quote_identifier(&fk.column),
            self.quote_identifier(&fk.references.table),
            self.quote_identifier(&fk.references.column),
        );
        if let Some(action) = fk.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = fk.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        sql
    }

    /// Generates the CREATE TABLE statement, terminated by `;`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTypeError`] if any column type cannot be mapped.
    fn create_table(
        &self,
        dialect: &'static str,
        table: &Table,
        names: &mut ScriptNames,
    ) -> Result<String, UnknownTypeError> {
        let pk_columns = table.primary_key_columns();
        let sole_pk = pk_columns.len() == 1;

        let mut lines = Vec::with_capacity(table.columns.len() + table.foreign_keys.len() + 1);
        for column in &table.columns {
            let sql_type = self.column_type(dialect, &table.name, column, names)?;
            lines.push(self.column_definition(&sql_type, column, sole_pk));
        }

        let inline_pk = matches!(pk_columns.as_slice(), [pk] if !self.needs_key_prefix(pk));
        if !pk_columns.is_empty() && !inline_pk {
            let cols: Vec<String> = pk_columns.iter().map(|c| self.key_column(c)).collect();
            lines.push(format!("PRIMARY KEY ({})", cols.join(", ")));
        }

        for column in table
            .columns
            .iter()
            .filter(|c| c.unique && !(sole_pk && c.primary_key) && self.needs_key_prefix(c))
        {
            lines.push(format!("UNIQUE ({})", self.key_column(column)));
        }

        for fk in &table.foreign_keys {
            let name = names.constraint(format!("fk_{}_{}", table.name, fk.column));
            lines.push(self.foreign_key_constraint(&name, fk));
        }

        let mut sql = format!("CREATE TABLE {} (\n", self.quote_identifier(&table.name));
        let body: Vec<String> = lines.iter().map(|l| format!("    {l}")).collect();
        sql.push_str(&body.join(",\n"));
        sql.push_str("\n)");
        if let Some(options) = self.table_options(table) {
            sql.push(' ');
            sql.push_str(&options);
        }
        sql.push(';');
        Ok(sql)
    }

    /// Generates the whole script for tables in dependency order.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTypeError`] if any column type cannot be mapped.
    fn script(&self, dialect: &'static str, tables: &[&Table]) -> Result<String, UnknownTypeError> {
        let mut names = ScriptNames::new(tables);
        let mut statements = Vec::new();
        for table in tables {
            statements.extend(self.before_table(table, &mut names));
            statements.push(self.create_table(dialect, table, &mut names)?);
        }
        if statements.is_empty() {
            return Ok(String::new());
        }
        let mut script = statements.join("\n\n");
        script.push('\n');
        Ok(script)
    }
}
