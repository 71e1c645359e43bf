//! Abstract column types.
//!
//! A column's type is a free-form token such as `INT`, `varchar(255)` or
//! `double precision`. [`TypeToken::parse`] splits it into a dialect-neutral
//! [`AbstractType`] and the raw parameter text, which dialects pass through
//! without interpreting it.

use std::sync::LazyLock;

use regex::Regex;

static TYPE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>[A-Za-z][A-Za-z0-9_]*(?:\s+[A-Za-z][A-Za-z0-9_]*)*)\s*(?:\((?P<params>.*)\))?$")
        .expect("type token pattern is valid")
});

/// Dialect-neutral column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbstractType {
    TinyInt,
    SmallInt,
    MediumInt,
    Integer,
    BigInt,
    Serial,
    BigSerial,
    Decimal,
    Numeric,
    Real,
    Float,
    Double,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
    TimestampTz,
    Interval,
    Year,
    Char,
    Varchar,
    Text,
    TinyText,
    MediumText,
    LongText,
    Binary,
    VarBinary,
    Blob,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Bytea,
    Json,
    Jsonb,
    Uuid,
    /// One value out of a fixed list.
    Enum,
    /// Any subset of a fixed list.
    Set,
}

impl AbstractType {
    /// Looks up a normalized (lowercase, single-spaced) type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "tinyint" => Self::TinyInt,
            "smallint" | "int2" => Self::SmallInt,
            "mediumint" => Self::MediumInt,
            "int" | "integer" | "int4" => Self::Integer,
            "bigint" | "int8" => Self::BigInt,
            "serial" | "serial4" => Self::Serial,
            "bigserial" | "serial8" => Self::BigSerial,
            "decimal" | "dec" => Self::Decimal,
            "numeric" => Self::Numeric,
            "real" | "float4" => Self::Real,
            "float" => Self::Float,
            "double" | "double precision" | "float8" => Self::Double,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" | "timestamp without time zone" => Self::Timestamp,
            "timestamptz" | "timestamp with time zone" => Self::TimestampTz,
            "interval" => Self::Interval,
            "year" => Self::Year,
            "char" | "character" => Self::Char,
            "varchar" | "character varying" => Self::Varchar,
            "text" | "string" => Self::Text,
            "tinytext" => Self::TinyText,
            "mediumtext" => Self::MediumText,
            "longtext" => Self::LongText,
            "binary" => Self::Binary,
            "varbinary" => Self::VarBinary,
            "blob" => Self::Blob,
            "tinyblob" => Self::TinyBlob,
            "mediumblob" => Self::MediumBlob,
            "longblob" => Self::LongBlob,
            "bytea" => Self::Bytea,
            "json" => Self::Json,
            "jsonb" => Self::Jsonb,
            "uuid" => Self::Uuid,
            "enum" => Self::Enum,
            "set" => Self::Set,
            _ => return None,
        };
        Some(ty)
    }

    /// Integer types, serials included.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::MediumInt
                | Self::Integer
                | Self::BigInt
                | Self::Serial
                | Self::BigSerial
        )
    }

    /// Types that auto-increment without an explicit flag.
    #[must_use]
    pub const fn is_serial(self) -> bool {
        matches!(self, Self::Serial | Self::BigSerial)
    }

    /// Types whose literals are written as bare numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                Self::Decimal | Self::Numeric | Self::Real | Self::Float | Self::Double | Self::Year
            )
    }

    /// `enum` or `set`.
    #[must_use]
    pub const fn is_enumeration(self) -> bool {
        matches!(self, Self::Enum | Self::Set)
    }
}

/// A parsed type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeToken {
    /// The recognized base type.
    pub base: AbstractType,
    /// Raw text between the parentheses, trimmed.
    pub params: Option<String>,
}

impl TypeToken {
    /// Parses a type token, returning `None` when the base type is unknown
    /// or the parentheses are malformed.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if !parens_wrap_suffix(token) {
            return None;
        }
        let caps = TYPE_TOKEN.captures(token)?;
        let name = caps["base"]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        let base = AbstractType::from_name(&name)?;
        let params = caps
            .name("params")
            .map(|m| m.as_str().trim().to_string())
            .filter(|p| !p.is_empty());
        Some(Self { base, params })
    }

    /// The parameter as a plain length, e.g. `255` for `varchar(255)`.
    #[must_use]
    pub fn length(&self) -> Option<u32> {
        self.params.as_deref().and_then(|p| p.parse().ok())
    }
}

/// Checks that parentheses balance and that the first opening parenthesis
/// is closed by the last character. Quoted text is skipped.
pub(crate) fn parens_wrap_suffix(token: &str) -> bool {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut closed_at = None;
    for (i, c) in token.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => {
                if closed_at.is_some() {
                    return false;
                }
                depth += 1;
            }
            ')' if !in_quote => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 {
                    closed_at = Some(i);
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_quote && closed_at.is_none_or(|i| i + 1 == token.len())
}
