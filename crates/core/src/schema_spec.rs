//! Declarative schema-extension artifacts.
//!
//! An artifact is a versioned SQL script of guarded `ADD COLUMN IF NOT EXISTS`
//! statements against one table, with the schema left as the `{{schema}}`
//! placeholder. It is parsed into a [`SchemaExtensionSpec`] so the migrator can
//! apply each column independently, and rendered back to SQL for operators.

use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::SCHEMA_PLACEHOLDER;
use crate::error::{CoreError, Result};

/// The valuation-column artifact shipped with this release.
pub const MA_COLUMNS_SCRIPT: &str = include_str!("../sql/0001_add_ma_columns.sql");

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("identifier regex is valid")
});

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--\s*(version|table)\s*:\s*(\S+)\s*$").expect("header regex is valid")
});

static ADD_COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^ALTER\s+TABLE\s+\{\{schema\}\}\.(\S+)\s+ADD\s+COLUMN\s+IF\s+NOT\s+EXISTS\s+(\S+)\s+([A-Za-z][A-Za-z0-9 ]*?)\s*;$",
    )
    .expect("add-column regex is valid")
});

/// Check that `name` is a plain lowercase SQL identifier, safe to splice into DDL.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if IDENTIFIER_REGEX.is_match(name) {
        Ok(name)
    } else {
        Err(CoreError::InvalidIdentifier(name.to_owned()))
    }
}

/// Column types an artifact may declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Text,
    Integer,
    BigInt,
    Boolean,
    DoublePrecision,
    Date,
    Timestamptz,
    Jsonb,
}

impl ColumnType {
    /// Type as written in DDL.
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match *self {
            Self::Numeric => "NUMERIC",
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Boolean => "BOOLEAN",
            Self::DoublePrecision => "DOUBLE PRECISION",
            Self::Date => "DATE",
            Self::Timestamptz => "TIMESTAMPTZ",
            Self::Jsonb => "JSONB",
        }
    }

    /// Type as reported by `information_schema.columns.data_type`.
    #[must_use]
    pub const fn catalog_name(&self) -> &'static str {
        match *self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::DoublePrecision => "double precision",
            Self::Date => "date",
            Self::Timestamptz => "timestamp with time zone",
            Self::Jsonb => "jsonb",
        }
    }

    /// Whether a catalog `data_type` string denotes this type.
    #[must_use]
    pub fn matches_catalog(&self, data_type: &str) -> bool {
        data_type.trim().eq_ignore_ascii_case(self.catalog_name())
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

impl FromStr for ColumnType {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
        match normalized.as_str() {
            "NUMERIC" | "DECIMAL" => Ok(Self::Numeric),
            "TEXT" => Ok(Self::Text),
            "INTEGER" | "INT" | "INT4" => Ok(Self::Integer),
            "BIGINT" | "INT8" => Ok(Self::BigInt),
            "BOOLEAN" | "BOOL" => Ok(Self::Boolean),
            "DOUBLE PRECISION" | "FLOAT8" => Ok(Self::DoublePrecision),
            "DATE" => Ok(Self::Date),
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => Ok(Self::Timestamptz),
            "JSONB" => Ok(Self::Jsonb),
            _ => Err(CoreError::UnsupportedColumnType(s.trim().to_owned())),
        }
    }
}

/// One column the artifact adds when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }
}

/// Parsed, validated schema-extension artifact. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaExtensionSpec {
    version: u32,
    table: String,
    family_prefix: String,
    columns: Vec<ColumnSpec>,
}

impl SchemaExtensionSpec {
    /// Validate identifiers, reject duplicates and require a shared column-name
    /// prefix (the family the post-migration verification filters on).
    pub fn new(version: u32, table: impl Into<String>, columns: Vec<ColumnSpec>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;

        let Some(first) = columns.first() else {
            return Err(CoreError::spec(0, "artifact declares no columns"));
        };
        let family_prefix = family_prefix(&first.name)?;

        let mut seen = HashSet::new();
        for (idx, column) in columns.iter().enumerate() {
            validate_identifier(&column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(CoreError::spec(
                    idx + 1,
                    format!("column {} declared twice", column.name),
                ));
            }
            if !column.name.starts_with(&family_prefix) {
                return Err(CoreError::spec(
                    idx + 1,
                    format!("column {} is outside the {family_prefix}* family", column.name),
                ));
            }
        }

        Ok(Self { version, table, family_prefix, columns })
    }

    /// The valuation columns shipped with this release.
    pub fn builtin() -> Result<Self> {
        Self::parse(MA_COLUMNS_SCRIPT)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse an artifact. Blank lines and `--` comments are ignored except the
    /// `-- version: N` and `-- table: name` headers.
    pub fn parse(text: &str) -> Result<Self> {
        let mut version = None;
        let mut table: Option<String> = None;
        let mut columns = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("--") {
                if let Some(caps) = HEADER_REGEX.captures(line) {
                    match &caps[1] {
                        "version" => {
                            let parsed = caps[2].parse::<u32>().map_err(|_| {
                                CoreError::spec(line_no, format!("bad version {}", &caps[2]))
                            })?;
                            version = Some(parsed);
                        },
                        _ => table = Some(caps[2].to_owned()),
                    }
                }
                continue;
            }

            let caps = ADD_COLUMN_REGEX.captures(line).ok_or_else(|| {
                CoreError::spec(line_no, "expected ALTER TABLE {{schema}}.<table> ADD COLUMN IF NOT EXISTS <name> <TYPE>;")
            })?;
            let stmt_table = &caps[1];
            match &table {
                Some(expected) if expected != stmt_table => {
                    return Err(CoreError::spec(
                        line_no,
                        format!("statement targets {stmt_table}, artifact targets {expected}"),
                    ));
                },
                Some(_) => {},
                None => table = Some(stmt_table.to_owned()),
            }
            let column_type = caps[3].parse::<ColumnType>()?;
            columns.push(ColumnSpec::new(&caps[2], column_type));
        }

        let version = version.ok_or_else(|| CoreError::spec(0, "missing `-- version:` header"))?;
        let table = table.ok_or_else(|| CoreError::spec(0, "missing target table"))?;
        Self::new(version, table, columns)
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Shared prefix of every column name, e.g. `ma_`.
    #[must_use]
    pub fn family_prefix(&self) -> &str {
        &self.family_prefix
    }

    /// `LIKE` pattern selecting the column family, with wildcards escaped.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.family_prefix.len() + 4);
        for ch in self.family_prefix.chars() {
            if matches!(ch, '\\' | '_' | '%') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    /// Script text with the schema placeholder left in place.
    #[must_use]
    pub fn template(&self) -> String {
        let mut out = format!("-- version: {}\n-- table: {}\n\n", self.version, self.table);
        for column in &self.columns {
            let _ = writeln!(
                out,
                "ALTER TABLE {SCHEMA_PLACEHOLDER}.{} ADD COLUMN IF NOT EXISTS {} {};",
                self.table, column.name, column.column_type
            );
        }
        out
    }

    /// Script text for `schema`. Substitution is purely textual.
    pub fn render(&self, schema: &str) -> Result<String> {
        validate_identifier(schema)?;
        Ok(self.template().replace(SCHEMA_PLACEHOLDER, schema))
    }
}

/// Prefix up to and including the first underscore; the whole name if there is none.
fn family_prefix(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(match name.find('_') {
        Some(pos) if pos > 0 => name[..=pos].to_owned(),
        _ => name.to_owned(),
    })
}
