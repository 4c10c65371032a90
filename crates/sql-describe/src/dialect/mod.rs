//! Dialect query resolution.
//!
//! Pure mapping from a backend kind to the catalog queries used to describe a
//! table. Each [`CatalogQuery`] carries:
//!
//! - the SQL text, verbatim per dialect
//! - the bind-parameter order (which differs between dialects and between
//!   queries of the same dialect, so it is never assumed to be `(table, schema)`)
//! - a field map from canonical record field to the catalog output alias
//!
//! Field maps are checked against the expected record shape and the SQL text
//! once per dialect, see [`ensure_field_maps`].
//!
//! The per-dialect query text lives with each driver
//! (`drivers/<db>/dialect.rs`); normalization of decoded values lives in
//! [`canonical`].

pub mod canonical;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::traits::SchemaDialect;
use crate::error::{DescribeError, Result};

pub use canonical::{AutoIncrementSource, BooleanDefaults, DefaultQuoting, NormalizationRules};

/// The supported relational backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Mysql,
    Postgres,
    SqlServer,
}

impl DialectKind {
    /// Every supported dialect.
    pub const ALL: [DialectKind; 3] = [
        DialectKind::Mysql,
        DialectKind::Postgres,
        DialectKind::SqlServer,
    ];

    /// Dialect identifier used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::Mysql => "mysql",
            DialectKind::Postgres => "postgres",
            DialectKind::SqlServer => "sqlserver",
        }
    }

    /// Parse a database type string, accepting the usual aliases.
    pub fn parse(db_type: &str) -> Result<Self> {
        match db_type.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DialectKind::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mssql" | "sqlserver" | "sql_server" => Ok(DialectKind::SqlServer),
            other => Err(DescribeError::Config(format!(
                "Unknown database type: '{}'. Supported types: mysql, postgres, sqlserver",
                other
            ))),
        }
    }

    /// Default TCP port of the backend.
    pub fn default_port(&self) -> u16 {
        match self {
            DialectKind::Mysql => 3306,
            DialectKind::Postgres => 5432,
            DialectKind::SqlServer => 1433,
        }
    }

    fn index(&self) -> usize {
        match self {
            DialectKind::Mysql => 0,
            DialectKind::Postgres => 1,
            DialectKind::SqlServer => 2,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = DescribeError;

    fn from_str(s: &str) -> Result<Self> {
        DialectKind::parse(s)
    }
}

/// Which describer a catalog query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Columns,
    ForeignKeys,
    Indexes,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [QueryKind::Columns, QueryKind::ForeignKeys, QueryKind::Indexes];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Columns => "column",
            QueryKind::ForeignKeys => "foreign key",
            QueryKind::Indexes => "index",
        }
    }

    /// Canonical fields the query must produce.
    pub fn expected_fields(&self) -> &'static [Field] {
        match self {
            QueryKind::Columns => COLUMN_FIELDS,
            QueryKind::ForeignKeys => FOREIGN_KEY_FIELDS,
            QueryKind::Indexes => INDEX_FIELDS,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical argument bound to a query placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindParam {
    /// The table being described.
    Table,
    /// The schema (project) the connection is bound to.
    Schema,
}

impl BindParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindParam::Table => "table",
            BindParam::Schema => "schema",
        }
    }
}

/// A canonical record field filled from a catalog column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Column
    ColumnName,
    Nullable,
    KeyRole,
    DataType,
    Default,
    AutoIncrement,
    VarcharSize,
    // ForeignKey / IndexEntry
    Table,
    Column,
    ConstraintName,
    DeleteRule,
    ReferencedTable,
    ReferencedColumn,
    IndexName,
    Sequence,
    Unique,
    Sort,
}

/// Fields a column query must map.
pub const COLUMN_FIELDS: &[Field] = &[
    Field::ColumnName,
    Field::Nullable,
    Field::KeyRole,
    Field::DataType,
    Field::Default,
    Field::AutoIncrement,
    Field::VarcharSize,
];

/// Fields a foreign-key query must map.
pub const FOREIGN_KEY_FIELDS: &[Field] = &[
    Field::Table,
    Field::Column,
    Field::ConstraintName,
    Field::DeleteRule,
    Field::ReferencedTable,
    Field::ReferencedColumn,
];

/// Fields an index query must map.
pub const INDEX_FIELDS: &[Field] = &[
    Field::Table,
    Field::Column,
    Field::IndexName,
    Field::Sequence,
    Field::Unique,
    Field::Sort,
];

/// One entry of a query's field map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: Field,
    pub alias: &'static str,
}

impl FieldBinding {
    pub const fn new(field: Field, alias: &'static str) -> Self {
        Self { field, alias }
    }
}

/// Output aliases of every column query.
pub const COLUMN_ALIASES: &[FieldBinding] = &[
    FieldBinding::new(Field::ColumnName, "Field"),
    FieldBinding::new(Field::Nullable, "Null"),
    FieldBinding::new(Field::KeyRole, "Key"),
    FieldBinding::new(Field::DataType, "Type"),
    FieldBinding::new(Field::Default, "Default"),
    FieldBinding::new(Field::AutoIncrement, "AutoIncrement"),
    FieldBinding::new(Field::VarcharSize, "VarcharSize"),
];

/// Output aliases of every foreign-key query.
pub const FOREIGN_KEY_ALIASES: &[FieldBinding] = &[
    FieldBinding::new(Field::Table, "TABLE_NAME"),
    FieldBinding::new(Field::Column, "COLUMN_NAME"),
    FieldBinding::new(Field::ConstraintName, "CONSTRAINT_NAME"),
    FieldBinding::new(Field::DeleteRule, "DELETE_RULE"),
    FieldBinding::new(Field::ReferencedTable, "REFERENCED_TABLE_NAME"),
    FieldBinding::new(Field::ReferencedColumn, "REFERENCED_COLUMN_NAME"),
];

/// Output aliases of every index query.
pub const INDEX_ALIASES: &[FieldBinding] = &[
    FieldBinding::new(Field::Table, "TABLE_NAME"),
    FieldBinding::new(Field::Column, "COLUMN_NAME"),
    FieldBinding::new(Field::IndexName, "INDEX_NAME"),
    FieldBinding::new(Field::Sequence, "SEQ_IN_INDEX"),
    FieldBinding::new(Field::Unique, "IS_UNIQUE"),
    FieldBinding::new(Field::Sort, "SORT"),
];

/// A catalog query: SQL text, bind order and output field map.
#[derive(Debug, Clone, Copy)]
pub struct CatalogQuery {
    pub kind: QueryKind,
    pub sql: &'static str,
    pub params: &'static [BindParam],
    pub fields: &'static [FieldBinding],
}

impl CatalogQuery {
    /// Arrange `(table, schema)` into this query's placeholder order.
    pub fn bind<'a>(&self, table: &'a str, schema: &'a str) -> Vec<&'a str> {
        self.params
            .iter()
            .map(|p| match p {
                BindParam::Table => table,
                BindParam::Schema => schema,
            })
            .collect()
    }

    /// Output alias for a canonical field.
    pub fn alias(&self, field: Field) -> Result<&'static str> {
        self.fields
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.alias)
            .ok_or_else(|| {
                DescribeError::decode(self.kind.as_str(), format!("no alias mapped for {:?}", field))
            })
    }

    /// Check the field map against the expected record shape and the SQL text.
    ///
    /// Every expected field must be mapped exactly once, nothing else may be
    /// mapped, every alias must occur in the SQL, and the placeholders in the
    /// SQL must match the bind order length.
    pub fn validate(&self, placeholder: impl Fn(usize) -> String) -> std::result::Result<(), String> {
        let expected = self.kind.expected_fields();

        for field in expected {
            let count = self.fields.iter().filter(|b| b.field == *field).count();
            if count != 1 {
                return Err(format!(
                    "{} query maps {:?} {} times, expected once",
                    self.kind, field, count
                ));
            }
        }
        if let Some(extra) = self.fields.iter().find(|b| !expected.contains(&b.field)) {
            return Err(format!(
                "{} query maps unexpected field {:?}",
                self.kind, extra.field
            ));
        }
        if let Some(missing) = self.fields.iter().find(|b| !self.sql.contains(b.alias)) {
            return Err(format!(
                "{} query does not select alias '{}' for {:?}",
                self.kind, missing.alias, missing.field
            ));
        }

        let n = self.params.len();
        if placeholder(1) == placeholder(2) {
            // positional placeholders (`?`)
            let marker = placeholder(1);
            let found = self.sql.matches(marker.as_str()).count();
            if found != n {
                return Err(format!(
                    "{} query has {} placeholders but binds {} parameters",
                    self.kind, found, n
                ));
            }
        } else {
            if let Some(i) = (1..=n).find(|i| !self.sql.contains(&placeholder(*i))) {
                return Err(format!(
                    "{} query binds {} parameters but never uses {}",
                    self.kind,
                    n,
                    placeholder(i)
                ));
            }
            if self.sql.contains(&placeholder(n + 1)) {
                return Err(format!(
                    "{} query uses {} but binds only {} parameters",
                    self.kind,
                    placeholder(n + 1),
                    n
                ));
            }
        }

        Ok(())
    }
}

/// Validate every query of a dialect.
pub fn validate_dialect<D: SchemaDialect + ?Sized>(dialect: &D) -> std::result::Result<(), String> {
    for kind in QueryKind::ALL {
        let query = dialect.query(kind);
        if query.kind != kind {
            return Err(format!(
                "{} dialect returned a {} query for {}",
                dialect.kind(),
                query.kind,
                kind
            ));
        }
        query
            .validate(|i| dialect.param_placeholder(i))
            .map_err(|e| format!("{}: {}", dialect.kind(), e))?;
    }
    Ok(())
}

static FIELD_MAPS: [OnceLock<std::result::Result<(), String>>; 3] =
    [OnceLock::new(), OnceLock::new(), OnceLock::new()];

/// Validate a dialect's field maps, once per process.
pub fn ensure_field_maps<D: SchemaDialect + ?Sized>(dialect: &D) -> Result<()> {
    FIELD_MAPS[dialect.kind().index()]
        .get_or_init(|| validate_dialect(dialect))
        .clone()
        .map_err(|e| DescribeError::decode("field map", e))
}
