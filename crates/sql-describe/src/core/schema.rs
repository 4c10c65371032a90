//! Canonical, backend-independent table description records.
//!
//! These are what every dialect's catalog output is normalized into. Records
//! are built fresh per describe call and never mutated after they are handed
//! to the caller. Serialized field names follow the catalog aliases
//! (`Field`, `Null`, `TABLE_NAME`, ...) so JSON consumers see the same keys
//! regardless of backend.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role a column plays in the table's key constraints.
///
/// Variants are ordered by strength so that when a catalog reports a column
/// under several constraints the strongest role can be kept with `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum KeyRole {
    /// Not part of a primary key or unique constraint.
    #[default]
    #[serde(rename = "")]
    None,
    /// Member of a unique constraint.
    #[serde(rename = "UNI")]
    Unique,
    /// Member of the primary key.
    #[serde(rename = "PRI")]
    Primary,
}

impl KeyRole {
    /// Interpret a catalog key marker.
    ///
    /// Accepts the `PRI`/`UNI` markers emitted by the column queries as well
    /// as raw constraint types. Anything else, including the `MUL` marker
    /// SQL Server emits for foreign-key members, is [`KeyRole::None`].
    pub fn from_catalog(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PRI" | "PRIMARY KEY" => KeyRole::Primary,
            "UNI" | "UNIQUE" => KeyRole::Unique,
            _ => KeyRole::None,
        }
    }

    /// Catalog marker for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyRole::None => "",
            KeyRole::Unique => "UNI",
            KeyRole::Primary => "PRI",
        }
    }
}

/// One column of a described table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    #[serde(rename = "Field")]
    pub name: String,

    /// Whether the column accepts NULL.
    #[serde(rename = "Null")]
    pub nullable: bool,

    /// Key constraint role.
    #[serde(rename = "Key")]
    pub key_role: KeyRole,

    /// Type name; variable-length text types carry a `(length)` suffix.
    #[serde(rename = "Type")]
    pub data_type: String,

    /// Normalized default expression, empty when the column has none.
    #[serde(rename = "Default")]
    pub default: String,

    /// Whether the backend generates values for this column.
    #[serde(rename = "AutoIncrement")]
    pub auto_increment: bool,

    /// Maximum character length (50 when the catalog reports none).
    #[serde(rename = "VarcharSize")]
    pub varchar_size: i64,
}

impl Column {
    /// Check if the column is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.key_role == KeyRole::Primary
    }

    /// Check if the column has a default value.
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

/// Referential action taken when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeleteRule {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl DeleteRule {
    /// SQL spelling of the rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteRule::Cascade => "CASCADE",
            DeleteRule::SetNull => "SET NULL",
            DeleteRule::Restrict => "RESTRICT",
            DeleteRule::NoAction => "NO ACTION",
            DeleteRule::SetDefault => "SET DEFAULT",
        }
    }
}

impl FromStr for DeleteRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // sys.foreign_keys spells these with underscores (SET_NULL)
        match s.trim().to_ascii_uppercase().replace('_', " ").as_str() {
            "CASCADE" => Ok(DeleteRule::Cascade),
            "SET NULL" => Ok(DeleteRule::SetNull),
            "RESTRICT" => Ok(DeleteRule::Restrict),
            "NO ACTION" => Ok(DeleteRule::NoAction),
            "SET DEFAULT" => Ok(DeleteRule::SetDefault),
            other => Err(format!("unknown delete rule '{}'", other)),
        }
    }
}

impl fmt::Display for DeleteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of one foreign-key constraint.
///
/// A composite foreign key yields one record per participating column, all
/// sharing `constraint_name` and `referenced_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(rename = "TABLE_NAME")]
    pub table: String,

    #[serde(rename = "COLUMN_NAME")]
    pub column: String,

    #[serde(rename = "CONSTRAINT_NAME")]
    pub constraint_name: String,

    #[serde(rename = "DELETE_RULE")]
    pub on_delete: DeleteRule,

    #[serde(rename = "REFERENCED_TABLE_NAME")]
    pub referenced_table: String,

    #[serde(rename = "REFERENCED_COLUMN_NAME")]
    pub referenced_column: String,
}

/// Sort direction of an index key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse the `asc`/`desc` marker produced by the index queries.
    pub fn from_catalog(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "a" => Some(SortDirection::Asc),
            "desc" | "d" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One key column of one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "TABLE_NAME")]
    pub table: String,

    #[serde(rename = "COLUMN_NAME")]
    pub column: String,

    #[serde(rename = "INDEX_NAME")]
    pub index_name: String,

    /// 1-based position of the column within the index.
    #[serde(rename = "SEQ_IN_INDEX")]
    pub sequence: u32,

    #[serde(rename = "IS_UNIQUE")]
    pub unique: bool,

    #[serde(rename = "SORT")]
    pub sort: SortDirection,
}

/// Full description of one table: columns, foreign keys and indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexEntry>,
}

impl TableDescription {
    /// Names of the primary key columns, in column order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index entries grouped by index name, each group in sequence order.
    pub fn indexes_by_name(&self) -> BTreeMap<&str, Vec<&IndexEntry>> {
        let mut grouped: BTreeMap<&str, Vec<&IndexEntry>> = BTreeMap::new();
        for entry in &self.indexes {
            grouped.entry(entry.index_name.as_str()).or_default().push(entry);
        }
        for entries in grouped.values_mut() {
            entries.sort_by_key(|e| e.sequence);
        }
        grouped
    }

    /// Foreign-key records grouped by constraint name.
    pub fn foreign_keys_by_constraint(&self) -> BTreeMap<&str, Vec<&ForeignKey>> {
        let mut grouped: BTreeMap<&str, Vec<&ForeignKey>> = BTreeMap::new();
        for fk in &self.foreign_keys {
            grouped.entry(fk.constraint_name.as_str()).or_default().push(fk);
        }
        grouped
    }
}
