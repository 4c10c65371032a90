//! Backend-neutral catalog row values.
//!
//! Each driver converts its native row type (`MySqlRow`, `tokio_postgres::Row`,
//! `tiberius::Row`) into a [`CatalogRow`]: an ordered list of
//! `(alias, value)` pairs in the order the catalog query selected them.
//! Describers then look values up by the exact alias the dialect's SELECT
//! produced.

use std::borrow::Cow;
use std::fmt;

/// A single catalog cell.
///
/// Catalog views only ever return identifiers, short strings, small integers
/// and flags, so four variants cover every dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValue {
    /// SQL NULL.
    Null,
    /// Character data (identifiers, type names, `'YES'`/`'NO'`, ...).
    Text(String),
    /// Any integer column (lengths, ordinals, bit-fields).
    Int(i64),
    /// Native boolean / bit columns.
    Bool(bool),
}

impl CatalogValue {
    /// Check if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, CatalogValue::Null)
    }

    /// Textual view of the value; integers and flags are rendered.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CatalogValue::Null => None,
            CatalogValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CatalogValue::Int(n) => Some(Cow::Owned(n.to_string())),
            CatalogValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        }
    }

    /// Integer view of the value; numeric text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CatalogValue::Int(n) => Some(*n),
            CatalogValue::Text(s) => s.trim().parse().ok(),
            CatalogValue::Bool(b) => Some(i64::from(*b)),
            CatalogValue::Null => None,
        }
    }

    /// Flag view of the value.
    ///
    /// Catalogs spell flags as `YES`/`NO`, `yes`/`no`, `true`/`false` or
    /// `1`/`0` depending on the dialect; all are accepted case-insensitively.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CatalogValue::Bool(b) => Some(*b),
            CatalogValue::Int(n) => Some(*n != 0),
            CatalogValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" | "1" | "y" | "t" => Some(true),
                "no" | "false" | "0" | "n" | "f" => Some(false),
                _ => None,
            },
            CatalogValue::Null => None,
        }
    }
}

impl fmt::Display for CatalogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogValue::Null => write!(f, "NULL"),
            CatalogValue::Text(s) => write!(f, "'{}'", s),
            CatalogValue::Int(n) => write!(f, "{}", n),
            CatalogValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CatalogValue {
    fn from(v: &str) -> Self {
        CatalogValue::Text(v.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(v: String) -> Self {
        CatalogValue::Text(v)
    }
}

impl From<i64> for CatalogValue {
    fn from(v: i64) -> Self {
        CatalogValue::Int(v)
    }
}

impl From<i32> for CatalogValue {
    fn from(v: i32) -> Self {
        CatalogValue::Int(v as i64)
    }
}

impl From<bool> for CatalogValue {
    fn from(v: bool) -> Self {
        CatalogValue::Bool(v)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CatalogValue::Null)
    }
}

/// One row returned by a catalog query, keyed by output alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    cells: Vec<(String, CatalogValue)>,
}

impl CatalogRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `n` cells.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            cells: Vec::with_capacity(n),
        }
    }

    /// Append a cell.
    pub fn push(&mut self, alias: impl Into<String>, value: CatalogValue) {
        self.cells.push((alias.into(), value));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, alias: impl Into<String>, value: impl Into<CatalogValue>) -> Self {
        self.push(alias, value.into());
        self
    }

    /// Look up a cell by its exact output alias.
    pub fn get(&self, alias: &str) -> Option<&CatalogValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, value)| value)
    }

    /// Output aliases in select order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
