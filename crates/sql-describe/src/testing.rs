//! Scripted in-memory catalog connection for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::traits::{CatalogConnection, SchemaDialect};
use crate::core::value::CatalogRow;
use crate::dialect::{BindParam, DialectKind, QueryKind};
use crate::drivers::DialectImpl;
use crate::error::{DescribeError, Result};

enum Scripted {
    Rows(Vec<CatalogRow>),
    Fail(String),
    Hang,
}

/// One query received by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub kind: QueryKind,
    pub params: Vec<String>,
}

/// A `CatalogConnection` answering from scripted rows keyed by query kind and
/// table. Unscripted queries return no rows.
pub(crate) struct FakeCatalog {
    dialect: DialectImpl,
    schema: String,
    script: Mutex<HashMap<(QueryKind, String), Scripted>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeCatalog {
    pub fn new(kind: DialectKind, schema: &str) -> Self {
        Self {
            dialect: DialectImpl::for_kind(kind),
            schema: schema.to_string(),
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn set(self, kind: QueryKind, table: &str, scripted: Scripted) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert((kind, table.to_string()), scripted);
        self
    }

    pub fn rows(self, kind: QueryKind, table: &str, rows: Vec<CatalogRow>) -> Self {
        self.set(kind, table, Scripted::Rows(rows))
    }

    pub fn fail(self, kind: QueryKind, table: &str, message: &str) -> Self {
        self.set(kind, table, Scripted::Fail(message.to_string()))
    }

    pub fn hang(self, kind: QueryKind, table: &str) -> Self {
        self.set(kind, table, Scripted::Hang)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<QueryKind> {
        self.calls().into_iter().map(|c| c.kind).collect()
    }
}

#[async_trait]
impl CatalogConnection for FakeCatalog {
    fn dialect(&self) -> DialectKind {
        self.dialect.kind()
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let query = QueryKind::ALL
            .into_iter()
            .map(|k| self.dialect.query(k))
            .find(|q| q.sql == sql)
            .unwrap_or_else(|| panic!("unexpected SQL for {}: {}", self.dialect.name(), sql));
        let table_pos = query
            .params
            .iter()
            .position(|p| *p == BindParam::Table)
            .unwrap();
        let table = params[table_pos].to_string();

        self.calls.lock().unwrap().push(Call {
            kind: query.kind,
            params: params.iter().map(|p| p.to_string()).collect(),
        });

        // let concurrent callers interleave
        tokio::task::yield_now().await;

        let outcome = {
            let script = self.script.lock().unwrap();
            match script.get(&(query.kind, table)) {
                None => Some(Ok(Vec::new())),
                Some(Scripted::Rows(rows)) => Some(Ok(rows.clone())),
                Some(Scripted::Fail(message)) => Some(Err(message.clone())),
                Some(Scripted::Hang) => None,
            }
        };
        match outcome {
            Some(result) => result.map_err(|m| DescribeError::Mysql(sqlx::Error::Protocol(m))),
            None => std::future::pending().await,
        }
    }
}

/// Column row using the shared aliases.
pub(crate) fn column_row(
    name: &str,
    null: &str,
    key: &str,
    data_type: &str,
    default: Option<&str>,
    auto_increment: bool,
    varchar_size: Option<i64>,
) -> CatalogRow {
    CatalogRow::new()
        .with("Field", name)
        .with("Null", null)
        .with("Key", key)
        .with("Type", data_type)
        .with("Default", default)
        .with("AutoIncrement", auto_increment)
        .with("VarcharSize", varchar_size)
}

/// Foreign-key row using the shared aliases.
pub(crate) fn foreign_key_row(
    table: &str,
    column: &str,
    constraint: &str,
    rule: &str,
    ref_table: &str,
    ref_column: &str,
) -> CatalogRow {
    CatalogRow::new()
        .with("TABLE_NAME", table)
        .with("COLUMN_NAME", column)
        .with("CONSTRAINT_NAME", constraint)
        .with("DELETE_RULE", rule)
        .with("REFERENCED_TABLE_NAME", ref_table)
        .with("REFERENCED_COLUMN_NAME", ref_column)
}

/// Index row using the shared aliases.
pub(crate) fn index_row(
    table: &str,
    column: &str,
    index: &str,
    seq: i64,
    unique: bool,
    sort: &str,
) -> CatalogRow {
    CatalogRow::new()
        .with("TABLE_NAME", table)
        .with("COLUMN_NAME", column)
        .with("INDEX_NAME", index)
        .with("SEQ_IN_INDEX", seq)
        .with("IS_UNIQUE", unique)
        .with("SORT", sort)
}
