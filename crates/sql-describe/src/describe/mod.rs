//! Per-aspect describers: columns, foreign keys, indexes.
//!
//! Each describer resolves its query from the dialect, binds `(table, schema)`
//! in the dialect's order, runs it through the [`QueryContext`] and decodes
//! rows through the query's field map into canonical records.

pub mod columns;
pub mod context;
pub mod foreign_keys;
pub mod indexes;

pub use columns::describe_columns;
pub use context::QueryContext;
pub use foreign_keys::describe_foreign_keys;
pub use indexes::{describe_indexes, IndexNamingConvention};

use tracing::debug;

use crate::core::traits::CatalogConnection;
use crate::core::value::{CatalogRow, CatalogValue};
use crate::dialect::{CatalogQuery, Field};
use crate::error::{DescribeError, Result};

/// Bind and run one catalog query, draining every row.
pub(crate) async fn fetch<C>(
    conn: &C,
    query: &CatalogQuery,
    table: &str,
    ctx: &QueryContext,
) -> Result<Vec<CatalogRow>>
where
    C: CatalogConnection + ?Sized,
{
    let params = query.bind(table, conn.schema());
    debug!(
        dialect = %conn.dialect(),
        query = %query.kind,
        params = params.len(),
        "running catalog query for {}.{}",
        conn.schema(),
        table
    );
    ctx.run(conn.fetch_rows(query.sql, &params)).await
}

/// Typed access to one catalog row through a query's field map.
pub(crate) struct RowReader<'a> {
    query: &'a CatalogQuery,
    row: &'a CatalogRow,
}

impl<'a> RowReader<'a> {
    pub(crate) fn new(query: &'a CatalogQuery, row: &'a CatalogRow) -> Self {
        Self { query, row }
    }

    fn error(&self, message: String) -> DescribeError {
        DescribeError::decode(self.query.kind.as_str(), message)
    }

    fn value(&self, field: Field) -> Result<(&'static str, &'a CatalogValue)> {
        let alias = self.query.alias(field)?;
        let value = self
            .row
            .get(alias)
            .ok_or_else(|| self.error(format!("row has no column '{}'", alias)))?;
        Ok((alias, value))
    }

    pub(crate) fn opt_text(&self, field: Field) -> Result<Option<String>> {
        let (_, value) = self.value(field)?;
        Ok(value.as_text().map(|s| s.into_owned()))
    }

    pub(crate) fn text(&self, field: Field) -> Result<String> {
        let (alias, value) = self.value(field)?;
        value
            .as_text()
            .map(|s| s.into_owned())
            .ok_or_else(|| self.error(format!("column '{}' is NULL", alias)))
    }

    pub(crate) fn opt_flag(&self, field: Field) -> Result<Option<bool>> {
        let (alias, value) = self.value(field)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_flag()
            .map(Some)
            .ok_or_else(|| self.error(format!("column '{}' is not a flag: {}", alias, value)))
    }

    pub(crate) fn flag(&self, field: Field) -> Result<bool> {
        let alias = self.query.alias(field)?;
        self.opt_flag(field)?
            .ok_or_else(|| self.error(format!("column '{}' is NULL", alias)))
    }

    pub(crate) fn opt_int(&self, field: Field) -> Result<Option<i64>> {
        let (alias, value) = self.value(field)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| self.error(format!("column '{}' is not an integer: {}", alias, value)))
    }

    pub(crate) fn int(&self, field: Field) -> Result<i64> {
        let alias = self.query.alias(field)?;
        self.opt_int(field)?
            .ok_or_else(|| self.error(format!("column '{}' is NULL", alias)))
    }
}
