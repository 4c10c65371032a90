//! Core traits for database-agnostic table introspection.
//!
//! - [`CatalogConnection`]: executes catalog queries against one backend
//! - [`SchemaDialect`]: catalog query text and normalization rules per backend
//!
//! Describers only ever talk to these two traits, so they can be driven by the
//! pooled drivers in `drivers/` or by a scripted connection in tests.

use async_trait::async_trait;

use crate::dialect::{CatalogQuery, DialectKind, NormalizationRules, QueryKind};
use crate::error::Result;

use super::value::CatalogRow;

/// A connection (or pool) able to run parameterized catalog queries.
///
/// The connection is bound to one dialect and one schema. Rows are returned in
/// the order the backend produced them, each keyed by the aliases the SQL
/// selected.
#[async_trait]
pub trait CatalogConnection: Send + Sync {
    /// Backend this connection talks to.
    fn dialect(&self) -> DialectKind;

    /// Schema (database for MySQL) catalog queries are scoped to.
    fn schema(&self) -> &str;

    /// Run `sql` with positional text parameters and fetch every row.
    ///
    /// Backend failures surface as the dialect's native error variant.
    /// Implementations release the underlying connection on every path,
    /// including when the returned future is dropped.
    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>>;
}

/// Catalog query strategy for one database engine.
///
/// Implementations are stateless; the same instance is shared by every
/// describe call.
pub trait SchemaDialect: Send + Sync {
    /// Dialect this strategy implements.
    fn kind(&self) -> DialectKind;

    /// Get the dialect identifier (e.g., "mysql", "postgres").
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Get a parameter placeholder for the given 1-based index.
    ///
    /// - MySQL: `?`
    /// - PostgreSQL: `$1`, `$2`, etc.
    /// - SQL Server: `@P1`, `@P2`, etc.
    fn param_placeholder(&self, index: usize) -> String;

    /// Column listing for one table.
    fn column_query(&self) -> &'static CatalogQuery;

    /// Outbound foreign keys of one table.
    fn foreign_key_query(&self) -> &'static CatalogQuery;

    /// Convention-named indexes of one table.
    fn index_query(&self) -> &'static CatalogQuery;

    /// How decoded column values are canonicalized.
    fn rules(&self) -> &'static NormalizationRules;

    /// Query for the given describer.
    fn query(&self, kind: QueryKind) -> &'static CatalogQuery {
        match kind {
            QueryKind::Columns => self.column_query(),
            QueryKind::ForeignKeys => self.foreign_key_query(),
            QueryKind::Indexes => self.index_query(),
        }
    }
}
