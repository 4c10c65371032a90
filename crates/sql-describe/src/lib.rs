//! # sql-describe
//!
//! Cross-dialect table introspection for MySQL, PostgreSQL and SQL Server.
//!
//! Given a table name and a connection bound to one backend, produces a
//! backend-independent description of the table:
//!
//! - **Columns** with nullability, key role, type, normalized default,
//!   auto-increment flag and varchar size
//! - **Foreign keys**, one record per constrained column
//! - **Indexes** following the `index_` naming convention, one record per
//!   key column
//!
//! Each backend's catalog SQL, bind order and normalization rules live behind
//! the [`SchemaDialect`] trait; the describers only see [`CatalogConnection`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use sql_describe::{Config, Describer, QueryContext};
//!
//! #[tokio::main]
//! async fn main() -> sql_describe::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let describer = Describer::connect(&config).await?;
//!     let ctx = QueryContext::new().with_optional_timeout(config.describe.query_timeout());
//!     let table = describer.describe_table("users", &ctx).await?;
//!     println!("{} columns", table.columns.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod describe;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use crate::core::{
    CatalogConnection, CatalogRow, CatalogValue, Column, DeleteRule, ForeignKey, IndexEntry,
    KeyRole, SchemaDialect, SortDirection, TableDescription,
};
pub use config::{Config, ConnectionConfig, DescribeConfig};
pub use describe::{
    describe_columns, describe_foreign_keys, describe_indexes, IndexNamingConvention,
    QueryContext,
};
pub use dialect::{CatalogQuery, DialectKind, NormalizationRules, QueryKind};
pub use drivers::{CatalogPool, DialectImpl};
pub use error::{DescribeError, Result};
pub use orchestrator::{describe_table, Describer, HealthCheckResult};
