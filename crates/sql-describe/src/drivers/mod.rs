//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB driver (sqlx)
//! - [`postgres`]: PostgreSQL driver (deadpool-postgres)
//! - [`mssql`]: Microsoft SQL Server driver (bb8 + tiberius)
//! - [`common`]: Shared utilities (TLS)
//!
//! Each driver module provides a `SchemaDialect` with its catalog queries and
//! a pooled `CatalogConnection`.
//!
//! # Static dispatch
//!
//! [`DialectImpl`] and [`CatalogPool`] are enums whose variants implement the
//! core traits directly; the compiler generates a match instead of a vtable.

pub mod common;
pub mod mssql;
pub mod mysql;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};

pub use mssql::{MssqlCatalog, MssqlDialect};
pub use mysql::{MysqlCatalog, MysqlDialect};
pub use postgres::{PostgresCatalog, PostgresDialect};

use async_trait::async_trait;
use tracing::info;

use crate::config::ConnectionConfig;
use crate::core::traits::{CatalogConnection, SchemaDialect};
use crate::core::value::CatalogRow;
use crate::dialect::{CatalogQuery, DialectKind, NormalizationRules};
use crate::error::Result;

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Mysql(MysqlDialect),
    Postgres(PostgresDialect),
    Mssql(MssqlDialect),
}

impl DialectImpl {
    /// Dialect strategy for a backend kind.
    pub fn for_kind(kind: DialectKind) -> Self {
        match kind {
            DialectKind::Mysql => DialectImpl::Mysql(MysqlDialect::new()),
            DialectKind::Postgres => DialectImpl::Postgres(PostgresDialect::new()),
            DialectKind::SqlServer => DialectImpl::Mssql(MssqlDialect::new()),
        }
    }

    /// Create a dialect implementation from a database type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database type is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        Ok(Self::for_kind(DialectKind::parse(db_type)?))
    }
}

impl SchemaDialect for DialectImpl {
    fn kind(&self) -> DialectKind {
        match self {
            DialectImpl::Mysql(d) => d.kind(),
            DialectImpl::Postgres(d) => d.kind(),
            DialectImpl::Mssql(d) => d.kind(),
        }
    }

    fn param_placeholder(&self, index: usize) -> String {
        match self {
            DialectImpl::Mysql(d) => d.param_placeholder(index),
            DialectImpl::Postgres(d) => d.param_placeholder(index),
            DialectImpl::Mssql(d) => d.param_placeholder(index),
        }
    }

    fn column_query(&self) -> &'static CatalogQuery {
        match self {
            DialectImpl::Mysql(d) => d.column_query(),
            DialectImpl::Postgres(d) => d.column_query(),
            DialectImpl::Mssql(d) => d.column_query(),
        }
    }

    fn foreign_key_query(&self) -> &'static CatalogQuery {
        match self {
            DialectImpl::Mysql(d) => d.foreign_key_query(),
            DialectImpl::Postgres(d) => d.foreign_key_query(),
            DialectImpl::Mssql(d) => d.foreign_key_query(),
        }
    }

    fn index_query(&self) -> &'static CatalogQuery {
        match self {
            DialectImpl::Mysql(d) => d.index_query(),
            DialectImpl::Postgres(d) => d.index_query(),
            DialectImpl::Mssql(d) => d.index_query(),
        }
    }

    fn rules(&self) -> &'static NormalizationRules {
        match self {
            DialectImpl::Mysql(d) => d.rules(),
            DialectImpl::Postgres(d) => d.rules(),
            DialectImpl::Mssql(d) => d.rules(),
        }
    }
}

/// Pooled catalog connection for any supported backend.
pub enum CatalogPool {
    Mysql(MysqlCatalog),
    Postgres(PostgresCatalog),
    Mssql(MssqlCatalog),
}

impl CatalogPool {
    /// Create the pool matching the configured database type.
    pub async fn connect(config: &ConnectionConfig, max_connections: usize) -> Result<Self> {
        let dialect = config.dialect()?;
        info!(
            "Connecting to {} at {}:{}",
            dialect,
            config.host,
            config.port_for(dialect)
        );

        let pool = match dialect {
            DialectKind::Mysql => {
                CatalogPool::Mysql(MysqlCatalog::connect(config, max_connections).await?)
            }
            DialectKind::Postgres => {
                CatalogPool::Postgres(PostgresCatalog::connect(config, max_connections).await?)
            }
            DialectKind::SqlServer => {
                CatalogPool::Mssql(MssqlCatalog::connect(config, max_connections).await?)
            }
        };
        Ok(pool)
    }

    /// Run `SELECT 1` on a pooled connection.
    pub async fn test_connection(&self) -> Result<()> {
        match self {
            CatalogPool::Mysql(p) => p.test_connection().await,
            CatalogPool::Postgres(p) => p.test_connection().await,
            CatalogPool::Mssql(p) => p.test_connection().await,
        }
    }

    /// Close the pool. bb8 pools close when the last handle is dropped.
    pub async fn close(&self) {
        match self {
            CatalogPool::Mysql(p) => p.close().await,
            CatalogPool::Postgres(p) => p.close(),
            CatalogPool::Mssql(_) => {}
        }
    }
}

#[async_trait]
impl CatalogConnection for CatalogPool {
    fn dialect(&self) -> DialectKind {
        match self {
            CatalogPool::Mysql(p) => p.dialect(),
            CatalogPool::Postgres(p) => p.dialect(),
            CatalogPool::Mssql(p) => p.dialect(),
        }
    }

    fn schema(&self) -> &str {
        match self {
            CatalogPool::Mysql(p) => p.schema(),
            CatalogPool::Postgres(p) => p.schema(),
            CatalogPool::Mssql(p) => p.schema(),
        }
    }

    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        match self {
            CatalogPool::Mysql(p) => p.fetch_rows(sql, params).await,
            CatalogPool::Postgres(p) => p.fetch_rows(sql, params).await,
            CatalogPool::Mssql(p) => p.fetch_rows(sql, params).await,
        }
    }
}
