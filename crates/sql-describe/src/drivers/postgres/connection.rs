//! PostgreSQL catalog connection.
//!
//! Uses deadpool-postgres for connection pooling. Catalog statements are
//! prepared once per pooled client with every parameter typed as `text`.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Config as PgConfig, Row};
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::core::traits::CatalogConnection;
use crate::core::value::{CatalogRow, CatalogValue};
use crate::dialect::DialectKind;
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{DescribeError, Result};

/// PostgreSQL catalog connection.
pub struct PostgresCatalog {
    pool: Pool,
    schema: String,
}

impl PostgresCatalog {
    /// Create a new PostgreSQL catalog pool from configuration.
    pub async fn connect(config: &ConnectionConfig, max_conns: usize) -> Result<Self> {
        let dialect = DialectKind::Postgres;
        let port = config.port_for(dialect);

        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("sql-describe");

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let ssl_mode = SslMode::resolve(config.ssl_mode.as_deref(), dialect)?;
        let pool = match TlsBuilder::new(ssl_mode).build()? {
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                let mgr = Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config);
                Pool::builder(mgr)
                    .max_size(max_conns)
                    .build()
                    .map_err(|e| DescribeError::pool(e, "creating PostgreSQL catalog pool"))?
            }
            Some(tls_connector) => {
                let mgr = Manager::from_config(pg_config, tls_connector, mgr_config);
                Pool::builder(mgr)
                    .max_size(max_conns)
                    .build()
                    .map_err(|e| DescribeError::pool(e, "creating PostgreSQL catalog pool"))?
            }
        };

        info!(
            "Created PostgreSQL pool: {}:{}/{} (pool_size={}, ssl_mode={:?})",
            config.host, port, config.database, max_conns, ssl_mode
        );

        Ok(Self::from_pool(pool, config.schema_for(dialect)))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Test the database connection.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DescribeError::pool(e, "testing PostgreSQL connection"))?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    /// Close the connection pool.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Convert a PostgreSQL row into a catalog row.
    fn convert_row(row: &Row) -> Result<CatalogRow> {
        let mut out = CatalogRow::with_capacity(row.columns().len());

        for (idx, column) in row.columns().iter().enumerate() {
            let value = match *column.type_() {
                Type::BOOL => row.try_get::<_, Option<bool>>(idx).map(CatalogValue::from),
                Type::INT2 => row
                    .try_get::<_, Option<i16>>(idx)
                    .map(|v| CatalogValue::from(v.map(i64::from))),
                Type::INT4 => row
                    .try_get::<_, Option<i32>>(idx)
                    .map(|v| CatalogValue::from(v.map(i64::from))),
                Type::INT8 => row.try_get::<_, Option<i64>>(idx).map(CatalogValue::from),
                Type::OID => row
                    .try_get::<_, Option<u32>>(idx)
                    .map(|v| CatalogValue::from(v.map(i64::from))),
                _ => row.try_get::<_, Option<String>>(idx).map(CatalogValue::from),
            }
            .map_err(|e| {
                DescribeError::decode(
                    "postgres row",
                    format!("column '{}' ({}): {}", column.name(), column.type_(), e),
                )
            })?;
            out.push(column.name(), value);
        }

        Ok(out)
    }
}

#[async_trait]
impl CatalogConnection for PostgresCatalog {
    fn dialect(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DescribeError::pool(e, "acquiring PostgreSQL connection"))?;

        let types = vec![Type::TEXT; params.len()];
        let stmt = client.prepare_typed_cached(sql, &types).await?;

        let args: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();
        let rows = client.query(&stmt, &args).await?;

        rows.iter().map(Self::convert_row).collect()
    }
}
