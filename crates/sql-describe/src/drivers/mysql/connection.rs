//! MySQL catalog connection.
//!
//! Uses a sqlx `MySqlPool`. Depending on server version, `information_schema`
//! columns come back as VARCHAR, LONGTEXT or binary strings, so anything that
//! is not an integer or a boolean is decoded from raw bytes.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as _, Row, TypeInfo, ValueRef};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::core::traits::CatalogConnection;
use crate::core::value::{CatalogRow, CatalogValue};
use crate::dialect::DialectKind;
use crate::drivers::common::SslMode;
use crate::error::{DescribeError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL/MariaDB catalog connection.
pub struct MysqlCatalog {
    pool: MySqlPool,
    schema: String,
}

impl MysqlCatalog {
    /// Create a new MySQL catalog pool from configuration.
    pub async fn connect(config: &ConnectionConfig, max_conns: usize) -> Result<Self> {
        let dialect = DialectKind::Mysql;
        let ssl_mode = SslMode::resolve(config.ssl_mode.as_deref(), dialect)?;
        let port = config.port_for(dialect);

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(ssl_mode.to_mysql());

        let pool = MySqlPoolOptions::new()
            .max_connections(max_conns as u32)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| DescribeError::pool(e, "creating MySQL catalog pool"))?;

        info!(
            "Connected to MySQL: {}:{}/{} (pool_size={})",
            config.host, port, config.database, max_conns
        );

        Ok(Self::from_pool(pool, config.schema_for(dialect)))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Test the database connection.
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DescribeError::pool(e, "testing MySQL connection"))?;
        Ok(())
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Convert a MySQL row into a catalog row.
    fn convert_row(row: &MySqlRow) -> Result<CatalogRow> {
        let mut out = CatalogRow::with_capacity(row.columns().len());

        for (idx, column) in row.columns().iter().enumerate() {
            let raw = row.try_get_raw(idx).map_err(decode_error)?;
            if raw.is_null() {
                out.push(column.name(), CatalogValue::Null);
                continue;
            }

            let type_name = raw.type_info().name().to_ascii_uppercase();
            let value = match type_name.as_str() {
                "BOOLEAN" => CatalogValue::Bool(row.try_get::<bool, _>(idx).map_err(decode_error)?),
                "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                    CatalogValue::Int(row.try_get::<i64, _>(idx).map_err(decode_error)?)
                }
                "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED"
                | "INT UNSIGNED" | "BIGINT UNSIGNED" => {
                    let v = row.try_get::<u64, _>(idx).map_err(decode_error)?;
                    let v = i64::try_from(v).map_err(|_| {
                        DescribeError::decode(
                            "mysql row",
                            format!("value {} of '{}' overflows i64", v, column.name()),
                        )
                    })?;
                    CatalogValue::Int(v)
                }
                // VARCHAR, TEXT, BLOB, VARBINARY, DECIMAL, ...
                _ => {
                    let bytes = row
                        .try_get_unchecked::<Vec<u8>, _>(idx)
                        .map_err(decode_error)?;
                    CatalogValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
            };
            out.push(column.name(), value);
        }

        Ok(out)
    }
}

fn decode_error(e: sqlx::Error) -> DescribeError {
    DescribeError::decode("mysql row", e.to_string())
}

#[async_trait]
impl CatalogConnection for MysqlCatalog {
    fn dialect(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }

        // Acquire separately so pool exhaustion reports as a connection error
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DescribeError::pool(e, "acquiring MySQL connection"))?;

        let rows: Vec<MySqlRow> = query.fetch_all(&mut *conn).await?;
        rows.iter().map(Self::convert_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_CONNECTION_ERROR;
    use sqlx::mysql::MySqlSslMode;

    #[tokio::test]
    async fn test_unreachable_pool_is_connection_error() {
        let options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .ssl_mode(MySqlSslMode::Disabled);
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy_with(options);
        let catalog = MysqlCatalog::from_pool(pool, "app");

        let err = catalog.fetch_rows("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, DescribeError::Pool { .. }), "{:?}", err);
        assert_eq!(err.exit_code(), EXIT_CONNECTION_ERROR);
        assert!(err.to_string().contains("acquiring MySQL connection"));
    }
}
