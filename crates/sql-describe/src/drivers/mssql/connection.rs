//! SQL Server catalog connection.
//!
//! Uses Tiberius with bb8 connection pooling. TCP keepalive is configured
//! through socket2 before the TDS handshake.

use std::time::Duration;

use async_trait::async_trait;
use bb8::Pool;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::core::traits::CatalogConnection;
use crate::core::value::{CatalogRow, CatalogValue};
use crate::dialect::DialectKind;
use crate::error::{DescribeError, Result};

/// Connection pool timeouts.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
const POOL_MAX_LIFETIME: Duration = Duration::from_secs(1800);
const TCP_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Connection manager for bb8 pool with Tiberius.
#[derive(Clone)]
pub struct TiberiusConnectionManager {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: String,
    encrypt: bool,
    trust_server_cert: bool,
}

impl TiberiusConnectionManager {
    fn new(config: &ConnectionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port_for(DialectKind::SqlServer),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            encrypt: config.encrypt,
            trust_server_cert: config.trust_server_cert,
        }
    }

    fn build_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        config.application_name("sql-describe");

        if self.encrypt {
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }
        if self.trust_server_cert {
            config.trust_cert();
        }

        config
    }
}

fn io_error(e: std::io::Error, context: &str) -> tiberius::error::Error {
    tiberius::error::Error::Io {
        kind: e.kind(),
        message: format!("{}: {}", context, e),
    }
}

#[async_trait]
impl bb8::ManageConnection for TiberiusConnectionManager {
    type Connection = Client<Compat<TcpStream>>;
    type Error = tiberius::error::Error;

    async fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        let config = self.build_config();
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| io_error(e, "connecting"))?;
        tcp.set_nodelay(true).ok();

        let std_tcp = tcp
            .into_std()
            .map_err(|e| io_error(e, "detaching socket"))?;
        let socket = socket2::Socket::from(std_tcp);
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(TCP_KEEPALIVE_INTERVAL)
            .with_interval(TCP_KEEPALIVE_INTERVAL);
        if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
            warn!("Failed to set TCP keepalive on MSSQL connection: {}", e);
        }

        let std_tcp: std::net::TcpStream = socket.into();
        std_tcp.set_nonblocking(true).ok();
        let tcp = TcpStream::from_std(std_tcp).map_err(|e| io_error(e, "converting socket"))?;

        Client::connect(config, tcp.compat_write()).await
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// SQL Server catalog connection.
pub struct MssqlCatalog {
    pool: Pool<TiberiusConnectionManager>,
    schema: String,
}

impl MssqlCatalog {
    /// Create a new SQL Server catalog pool from configuration.
    pub async fn connect(config: &ConnectionConfig, max_conns: usize) -> Result<Self> {
        let manager = TiberiusConnectionManager::new(config);
        let port = manager.port;

        let pool = Pool::builder()
            .max_size(max_conns as u32)
            .connection_timeout(POOL_CONNECTION_TIMEOUT)
            .idle_timeout(Some(POOL_IDLE_TIMEOUT))
            .max_lifetime(Some(POOL_MAX_LIFETIME))
            .test_on_check_out(true)
            .build(manager)
            .await
            .map_err(|e| DescribeError::pool(e, "creating MSSQL catalog pool"))?;

        info!(
            "Created MSSQL pool: {}:{}/{} (pool_size={})",
            config.host, port, config.database, max_conns
        );

        Ok(Self {
            pool,
            schema: config.schema_for(DialectKind::SqlServer),
        })
    }

    /// Test the database connection.
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DescribeError::pool(e, "testing MSSQL connection"))?;
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    /// Convert a Tiberius row into a catalog row.
    fn convert_row(row: Row) -> Result<CatalogRow> {
        let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
        let mut out = CatalogRow::with_capacity(names.len());

        for (name, data) in names.into_iter().zip(row) {
            let value = match data {
                ColumnData::String(v) => CatalogValue::from(v.map(|s| s.into_owned())),
                ColumnData::U8(v) => CatalogValue::from(v.map(i64::from)),
                ColumnData::I16(v) => CatalogValue::from(v.map(i64::from)),
                ColumnData::I32(v) => CatalogValue::from(v.map(i64::from)),
                ColumnData::I64(v) => CatalogValue::from(v),
                ColumnData::Bit(v) => CatalogValue::from(v),
                other => {
                    return Err(DescribeError::decode(
                        "sqlserver row",
                        format!("unsupported value for column '{}': {:?}", name, other),
                    ))
                }
            };
            out.push(name, value);
        }

        Ok(out)
    }
}

#[async_trait]
impl CatalogConnection for MssqlCatalog {
    fn dialect(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DescribeError::pool(e, "acquiring MSSQL connection"))?;

        let mut query = Query::new(sql);
        for param in params {
            query.bind(param.to_string());
        }

        let stream = query.query(&mut *conn).await?;
        let rows = stream.into_first_result().await?;

        rows.into_iter().map(Self::convert_row).collect()
    }
}
