//! Configuration type definitions.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog connection settings.
    pub connection: ConnectionConfig,

    /// Describe behavior configuration.
    #[serde(default)]
    pub describe: DescribeConfig,
}

/// Connection to the database whose tables are described.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database type: mysql, postgres or mssql.
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306 / 5432 / 1433 by type).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Schema (project) to describe tables in.
    /// Defaults: mysql = database name, postgres = "public", mssql = "dbo".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// SSL mode for mysql and postgres (default: preferred / require).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<String>,

    /// Encrypt the TDS connection (mssql only, default: true).
    #[serde(default = "default_true")]
    pub encrypt: bool,

    /// Trust the server certificate without validation (mssql only).
    #[serde(default)]
    pub trust_server_cert: bool,
}

impl ConnectionConfig {
    /// Parsed database type.
    pub fn dialect(&self) -> crate::error::Result<DialectKind> {
        DialectKind::parse(&self.r#type)
    }

    /// Configured port, or the dialect's default.
    pub fn port_for(&self, dialect: DialectKind) -> u16 {
        self.port.unwrap_or_else(|| dialect.default_port())
    }

    /// Configured schema, or the dialect's default.
    pub fn schema_for(&self, dialect: DialectKind) -> String {
        match &self.schema {
            Some(schema) if !schema.is_empty() => schema.clone(),
            _ => match dialect {
                DialectKind::Mysql => self.database.clone(),
                DialectKind::Postgres => "public".to_string(),
                DialectKind::SqlServer => "dbo".to_string(),
            },
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .field("encrypt", &self.encrypt)
            .field("trust_server_cert", &self.trust_server_cert)
            .finish()
    }
}

/// Describe behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeConfig {
    /// Maximum pooled connections (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Timeout for a whole describe call, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout_secs: Option<u64>,
}

impl DescribeConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            query_timeout_secs: None,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_connections() -> usize {
    4
}
