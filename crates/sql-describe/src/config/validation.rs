//! Configuration validation.

use super::Config;
use crate::drivers::common::SslMode;
use crate::error::{DescribeError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;

    let dialect = conn.dialect()?;

    if conn.host.is_empty() {
        return Err(DescribeError::Config("connection.host is required".into()));
    }
    if conn.database.is_empty() {
        return Err(DescribeError::Config(
            "connection.database is required".into(),
        ));
    }
    if conn.user.is_empty() {
        return Err(DescribeError::Config("connection.user is required".into()));
    }
    if let Some(0) = conn.port {
        return Err(DescribeError::Config(
            "connection.port must be between 1 and 65535".into(),
        ));
    }

    SslMode::resolve(conn.ssl_mode.as_deref(), dialect)?;

    if config.describe.max_connections == 0 {
        return Err(DescribeError::Config(
            "describe.max_connections must be at least 1".into(),
        ));
    }
    if let Some(0) = config.describe.query_timeout_secs {
        return Err(DescribeError::Config(
            "describe.query_timeout_secs must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, DescribeConfig};

    fn valid_config() -> Config {
        Config {
            connection: ConnectionConfig {
                r#type: "postgres".to_string(),
                host: "localhost".to_string(),
                port: Some(5432),
                database: "app".to_string(),
                user: "postgres".to_string(),
                password: "password".to_string(),
                schema: None,
                ssl_mode: Some("disable".to_string()),
                encrypt: true,
                trust_server_cert: false,
            },
            describe: DescribeConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.connection.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_database_and_user() {
        let mut config = valid_config();
        config.connection.database = "".to_string();
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.connection.user = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_type() {
        let mut config = valid_config();
        config.connection.r#type = "oracle".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("Unknown database type"));
    }

    #[test]
    fn test_type_aliases() {
        for alias in ["mysql", "pg", "postgresql", "mssql", "sqlserver"] {
            let mut config = valid_config();
            config.connection.r#type = alias.to_string();
            config.connection.ssl_mode = None;
            assert!(validate(&config).is_ok(), "{} should be accepted", alias);
        }
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let mut config = valid_config();
        config.connection.ssl_mode = Some("sometimes".to_string());
        assert!(validate(&config).is_err());

        config.connection.ssl_mode = Some("prefer".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_connections_and_timeout() {
        let mut config = valid_config();
        config.describe.max_connections = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.describe.query_timeout_secs = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_connection_config_debug_redacts_password() {
        let mut config = valid_config();
        config.connection.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.connection);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_123"),
            "Debug output should not contain actual password value"
        );
    }
}
