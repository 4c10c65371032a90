//! MySQL/MariaDB database driver.
//!
//! - [`MysqlDialect`]: catalog queries and normalization rules
//! - [`MysqlCatalog`]: pooled catalog connection
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod connection;
mod dialect;

pub use connection::MysqlCatalog;
pub use dialect::MysqlDialect;
