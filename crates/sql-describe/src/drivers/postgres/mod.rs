//! PostgreSQL driver.
//!
//! - [`PostgresDialect`]: catalog queries and normalization rules
//! - [`PostgresCatalog`]: pooled catalog connection (deadpool-postgres)

mod connection;
mod dialect;

pub use connection::PostgresCatalog;
pub use dialect::PostgresDialect;
