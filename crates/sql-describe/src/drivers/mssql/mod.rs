//! Microsoft SQL Server driver.
//!
//! - [`MssqlDialect`]: catalog queries and normalization rules
//! - [`MssqlCatalog`]: pooled catalog connection (bb8 + tiberius)

mod connection;
mod dialect;

pub use connection::{MssqlCatalog, TiberiusConnectionManager};
pub use dialect::MssqlDialect;
