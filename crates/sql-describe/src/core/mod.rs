//! Core abstractions for table introspection.
//!
//! - [`schema`]: canonical column, foreign key and index records
//! - [`value`]: backend-neutral catalog rows
//! - [`traits`]: the connection and dialect seams describers depend on
//!
//! Driver modules (`drivers/mysql`, `drivers/postgres`, `drivers/mssql`)
//! implement these traits; describers only see the traits.

pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{
    Column, DeleteRule, ForeignKey, IndexEntry, KeyRole, SortDirection, TableDescription,
};
pub use traits::{CatalogConnection, SchemaDialect};
pub use value::{CatalogRow, CatalogValue};
