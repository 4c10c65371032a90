//! Common utilities shared across database drivers.
//!
//! - [`tls`]: TLS mode resolution for MySQL and PostgreSQL connections

pub mod tls;

pub use tls::{SslMode, TlsBuilder};
