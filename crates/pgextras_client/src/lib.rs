//! Diagnostic reports for a running PostgreSQL server.
//!
//! [`PgExtras`] wraps one lazily opened session and exposes cache hit
//! rates, index usage, lock contention, bloat, relation sizes and current
//! activity as plain rows. SQL text adapts to the server version
//! (`procpid`/`current_query` before 9.2) and to whether
//! `pg_stat_statements` is installed.

pub mod capability;
pub mod client;
pub mod config;
pub mod error;
pub mod queries;
pub mod report;
pub mod row;
pub mod session;
pub mod version;

pub use client::PgExtras;
pub use config::ConnectionConfig;
pub use error::{ErrorKind, ExtrasError, ExtrasResult};
pub use report::{Report, ReportOptions};
pub use row::{ResultSet, Row};
pub use session::{Connector, PgConnector, Session};
pub use version::ServerVersion;
