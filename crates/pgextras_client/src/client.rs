use std::fmt;

use tracing::debug;

use crate::capability::Capability;
use crate::error::{ExtrasError, ExtrasResult};
use crate::queries::{self, normalize_whitespace, render};
use crate::report::{Report, ReportOptions};
use crate::row::ResultSet;
use crate::session::{Connector, PgConnector, Session};
use crate::version::ServerVersion;

/// Session lifecycle: `Unopened -> Connected -> Closed`, never back.
enum SessionState {
    Unopened,
    Connected(Box<dyn Session>),
    Closed,
}

impl SessionState {
    fn label(&self) -> &'static str {
        match self {
            SessionState::Unopened => "unopened",
            SessionState::Connected(_) => "connected",
            SessionState::Closed => "closed",
        }
    }
}

/// Diagnostics client for one PostgreSQL endpoint.
///
/// The session is opened by the first report and reused until [`close`]
/// or drop. Server capabilities (statement statistics, version-dependent
/// column names) are looked up on first need and memoized for the lifetime of
/// the client.
///
/// ```no_run
/// # async fn demo() -> pgextras_client::ExtrasResult<()> {
/// let mut pg = pgextras_client::PgExtras::new("host=localhost user=postgres");
/// for row in pg.cache_hit().await? {
///     println!("{:?} {:?}", row.get(0), row.get(1));
/// }
/// # Ok(())
/// # }
/// ```
///
/// [`close`]: PgExtras::close
pub struct PgExtras {
    dsn: String,
    connector: Box<dyn Connector>,
    state: SessionState,
    statement_stats: Capability<bool>,
    server_version: Capability<ServerVersion>,
}

impl PgExtras {
    /// Client backed by `tokio-postgres`. Nothing is opened until the first
    /// report runs.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self::with_connector(dsn, PgConnector)
    }

    /// Client that opens its session through `connector`.
    pub fn with_connector(dsn: impl Into<String>, connector: impl Connector + 'static) -> Self {
        Self {
            dsn: dsn.into(),
            connector: Box::new(connector),
            state: SessionState::Unopened,
            statement_stats: Capability::Unresolved,
            server_version: Capability::Unresolved,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    async fn session(&mut self) -> ExtrasResult<&mut (dyn Session + 'static)> {
        if let SessionState::Unopened = self.state {
            let session = self.connector.connect(&self.dsn).await?;
            debug!("Session established");
            self.state = SessionState::Connected(session);
        }
        match &mut self.state {
            SessionState::Connected(session) => Ok(session.as_mut()),
            _ => Err(ExtrasError::Closed),
        }
    }

    /// Run `statement` and return all of its rows.
    ///
    /// Whitespace (newlines included) is collapsed to single spaces first so
    /// the text that reaches the server, and any error that quotes it, reads
    /// on one line.
    pub async fn execute(&mut self, statement: &str) -> ExtrasResult<ResultSet> {
        let sql = normalize_whitespace(statement);
        let session = self.session().await?;
        debug!("execute: {}", sql);
        session.simple_query(&sql).await
    }

    /// Whether `pg_stat_statements` is installed.
    ///
    /// Absence is an [`ExtrasError::Environment`] rather than `Ok(false)`:
    /// the reports that call this cannot run without the extension. Both
    /// outcomes are memoized; transport or query failures are not.
    pub async fn server_supports_statement_stats(&mut self) -> ExtrasResult<bool> {
        if let Some(cached) = self.statement_stats.cached() {
            return cached;
        }

        let rows = self.execute(queries::PG_STAT_STATEMENT).await?;
        let available = rows
            .first()
            .and_then(|r| r.get_by_name("available").or_else(|| r.get(0)))
            .map(parse_pg_bool)
            .unwrap_or(false);
        debug!("pg_stat_statements available: {}", available);

        let outcome = if available {
            Ok(true)
        } else {
            Err(ExtrasError::stats_not_available())
        };
        self.statement_stats.record(outcome)
    }

    /// Server version parsed from `SELECT version()`, memoized.
    pub async fn server_version(&mut self) -> ExtrasResult<ServerVersion> {
        if let Some(cached) = self.server_version.cached() {
            return cached;
        }

        let rows = self.version().await?;
        let text = rows
            .first()
            .and_then(|r| r.get_by_name("version").or_else(|| r.get(0)))
            .ok_or_else(|| ExtrasError::Parse("version() returned no rows".to_string()))?;
        let version = ServerVersion::parse(text)?;
        debug!("Server version resolved: {}", version);

        self.server_version.record(Ok(version))
    }

    /// True from 9.2.0 on, where `pg_stat_activity` uses `pid`/`query`.
    pub async fn is_recent_server_version(&mut self) -> ExtrasResult<bool> {
        Ok(self.server_version().await?.is_recent())
    }

    /// `pid` on recent servers, `procpid` before 9.2.
    pub async fn pid_column(&mut self) -> ExtrasResult<&'static str> {
        Ok(if self.is_recent_server_version().await? {
            queries::ACTIVITY_COLUMNS.pid
        } else {
            queries::ACTIVITY_COLUMNS_LEGACY.pid
        })
    }

    /// `query` on recent servers, `current_query` before 9.2.
    pub async fn query_column(&mut self) -> ExtrasResult<&'static str> {
        Ok(if self.is_recent_server_version().await? {
            queries::ACTIVITY_COLUMNS.query
        } else {
            queries::ACTIVITY_COLUMNS_LEGACY.query
        })
    }

    /// Fill the version-dependent placeholders of `template`.
    async fn render_for_server(&mut self, template: &str) -> ExtrasResult<String> {
        let columns = if self.is_recent_server_version().await? {
            &queries::ACTIVITY_COLUMNS
        } else {
            &queries::ACTIVITY_COLUMNS_LEGACY
        };
        Ok(render(
            template,
            &[
                ("pid_column", columns.pid),
                ("query_column", columns.query),
                ("state", columns.state),
                ("idle", columns.idle),
            ],
        ))
    }

    pub async fn cache_hit(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::CACHE_HIT).await
    }

    pub async fn index_usage(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::INDEX_USAGE).await
    }

    /// 10 most frequently called queries. Requires `pg_stat_statements`.
    pub async fn calls(&mut self, truncate: bool) -> ExtrasResult<ResultSet> {
        self.server_supports_statement_stats().await?;
        let select = if truncate {
            queries::CALLS_SELECT_TRUNCATED
        } else {
            queries::CALLS_SELECT
        };
        self.execute(&render(queries::CALLS, &[("select", select)]))
            .await
    }

    pub async fn blocking(&mut self) -> ExtrasResult<ResultSet> {
        let sql = self.render_for_server(queries::BLOCKING).await?;
        self.execute(&sql).await
    }

    /// 10 queries with the longest aggregate execution time. Requires
    /// `pg_stat_statements`.
    pub async fn outliers(&mut self, truncate: bool) -> ExtrasResult<ResultSet> {
        self.server_supports_statement_stats().await?;
        let query = if truncate {
            queries::OUTLIERS_QUERY_TRUNCATED
        } else {
            queries::OUTLIERS_QUERY
        };
        self.execute(&render(queries::OUTLIERS, &[("query", query)]))
            .await
    }

    pub async fn vacuum_stats(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::VACUUM_STATS).await
    }

    pub async fn bloat(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::BLOAT).await
    }

    /// Non-idle queries running for more than five minutes, longest first.
    pub async fn long_running_queries(&mut self) -> ExtrasResult<ResultSet> {
        let sql = self.render_for_server(queries::LONG_RUNNING_QUERIES).await?;
        self.execute(&sql).await
    }

    pub async fn seq_scans(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::SEQ_SCANS).await
    }

    /// Indexes scanned fewer than 50 times on tables larger than 5 pages,
    /// ordered by size per scan.
    pub async fn unused_indexes(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::UNUSED_INDEXES).await
    }

    pub async fn total_table_size(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::TOTAL_TABLE_SIZE).await
    }

    pub async fn total_indexes_size(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::TABLE_INDEXES_SIZE).await
    }

    pub async fn table_size(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::TABLE_SIZE).await
    }

    pub async fn index_size(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::INDEX_SIZE).await
    }

    pub async fn total_index_size(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::TOTAL_INDEX_SIZE).await
    }

    pub async fn locks(&mut self) -> ExtrasResult<ResultSet> {
        let sql = self.render_for_server(queries::LOCKS).await?;
        self.execute(&sql).await
    }

    pub async fn table_indexes_size(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::TABLE_INDEXES_SIZE).await
    }

    /// Active queries with their running time.
    pub async fn ps(&mut self) -> ExtrasResult<ResultSet> {
        let sql = self.render_for_server(queries::PS).await?;
        self.execute(&sql).await
    }

    pub async fn version(&mut self) -> ExtrasResult<ResultSet> {
        self.execute(queries::VERSION).await
    }

    /// Run `report` by value, for callers that select reports by name.
    pub async fn report(&mut self, report: Report, opts: ReportOptions) -> ExtrasResult<ResultSet> {
        debug!("report: {}", report);
        match report {
            Report::CacheHit => self.cache_hit().await,
            Report::IndexUsage => self.index_usage().await,
            Report::Calls => self.calls(opts.truncate).await,
            Report::Blocking => self.blocking().await,
            Report::Outliers => self.outliers(opts.truncate).await,
            Report::VacuumStats => self.vacuum_stats().await,
            Report::Bloat => self.bloat().await,
            Report::LongRunningQueries => self.long_running_queries().await,
            Report::SeqScans => self.seq_scans().await,
            Report::UnusedIndexes => self.unused_indexes().await,
            Report::TotalTableSize => self.total_table_size().await,
            Report::TotalIndexesSize => self.total_indexes_size().await,
            Report::TableSize => self.table_size().await,
            Report::IndexSize => self.index_size().await,
            Report::TotalIndexSize => self.total_index_size().await,
            Report::Locks => self.locks().await,
            Report::TableIndexesSize => self.table_indexes_size().await,
            Report::Ps => self.ps().await,
            Report::Version => self.version().await,
        }
    }

    /// Release the session. A no-op when nothing was opened or the client
    /// is already closed; reports fail with [`ExtrasError::Closed`] after a
    /// session has been released.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Connected(mut session) => {
                session.close();
                debug!("Session closed");
            }
            other => self.state = other,
        }
    }
}

impl Drop for PgExtras {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for PgExtras {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgExtras")
            .field("state", &self.state.label())
            .field("statement_stats", &self.statement_stats)
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}

/// Text-format boolean as sent over the simple-query protocol.
fn parse_pg_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "t" | "true" | "1" | "yes" | "on"
    )
}
