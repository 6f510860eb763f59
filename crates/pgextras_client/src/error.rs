use thiserror::Error;

/// Convenience alias for `Result<T, ExtrasError>`.
pub type ExtrasResult<T> = Result<T, ExtrasError>;

/// Remediation text attached to the environment error raised when the
/// statement statistics extension is missing.
pub const PG_STATS_NOT_AVAILABLE: &str =
    "pg_stat_statements module is not installed; install the pg_stat_statements module";

/// Error classification for callers that branch on the failure category.
///
/// - `Connection`  — the session could not be established
/// - `Query`       — the server rejected a statement (syntax, permission, missing view)
/// - `Environment` — a required server-side extension is absent
/// - `Parse`       — the server version string did not match the expected pattern
/// - `Closed`      — the client was used after `close()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Query,
    Environment,
    Parse,
    Closed,
}

/// Top-level error type returned by every report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtrasError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {message} (statement: {sql})")]
    Query { sql: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Client is closed")]
    Closed,
}

impl ExtrasError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtrasError::Connection(_) => ErrorKind::Connection,
            ExtrasError::Query { .. } => ErrorKind::Query,
            ExtrasError::Environment(_) => ErrorKind::Environment,
            ExtrasError::Parse(_) => ErrorKind::Parse,
            ExtrasError::Closed => ErrorKind::Closed,
        }
    }

    pub fn query(sql: impl Into<String>, message: impl Into<String>) -> Self {
        ExtrasError::Query {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// The error raised when `pg_stat_statements` is not installed.
    pub fn stats_not_available() -> Self {
        ExtrasError::Environment(PG_STATS_NOT_AVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ExtrasError::Connection("refused".into()).kind(),
            ErrorKind::Connection
        );
        assert_eq!(ExtrasError::query("SELECT 1", "boom").kind(), ErrorKind::Query);
        assert_eq!(ExtrasError::stats_not_available().kind(), ErrorKind::Environment);
        assert_eq!(ExtrasError::Parse("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(ExtrasError::Closed.kind(), ErrorKind::Closed);
    }

    #[test]
    fn test_stats_not_available_carries_remediation() {
        let err = ExtrasError::stats_not_available();
        assert_eq!(err.kind(), ErrorKind::Environment);
        assert!(err
            .to_string()
            .contains("install the pg_stat_statements module"));
    }

    #[test]
    fn test_query_error_display_includes_statement() {
        let err = ExtrasError::query("SELECT nope", "column \"nope\" does not exist");
        let msg = err.to_string();
        assert!(msg.contains("SELECT nope"));
        assert!(msg.contains("does not exist"));
    }
}
