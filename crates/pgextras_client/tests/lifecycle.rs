mod common;
use common::*;

#[tokio::test]
async fn test_connects_lazily_and_once() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    let mut pg = script.client();
    assert_eq!(script.connects(), 0);
    assert!(!pg.is_connected());

    pg.cache_hit().await.unwrap();
    pg.seq_scans().await.unwrap();
    pg.ps().await.unwrap();

    assert!(pg.is_connected());
    assert_eq!(script.connects(), 1);
}

#[tokio::test]
async fn test_execute_collapses_whitespace() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    let mut pg = script.client();

    let rows = pg.execute("SELECT\n  1,\n  2").await.unwrap();

    assert_eq!(script.statements(), vec!["SELECT 1, 2".to_string()]);
    assert_eq!(rows[0].get_by_name("statement"), Some("SELECT 1, 2"));
}

#[tokio::test]
async fn test_templates_reach_server_on_one_line() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    let mut pg = script.client();

    pg.bloat().await.unwrap();
    pg.vacuum_stats().await.unwrap();

    for sql in script.statements() {
        assert!(!sql.contains('\n'));
        assert!(!sql.contains("  "));
    }
}

#[tokio::test]
async fn test_close_never_opened_is_noop() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    let mut pg = script.client();

    pg.close();
    pg.close();

    assert_eq!(script.connects(), 0);
    assert_eq!(script.closes(), 0);
}

#[tokio::test]
async fn test_close_is_idempotent_and_drop_does_not_close_twice() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    {
        let mut pg = script.client();
        pg.version().await.unwrap();
        pg.close();
        pg.close();
        assert!(pg.is_closed());
    }
    assert_eq!(script.closes(), 1);
}

#[tokio::test]
async fn test_drop_releases_session() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    {
        let mut pg = script.client();
        pg.index_usage().await.unwrap();
    }
    assert_eq!(script.closes(), 1);
}

#[tokio::test]
async fn test_drop_releases_session_after_failed_report() {
    async fn cache_then_bloat(script: &ScriptedConnector) -> ExtrasResult<ResultSet> {
        let mut pg = script.client();
        pg.cache_hit().await?;
        pg.bloat().await
    }

    let script = ScriptedConnector::new(MODERN_VERSION).rejecting("pg_stats");
    let err = cache_then_bloat(&script).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(script.closes(), 1);
}

#[tokio::test]
async fn test_report_after_close_fails_without_reconnecting() {
    let script = ScriptedConnector::new(MODERN_VERSION);
    let mut pg = script.client();
    pg.cache_hit().await.unwrap();
    pg.close();

    let err = pg.cache_hit().await.unwrap_err();
    assert_eq!(err, ExtrasError::Closed);
    assert_eq!(script.connects(), 1);
}

#[tokio::test]
async fn test_connection_failure_surfaces_as_connection_error() {
    let script = ScriptedConnector::new(MODERN_VERSION).failing_connect();
    let mut pg = script.client();

    let err = pg.total_table_size().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(!pg.is_connected());
    assert!(script.statements().is_empty());
}

#[tokio::test]
async fn test_query_error_carries_statement() {
    let script = ScriptedConnector::new(MODERN_VERSION).rejecting("pg_statio_user_indexes");
    let mut pg = script.client();

    match pg.cache_hit().await.unwrap_err() {
        ExtrasError::Query { sql, message } => {
            assert!(sql.starts_with("SELECT 'index hit rate' AS name,"));
            assert_eq!(message, "permission denied");
        }
        other => panic!("expected query error, got {:?}", other),
    }
    // The session survives a rejected statement.
    pg.seq_scans().await.unwrap();
    assert_eq!(script.connects(), 1);
}

#[tokio::test]
async fn test_report_dispatch_runs_every_report() {
    let script = ScriptedConnector::new(LEGACY_VERSION);
    let mut pg = script.client();

    for report in Report::ALL {
        pg.report(report, ReportOptions::default()).await.unwrap();
    }

    assert_eq!(script.connects(), 1);
    // 19 reports, one extension check and one memoized version lookup.
    assert_eq!(script.statements().len(), 21);
}
