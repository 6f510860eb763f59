use std::time::Instant;

use anyhow::{Context, Result};
use pgextras_client::{PgExtras, Report, ReportOptions};
use tracing::debug;

use crate::format::{format_rows, OutputMode};
use crate::pager;
use crate::timing::format_elapsed;

/// Run one report and return its rendered output.
pub async fn render_report(
    client: &mut PgExtras,
    report: Report,
    opts: ReportOptions,
    mode: OutputMode,
) -> Result<String> {
    debug!("render_report: {} {:?}", report, opts);

    let rows = client
        .report(report, opts)
        .await
        .with_context(|| format!("report '{}' failed", report))?;

    Ok(format_rows(&rows, mode))
}

/// Run one report and print it, through the pager for interactive modes.
pub async fn run_report(
    client: &mut PgExtras,
    report: Report,
    opts: ReportOptions,
    mode: OutputMode,
    timing: bool,
) -> Result<()> {
    let started = timing.then(Instant::now);
    let output = render_report(client, report, opts, mode).await?;

    pager::emit(&output, !mode.is_scriptable()).context("writing report output")?;

    if let Some(started) = started {
        let line = format!("{}\n", format_elapsed(started.elapsed()));
        pager::emit(&line, false).context("writing report output")?;
    }
    Ok(())
}

/// The report catalogue for `--list`. Reports whose SQL adapts to the
/// server version are marked with `*`.
pub fn list_reports() -> String {
    let width = Report::ALL
        .iter()
        .map(|r| r.name().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for report in Report::ALL {
        let note = if report.needs_statement_stats() {
            " (requires pg_stat_statements)"
        } else {
            ""
        };
        let marker = if report.needs_server_version() { '*' } else { ' ' };
        out.push_str(&format!(
            " {}{:<width$}  {}{}\n",
            marker,
            report.name(),
            report.description(),
            note,
            width = width
        ));
    }
    out.push_str("\n * adapts its SQL to the server version\n");
    out
}
