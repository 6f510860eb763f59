mod args;
mod format;
mod pager;
mod runner;
mod timing;

use anyhow::Result;
use args::Args;
use clap::Parser;
use pgextras_client::{ErrorKind, ExtrasError, PgExtras};
use runner::{list_reports, run_report};
use std::process;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("pgextras: error: {:#}", e);
            exit_code(&e)
        }
    };
    process::exit(code);
}

async fn run() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list {
        print!("{}", list_reports());
        return Ok(());
    }
    let Some(report) = args.report else {
        anyhow::bail!("no report given (see --list)");
    };

    if args.dsn.is_none() {
        debug!("Target: {}", args.connection_config().redacted());
    }
    let mut client = PgExtras::new(args.dsn());

    run_report(
        &mut client,
        report,
        args.report_options(),
        args.output_mode(),
        args.timing,
    )
    .await?;

    client.close();
    Ok(())
}

/// 1 for client-side and connection failures, 3 when the server could not
/// produce the report.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ExtrasError>().map(ExtrasError::kind) {
        Some(ErrorKind::Query) | Some(ErrorKind::Environment) | Some(ErrorKind::Parse) => 3,
        _ => 1,
    }
}
