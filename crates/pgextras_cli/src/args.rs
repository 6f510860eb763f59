use clap::Parser;
use pgextras_client::{ConnectionConfig, Report, ReportOptions};

use crate::format::OutputMode;

/// pgextras — PostgreSQL diagnostic reports
#[derive(Debug, Parser)]
#[command(
    name = "pgextras",
    about = "Cache, index, lock, bloat and activity reports for a PostgreSQL server",
    version,
    disable_help_flag = true
)]
pub struct Args {
    /// Report to run (see --list)
    #[arg(value_name = "REPORT", value_parser = parse_report, required_unless_present = "list")]
    pub report: Option<Report>,

    /// Full connection string or URL; overrides the individual options below
    #[arg(long, env = "DATABASE_URL")]
    pub dsn: Option<String>,

    /// Database host
    #[arg(short = 'h', long, env = "PGHOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(short = 'p', long, env = "PGPORT", default_value_t = 5432)]
    pub port: u16,

    /// Database user
    #[arg(short = 'U', long, env = "PGUSER", default_value = "postgres")]
    pub user: String,

    /// Database name
    #[arg(short = 'd', long, env = "PGDATABASE", default_value = "postgres")]
    pub dbname: String,

    /// Password (use PGPASSWORD env var to keep it out of the process list)
    #[arg(short = 'W', long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds to wait for the connection (0 = no limit)
    #[arg(long, env = "PGCONNECT_TIMEOUT", default_value_t = 0)]
    pub connect_timeout: u64,

    /// List available reports and exit
    #[arg(long)]
    pub list: bool,

    /// Shorten query text to 40 characters (calls, outliers)
    #[arg(long)]
    pub truncate: bool,

    /// Tuples only — suppress headers and row counts
    #[arg(short = 't', long)]
    pub tuples_only: bool,

    /// Expanded (vertical) output mode
    #[arg(long)]
    pub expanded: bool,

    /// CSV output mode
    #[arg(long)]
    pub csv: bool,

    /// JSON output mode
    #[arg(long)]
    pub json: bool,

    /// Print how long the report took
    #[arg(long)]
    pub timing: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

fn parse_report(s: &str) -> Result<Report, String> {
    s.parse()
}

impl Args {
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            dbname: self.dbname.clone(),
            password: self.password.clone(),
            connect_timeout_secs: self.connect_timeout,
            ..ConnectionConfig::default()
        }
    }

    /// Connection string handed to the client: `--dsn` wins over the parts.
    pub fn dsn(&self) -> String {
        match self.dsn.as_deref() {
            Some(dsn) if !dsn.trim().is_empty() => dsn.to_string(),
            _ => self.connection_config().to_dsn(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            truncate: self.truncate,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.tuples_only {
            OutputMode::TuplesOnly
        } else if self.csv {
            OutputMode::Csv
        } else if self.json {
            OutputMode::Json
        } else if self.expanded {
            OutputMode::Expanded
        } else {
            OutputMode::Table
        }
    }
}
