#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
pub use pgextras_client::{
    Connector, ErrorKind, ExtrasError, ExtrasResult, PgExtras, Report, ReportOptions, ResultSet,
    Row, Session,
};

pub const LEGACY_VERSION: &str =
    "PostgreSQL 9.1.3 on x86_64-unknown-linux-gnu, compiled by gcc (Ubuntu 4.6.3) 4.6.3, 64-bit";
pub const MODERN_VERSION: &str =
    "PostgreSQL 12.4.0 on x86_64-pc-linux-gnu, compiled by gcc (GCC) 8.3.0, 64-bit";

/// Everything the fake server saw.
#[derive(Debug, Default)]
pub struct Journal {
    pub statements: Vec<String>,
    pub connects: usize,
    pub closes: usize,
}

/// Connector whose sessions answer from a fixed script and record every
/// statement they receive.
#[derive(Clone)]
pub struct ScriptedConnector {
    journal: Arc<Mutex<Journal>>,
    version: String,
    statement_stats: bool,
    fail_connect: bool,
    reject: Option<String>,
}

impl ScriptedConnector {
    pub fn new(version: &str) -> Self {
        Self {
            journal: Arc::new(Mutex::new(Journal::default())),
            version: version.to_string(),
            statement_stats: true,
            fail_connect: false,
            reject: None,
        }
    }

    pub fn without_statement_stats(mut self) -> Self {
        self.statement_stats = false;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Reject any statement containing `fragment` the way the server would.
    pub fn rejecting(mut self, fragment: &str) -> Self {
        self.reject = Some(fragment.to_string());
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.journal.lock().unwrap().statements.clone()
    }

    pub fn connects(&self) -> usize {
        self.journal.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.journal.lock().unwrap().closes
    }

    pub fn count_matching(&self, fragment: &str) -> usize {
        self.statements()
            .iter()
            .filter(|s| s.contains(fragment))
            .count()
    }

    pub fn last_statement(&self) -> String {
        self.statements().last().cloned().unwrap_or_default()
    }

    /// Client wired to this connector; the connector stays usable for
    /// assertions.
    pub fn client(&self) -> PgExtras {
        PgExtras::with_connector("host=fake dbname=diag", self.clone())
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _dsn: &str) -> ExtrasResult<Box<dyn Session>> {
        if self.fail_connect {
            return Err(ExtrasError::Connection(
                "connection refused (os error 111)".to_string(),
            ));
        }
        self.journal.lock().unwrap().connects += 1;
        Ok(Box::new(ScriptedSession {
            script: self.clone(),
            open: true,
        }))
    }
}

fn single_row<const N: usize>(pairs: [(&str, Option<&str>); N]) -> ResultSet {
    ResultSet::from_rows(vec![Row::from_pairs(pairs)])
}

struct ScriptedSession {
    script: ScriptedConnector,
    open: bool,
}

#[async_trait]
impl Session for ScriptedSession {
    async fn simple_query(&mut self, sql: &str) -> ExtrasResult<ResultSet> {
        self.script
            .journal
            .lock()
            .unwrap()
            .statements
            .push(sql.to_string());

        if let Some(fragment) = &self.script.reject {
            if sql.contains(fragment.as_str()) {
                return Err(ExtrasError::query(sql, "permission denied"));
            }
        }

        if sql.contains("FROM pg_extension") {
            let available = if self.script.statement_stats { "t" } else { "f" };
            return Ok(single_row([("available", Some(available))]));
        }
        if sql == "SELECT version()" {
            return Ok(single_row([("version", Some(self.script.version.as_str()))]));
        }
        Ok(single_row([("statement", Some(sql))]))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.script.journal.lock().unwrap().closes += 1;
        }
    }
}
