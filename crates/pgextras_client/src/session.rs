use std::sync::Arc;

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use crate::error::{ExtrasError, ExtrasResult};
use crate::row::{ResultSet, Row};

/// A live session that can run plain SQL text.
#[async_trait]
pub trait Session: Send {
    /// Run SQL text over the simple-query protocol and collect its rows.
    ///
    /// When the text holds several statements, the result set of the last
    /// one that returned rows wins, as with libpq's `PQexec`.
    async fn simple_query(&mut self, sql: &str) -> ExtrasResult<ResultSet>;

    /// Release the session. Must be safe to call more than once.
    fn close(&mut self);
}

/// Opens sessions from a connection string.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, dsn: &str) -> ExtrasResult<Box<dyn Session>>;
}

/// `tokio-postgres` backed connector (no TLS).
#[derive(Debug, Default, Clone, Copy)]
pub struct PgConnector;

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self, dsn: &str) -> ExtrasResult<Box<dyn Session>> {
        debug!("Connecting to PostgreSQL");

        let (client, connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(|e| ExtrasError::Connection(e.to_string()))?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("Connection error: {}", e);
            }
        });

        Ok(Box::new(PgSession {
            client: Some(client),
        }))
    }
}

/// Session over a single `tokio_postgres::Client`.
pub struct PgSession {
    client: Option<Client>,
}

#[async_trait]
impl Session for PgSession {
    async fn simple_query(&mut self, sql: &str) -> ExtrasResult<ResultSet> {
        let client = self.client.as_ref().ok_or(ExtrasError::Closed)?;

        let messages = client.simple_query(sql).await.map_err(|e| {
            if e.is_closed() {
                ExtrasError::Connection(e.to_string())
            } else {
                let message = e
                    .as_db_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| e.to_string());
                ExtrasError::query(sql, message)
            }
        })?;

        let mut builder = ResultSetBuilder::default();
        for msg in messages {
            match msg {
                SimpleQueryMessage::RowDescription(columns) => {
                    builder.describe(columns.iter().map(|c| c.name().to_string()).collect());
                }
                SimpleQueryMessage::Row(r) => {
                    let values = (0..r.len())
                        .map(|i| r.try_get(i).ok().flatten().map(str::to_string))
                        .collect();
                    builder.push(values, || {
                        r.columns().iter().map(|c| c.name().to_string()).collect()
                    });
                }
                SimpleQueryMessage::CommandComplete(n) => {
                    debug!("Statement complete: {} rows", n);
                    builder.complete();
                }
                _ => {}
            }
        }

        Ok(builder.finish())
    }

    fn close(&mut self) {
        // Dropping the client ends the driver task.
        if self.client.take().is_some() {
            debug!("PostgreSQL session released");
        }
    }
}

/// Accumulates simple-query messages into the last described result set.
#[derive(Debug, Default)]
struct ResultSetBuilder {
    columns: Option<Arc<[String]>>,
    rows: Vec<Row>,
    complete: bool,
}

impl ResultSetBuilder {
    /// A row description opens a new result set.
    fn describe(&mut self, columns: Vec<String>) {
        self.columns = Some(columns.into());
        self.rows.clear();
        self.complete = false;
    }

    /// Rows without a preceding description name their own columns.
    fn push(&mut self, values: Vec<Option<String>>, names: impl FnOnce() -> Vec<String>) {
        if self.complete || self.columns.is_none() {
            self.describe(names());
        }
        if let Some(columns) = &self.columns {
            self.rows.push(Row::new(Arc::clone(columns), values));
        }
    }

    fn complete(&mut self) {
        self.complete = true;
    }

    fn finish(self) -> ResultSet {
        let columns = self.columns.unwrap_or_else(|| Vec::new().into());
        ResultSet::new(columns, self.rows)
    }
}
