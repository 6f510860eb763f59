use serde::{Deserialize, Serialize};

/// Connection target, rendered into a libpq key/value connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub dbname: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Seconds to wait for the TCP connection (0 = driver default).
    #[serde(default)]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_application_name")]
    pub application_name: String,
}

fn default_application_name() -> String {
    "pgextras".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            dbname: "postgres".to_string(),
            password: None,
            connect_timeout_secs: 0,
            application_name: default_application_name(),
        }
    }
}

impl ConnectionConfig {
    /// `host=... port=... user=... dbname=...` with values quoted as needed.
    pub fn to_dsn(&self) -> String {
        let port = self.port.to_string();
        let mut parts: Vec<(&str, &str)> = vec![
            ("host", self.host.as_str()),
            ("port", port.as_str()),
            ("user", self.user.as_str()),
            ("dbname", self.dbname.as_str()),
        ];
        if let Some(password) = self.password.as_deref() {
            parts.push(("password", password));
        }
        let timeout = self.connect_timeout_secs.to_string();
        if self.connect_timeout_secs > 0 {
            parts.push(("connect_timeout", timeout.as_str()));
        }
        if !self.application_name.is_empty() {
            parts.push(("application_name", self.application_name.as_str()));
        }

        parts
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, quote_value(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Same as [`to_dsn`](Self::to_dsn) with the password masked, for logs.
    pub fn redacted(&self) -> String {
        let masked = Self {
            password: self.password.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        };
        masked.to_dsn()
    }
}

fn quote_value(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quoting {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
