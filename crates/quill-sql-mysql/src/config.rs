//! Connection configuration.

use serde::{Deserialize, Serialize};

/// MySQL connection settings.
///
/// Deserializes from any serde format; missing keys take the defaults below.
///
/// ```rust
/// use quill_sql_mysql::MysqlConfig;
///
/// let config = MysqlConfig {
///     database: "blog".into(),
///     hostport: Some(3307),
///     ..MysqlConfig::default()
/// };
/// assert_eq!(
///     config.dsn(),
///     "mysql:host=127.0.0.1;port=3307;dbname=blog;charset=utf8mb4"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlConfig {
    /// Server host name.
    pub hostname: String,
    /// Server port; the driver default when unset.
    pub hostport: Option<u16>,
    /// Unix socket path; takes precedence over host and port.
    pub socket: Option<String>,
    /// Database (schema) name.
    pub database: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Connection character set.
    pub charset: Option<String>,
    /// Validate column keys against the table schema.
    pub strict_fields: bool,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            hostname: String::from("127.0.0.1"),
            hostport: None,
            socket: None,
            database: String::new(),
            username: String::from("root"),
            password: String::new(),
            charset: Some(String::from("utf8mb4")),
            strict_fields: false,
        }
    }
}

impl MysqlConfig {
    /// Returns a PDO-style DSN such as `mysql:host=h;port=p;dbname=d;charset=c`.
    #[must_use]
    pub fn dsn(&self) -> String {
        let mut dsn = match (&self.socket, self.hostport) {
            (Some(socket), _) if !socket.is_empty() => format!("mysql:unix_socket={socket}"),
            (_, Some(port)) => format!("mysql:host={};port={port}", self.hostname),
            _ => format!("mysql:host={}", self.hostname),
        };
        dsn.push_str(";dbname=");
        dsn.push_str(&self.database);
        if let Some(charset) = self.charset.as_deref().filter(|c| !c.is_empty()) {
            dsn.push_str(";charset=");
            dsn.push_str(charset);
        }
        dsn
    }

    /// Returns a `mysql://` connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = format!("mysql://{}", encode(&self.username));
        if !self.password.is_empty() {
            url.push(':');
            url.push_str(&encode(&self.password));
        }
        url.push('@');
        url.push_str(&self.hostname);
        if let Some(port) = self.hostport {
            url.push_str(&format!(":{port}"));
        }
        url.push('/');
        url.push_str(&encode(&self.database));

        let mut query = vec![];
        if let Some(socket) = self.socket.as_deref().filter(|s| !s.is_empty()) {
            query.push(format!("socket={}", encode(socket)));
        }
        if let Some(charset) = self.charset.as_deref().filter(|c| !c.is_empty()) {
            query.push(format!("charset={charset}"));
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }
}

/// Percent-encodes everything outside the URL unreserved set.
fn encode(component: &str) -> String {
    component
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                char::from(b).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
