use std::fmt;

use serde::Deserialize;

/// Connection settings for the Postgres handle.
///
/// Formats into a libpq-style key/value connection string:
/// ```rust
/// use pg_mapper::prelude::*;
///
/// let cfg = ConnectionConfig {
///     database: String::new(),
///     ..ConnectionConfig::default()
/// };
/// assert_eq!(cfg.to_string(), "user=postgres host=localhost port=5432 sslmode=disable");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub user: String,
    pub port: u16,
    pub host: String,
    pub password: String,
    /// When false the connection string pins `sslmode=disable`; when true the
    /// driver default applies.
    pub ssl: bool,
    pub database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            password: String::new(),
            ssl: false,
            database: "test".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Render the connection string handed to the driver.
    #[must_use]
    pub fn connection_string(&self) -> String {
        let mut fragments = vec![format!("user={}", self.user)];
        if !self.database.is_empty() {
            fragments.push(format!("dbname={}", self.database));
        }
        if !self.password.is_empty() {
            fragments.push(format!("password={}", self.password));
        }
        fragments.push(format!("host={}", self.host));
        fragments.push(format!("port={}", self.port));
        if !self.ssl {
            fragments.push("sslmode=disable".to_string());
        }
        fragments.join(" ")
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connection_string())
    }
}
