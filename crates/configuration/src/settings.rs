use serde::Deserialize;
use std::fmt;

use crate::error::ConfigError;

/// The root configuration structure for the persistence layer and its admin tooling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub retention: RetentionSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Checks the invariants the connection manager and retention sweep rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        if self.retention.raw_messages_days == 0 {
            return Err(ConfigError::ValidationError(
                "retention.raw_messages_days must be at least 1".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection target, credentials and pool sizing for PostgreSQL.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: SslMode,
    /// Upper bound on open connections. Callers beyond it queue.
    pub max_connections: u32,
    /// Connections the pool keeps open while idle.
    pub min_connections: u32,
    /// How long a caller waits for a free connection before giving up.
    pub acquire_timeout_secs: u64,
    /// A full connection URL. When present it replaces the discrete fields above.
    pub url: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "telemonitor".to_string(),
            user: "telemonitor_user".to_string(),
            password: String::new(),
            ssl_mode: SslMode::Disable,
            max_connections: 25,
            min_connections: 5,
            acquire_timeout_secs: 5,
            url: None,
        }
    }
}

impl DatabaseSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        match &self.url {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::ValidationError(
                    "database.url must not be empty when set".to_string(),
                ));
            }
            Some(_) => {}
            None => {
                if self.password.is_empty() {
                    return Err(ConfigError::ValidationError(
                        "database.password is required".to_string(),
                    ));
                }
                if self.host.trim().is_empty() || self.name.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "database.host and database.name are required".to_string(),
                    ));
                }
            }
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "database.acquire_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// TLS negotiation mode, spelled the way libpq spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

/// How long ingested messages are kept before the retention sweep removes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    pub raw_messages_days: u32,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self { raw_messages_days: 7 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stdout.
    pub directory: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
