//! Connection configuration
//!
//! `ConnectionConfig` is an explicit value passed to the SQL Server backend.
//! Environment variables are read only by [`ConnectionConfig::from_env`],
//! which the CLI calls at its boundary.

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default SQL Server port
pub const DEFAULT_PORT: u16 = 1433;

/// Default client driver name
pub const DEFAULT_DRIVER: &str = "ODBC Driver 17 for SQL Server";

// ============================================================================
// Environment Variables
// ============================================================================

/// Server address (`host`, `host,port` or `host\instance`)
pub const ENV_SERVER: &str = "SQL_SERVER";
/// Database name
pub const ENV_DATABASE: &str = "SQL_DB";
/// Login for the user/password fallback
pub const ENV_USER: &str = "SQL_UID";
/// Password for the user/password fallback
pub const ENV_PASSWORD: &str = "SQL_PWD";
/// Driver name
pub const ENV_DRIVER: &str = "SQL_DRIVER";
/// TCP port
pub const ENV_PORT: &str = "SQL_PORT";

/// SQL Server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server address
    #[serde(default = "default_server")]
    pub server: String,

    /// TCP port, overridden by a `host,port` server address
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database to open
    #[serde(default)]
    pub database: Option<String>,

    /// Login for the user/password fallback
    #[serde(default)]
    pub user: Option<String>,

    /// Password for the user/password fallback
    #[serde(default)]
    pub password: Option<String>,

    /// Driver name, reported to the server as the application name
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Accept the server certificate without validation
    #[serde(default = "default_trust_cert")]
    pub trust_cert: bool,
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_trust_cert() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: DEFAULT_PORT,
            database: None,
            user: None,
            password: None,
            driver: default_driver(),
            trust_cert: true,
        }
    }
}

/// Where to connect, split out of the server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub instance: Option<String>,
}

impl ConnectionConfig {
    /// Create a config for a server with all other settings defaulted
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Set the database
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the user/password credentials
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Build a config from the `SQL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (environment, maps in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(server) = lookup(ENV_SERVER) {
            config.server = server;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port.trim().parse().map_err(|_| Error::InvalidArgument {
                message: format!("{ENV_PORT} must be a port number, got '{port}'"),
            })?;
        }
        if let Some(driver) = lookup(ENV_DRIVER) {
            config.driver = driver;
        }
        config.database = lookup(ENV_DATABASE);
        config.user = lookup(ENV_USER);
        config.password = lookup(ENV_PASSWORD);
        Ok(config)
    }

    /// Split the server address into host, port and instance
    pub fn endpoint(&self) -> Result<Endpoint> {
        let server = self.server.trim();
        let server = server.strip_prefix("tcp:").unwrap_or(server);
        if server.is_empty() {
            return Err(Error::missing_field("server"));
        }

        let (address, port) = match server.split_once(',') {
            Some((address, port)) => {
                let port = port.trim().parse().map_err(|_| {
                    Error::config(format!("Invalid port in server address '{}'", self.server))
                })?;
                (address, port)
            }
            None => (server, self.port),
        };

        let (host, instance) = match address.split_once('\\') {
            Some((host, instance)) => (host, Some(instance.to_string())),
            None => (address, None),
        };

        Ok(Endpoint {
            host: host.to_string(),
            port,
            instance,
        })
    }

    /// Summary for logs with the password masked
    pub fn describe(&self) -> String {
        let database = self.database.as_deref().unwrap_or("<default>");
        let user = self.user.as_deref().unwrap_or("<none>");
        let password = if self.password.is_some() { "****" } else { "<none>" };
        format!(
            "server={} database={} user={} password={} driver={}",
            self.server, database, user, password, self.driver
        )
    }
}

/// Load a connection config from a YAML (or JSON) file
pub fn load_config(path: impl AsRef<Path>) -> Result<ConnectionConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid connection config {}", path.display()))
}
