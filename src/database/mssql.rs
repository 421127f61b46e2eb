//! SQL Server execution backend
//!
//! Wraps one tiberius client and a current-thread tokio runtime behind the
//! blocking [`SqlExecutor`] interface. Calls must not come from inside
//! another tokio runtime.

use super::convert::rows_to_batch;
use super::{name_between, SqlExecutor};
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::sql::Dialect;
use arrow::record_batch::RecordBatch;
use tiberius::{AuthMethod, Client, Column, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

type MssqlClient = Client<Compat<TcpStream>>;

/// Server error raised by `CREATE` when the object name is taken
const ERR_OBJECT_EXISTS: u32 = 2714;

/// How a connection attempt authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Integrated (trusted) credentials of the running process
    Integrated,
    /// Explicit user and password
    SqlServer,
}

/// Result of one connection attempt
pub enum ConnectOutcome {
    /// Logged in
    Connected(MssqlClient),
    /// Reached the server but the credentials were refused
    AuthFailed(String),
    /// Could not reach the server at all
    Unreachable(String),
}

impl std::fmt::Debug for ConnectOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectOutcome::Connected(_) => f.write_str("Connected"),
            ConnectOutcome::AuthFailed(reason) => write!(f, "AuthFailed({reason})"),
            ConnectOutcome::Unreachable(reason) => write!(f, "Unreachable({reason})"),
        }
    }
}

/// Execution backend over a SQL Server connection
#[derive(Debug)]
pub struct SqlServerExecutor {
    runtime: Runtime,
    client: MssqlClient,
    auth: AuthMode,
}

impl SqlServerExecutor {
    /// Connect, trying integrated credentials first and user/password once
    ///
    /// Only a refused login triggers the fallback; an unreachable server is
    /// reported straight away. The session is probed with `SELECT 1`.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        tracing::info!("Connecting to SQL Server ({})", config.describe());

        let (client, auth) = match runtime.block_on(attempt(config, AuthMode::Integrated))? {
            ConnectOutcome::Connected(client) => (client, AuthMode::Integrated),
            ConnectOutcome::AuthFailed(reason) => {
                tracing::warn!(
                    "Trusted connection refused ({reason}), retrying with user/password"
                );
                match runtime.block_on(attempt(config, AuthMode::SqlServer))? {
                    ConnectOutcome::Connected(client) => (client, AuthMode::SqlServer),
                    ConnectOutcome::AuthFailed(message) => {
                        return Err(Error::AuthFailed { message })
                    }
                    ConnectOutcome::Unreachable(message) => {
                        return Err(Error::Unreachable { message })
                    }
                }
            }
            ConnectOutcome::Unreachable(message) => return Err(Error::Unreachable { message }),
        };

        let mut executor = Self {
            runtime,
            client,
            auth,
        };
        executor.execute("SELECT 1")?;
        tracing::info!("Connected to SQL Server using {:?} authentication", auth);
        Ok(executor)
    }

    /// Authentication mode the session ended up using
    pub fn auth_mode(&self) -> AuthMode {
        self.auth
    }
}

impl SqlExecutor for SqlServerExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        tracing::debug!("Executing statement: {}", sql);
        let client = &mut self.client;
        self.runtime
            .block_on(async {
                // drain every result set of the batch
                client.simple_query(sql).await?.into_results().await?;
                Ok::<_, tiberius::error::Error>(())
            })
            .map_err(classify_error)
    }

    fn query(&mut self, sql: &str) -> Result<RecordBatch> {
        tracing::debug!("Executing query: {}", sql);
        let client = &mut self.client;
        let (columns, rows) = self
            .runtime
            .block_on(async {
                let mut stream = client.simple_query(sql).await?;
                let columns: Vec<Column> = stream
                    .columns()
                    .await?
                    .map(<[Column]>::to_vec)
                    .unwrap_or_default();
                let rows = stream.into_first_result().await?;
                Ok::<_, tiberius::error::Error>((columns, rows))
            })
            .map_err(classify_error)?;
        rows_to_batch(&columns, rows)
    }
}

/// One connection attempt; configuration problems are errors, not outcomes
async fn attempt(config: &ConnectionConfig, mode: AuthMode) -> Result<ConnectOutcome> {
    let tib_config = match build_config(config, mode) {
        Ok(tib_config) => tib_config,
        Err(Error::AuthFailed { message }) => return Ok(ConnectOutcome::AuthFailed(message)),
        Err(e) => return Err(e),
    };

    let tcp = match TcpStream::connect_named(&tib_config).await {
        Ok(tcp) => tcp,
        Err(e) => {
            return Ok(ConnectOutcome::Unreachable(format!(
                "Failed to connect to {}: {e}",
                config.server
            )))
        }
    };
    tcp.set_nodelay(true).ok();

    match Client::connect(tib_config, tcp.compat_write()).await {
        Ok(client) => Ok(ConnectOutcome::Connected(client)),
        Err(tiberius::error::Error::Server(token)) => {
            Ok(ConnectOutcome::AuthFailed(format!("{} ({})", token.message(), token.code())))
        }
        Err(e) => Ok(ConnectOutcome::Unreachable(e.to_string())),
    }
}

/// Build a tiberius Config for one authentication mode
fn build_config(config: &ConnectionConfig, mode: AuthMode) -> Result<Config> {
    let endpoint = config.endpoint()?;
    let mut tib_config = Config::new();
    tib_config.host(&endpoint.host);
    tib_config.port(endpoint.port);
    if let Some(instance) = &endpoint.instance {
        tib_config.instance_name(instance);
    }
    if let Some(database) = config.database.as_deref().filter(|db| !db.is_empty()) {
        tib_config.database(database);
    }
    tib_config.application_name(&config.driver);
    if config.trust_cert {
        tib_config.trust_cert();
    }

    match mode {
        AuthMode::Integrated => integrated_auth(&mut tib_config)?,
        AuthMode::SqlServer => {
            let user = config
                .user
                .as_deref()
                .ok_or_else(|| Error::missing_field("user"))?;
            let password = config.password.as_deref().unwrap_or_default();
            tib_config.authentication(AuthMethod::sql_server(user, password));
        }
    }
    Ok(tib_config)
}

#[cfg(windows)]
fn integrated_auth(tib_config: &mut Config) -> Result<()> {
    tib_config.authentication(AuthMethod::Integrated);
    Ok(())
}

#[cfg(not(windows))]
fn integrated_auth(_tib_config: &mut Config) -> Result<()> {
    Err(Error::AuthFailed {
        message: "integrated authentication is only available on Windows".to_string(),
    })
}

/// Map tiberius failures onto crate errors, singling out existing objects
fn classify_error(err: tiberius::error::Error) -> Error {
    if let tiberius::error::Error::Server(token) = &err {
        if token.code() == ERR_OBJECT_EXISTS {
            let table = name_between(token.message(), "named '", "'").unwrap_or(token.message());
            return Error::table_exists(table);
        }
    }
    Error::SqlServer(err)
}
