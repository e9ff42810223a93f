//! Connection boundary traits and configuration.
//!
//! The persistence core does not speak any wire protocol itself. It consumes
//! a [`ConnectionProvider`] that hands out blocking [`Connection`]s, one per
//! store operation; pooling, retries, and transport are the provider's
//! concern. Connections are released by dropping them, which RAII guarantees
//! on every exit path.

use crate::Result;
use crate::row::Row;
use crate::value::Value;

/// Connection configuration for a relational store.
///
/// Supplied once at provider construction.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Hostname or IP address
    pub host: String,
    /// Port number (default: 5432)
    pub port: u16,
    /// Database name to connect to
    pub database: String,
    /// Username for authentication
    pub user: String,
    /// Password for authentication (optional for trust auth)
    pub password: Option<String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: String::new(),
            user: String::new(),
            password: None,
        }
    }
}

impl ConnectOptions {
    /// Create a new configuration from its required components.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            user: user.into(),
            ..Default::default()
        }
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Get the socket address string for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A blocking connection to the relational store.
///
/// Every call runs to completion on the caller's thread; there is no async
/// I/O and no background work.
pub trait Connection {
    /// Execute a query and return all result rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a statement (UPDATE and friends) and return rows affected.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;
}

/// Supplies connections to the store, one per operation.
pub trait ConnectionProvider {
    /// The connection type handed out by this provider.
    type Conn: Connection;

    /// Acquire a connection for a single operation's scope.
    fn acquire(&self) -> Result<Self::Conn>;
}
