//! Error types for ormlet operations.

use std::fmt;

/// The primary error type for all ormlet operations.
#[derive(Debug)]
pub enum Error {
    /// Entity type is missing required table/column declarations
    Metadata(MetadataError),
    /// A lookup by id resolved to zero rows
    NotFound(NotFoundError),
    /// Acquiring or using a store connection failed
    Connection(ConnectionError),
    /// Statement execution errors reported by the store
    Query(QueryError),
    /// Row decoding / type conversion errors
    Type(TypeError),
    /// One or more per-entity UPDATE failures during session close
    Flush(FlushError),
    /// Operation invoked on a closed session
    State(StateError),
}

/// Entity metadata is incomplete for the requested operation.
///
/// Surfaced at `find` time, not at registration: a type with no table mapping
/// is a configuration error only once something tries to query it.
#[derive(Debug)]
pub struct MetadataError {
    /// Entity type name as declared in its descriptor.
    pub entity: &'static str,
    pub message: String,
}

impl MetadataError {
    /// The queried type declares no table mapping.
    pub fn missing_table(entity: &'static str) -> Self {
        Self {
            entity,
            message: format!("entity '{entity}' declares no table mapping"),
        }
    }

    /// The entity carries no identifier value where one is required.
    pub fn missing_identifier(entity: &'static str) -> Self {
        Self {
            entity,
            message: format!("entity '{entity}' has no identifier value"),
        }
    }
}

/// `find` resolved to zero rows.
#[derive(Debug)]
pub struct NotFoundError {
    /// Table the SELECT ran against.
    pub table: String,
    /// The id that was looked up.
    pub id: i64,
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to acquire a connection from the provider
    Acquire,
    /// Authentication failed
    Authentication,
    /// Connection lost during an operation
    Disconnected,
    /// Connection refused
    Refused,
}

impl ConnectionError {
    pub fn acquire(message: impl Into<String>) -> Self {
        Self {
            kind: ConnectionErrorKind::Acquire,
            message: message.into(),
            source: None,
        }
    }
}

#[derive(Debug)]
pub struct QueryError {
    /// The statement that failed, when known.
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sql: None,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the statement text that produced the failure.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

/// Aggregate of per-entity UPDATE failures collected during `close`.
///
/// One entity's failure never aborts the flush of the others; everything that
/// went wrong is reported together after the session has cleared its state.
#[derive(Debug)]
pub struct FlushError {
    pub failures: Vec<FlushFailure>,
}

/// A single entity whose UPDATE failed during flush.
#[derive(Debug)]
pub struct FlushFailure {
    pub table: &'static str,
    pub id: i64,
    pub source: Box<Error>,
}

#[derive(Debug)]
pub struct StateError {
    pub operation: &'static str,
}

impl StateError {
    pub fn closed(operation: &'static str) -> Self {
        Self { operation }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Metadata(e) => write!(f, "Metadata error: {}", e.message),
            Error::NotFound(e) => {
                write!(f, "No row in '{}' with id = {}", e.table, e.id)
            }
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => {
                if let Some(sql) = &e.sql {
                    write!(f, "Query error: {} (statement: {})", e.message, sql)
                } else {
                    write!(f, "Query error: {}", e.message)
                }
            }
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Flush(e) => {
                writeln!(f, "Flush failed for {} entities:", e.failures.len())?;
                for failure in &e.failures {
                    writeln!(
                        f,
                        "  - {} id = {}: {}",
                        failure.table, failure.id, failure.source
                    )?;
                }
                Ok(())
            }
            Error::State(e) => {
                write!(f, "Session is closed; '{}' is not permitted", e.operation)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<MetadataError> for Error {
    fn from(err: MetadataError) -> Self {
        Error::Metadata(err)
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Error::NotFound(err)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<FlushError> for Error {
    fn from(err: FlushError) -> Self {
        Error::Flush(err)
    }
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        Error::State(err)
    }
}

/// Result type alias for ormlet operations.
pub type Result<T> = std::result::Result<T, Error>;
