//! Error types for fluent-orm.
//!
//! Driver and store failures are carried unchanged (`#[error(transparent)]`);
//! the helpers below only inspect them. Caller mistakes that can be detected
//! before any SQL is sent get their own variants.

use crate::models::ConnectionConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Config(#[from] ConnectionConfigError),

    /// Connection acquisition or statement execution failure.
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    #[error(transparent)]
    KeyValue(#[from] redis::RedisError),

    /// The key-value store answered, but with an empty or falsy reply.
    #[error("Key-value {operation} rejected for key '{key}'")]
    KeyValueRejected { operation: String, key: String },

    #[error("Invalid statement: {message}")]
    InvalidStatement { message: String },

    #[error("Connection not found: {name}")]
    ConnectionNotFound { name: String },
}

impl DbError {
    /// Create an invalid statement error.
    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::InvalidStatement {
            message: message.into(),
        }
    }

    /// Create a key-value rejection error.
    pub fn key_value_rejected(operation: impl Into<String>, key: impl Into<String>) -> Self {
        Self::KeyValueRejected {
            operation: operation.into(),
            key: key.into(),
        }
    }

    /// Create a connection not found error.
    pub fn connection_not_found(name: impl Into<String>) -> Self {
        Self::ConnectionNotFound { name: name.into() }
    }

    /// SQLSTATE reported by the server, if the driver error carries one.
    pub fn sql_state(&self) -> Option<String> {
        match self {
            Self::Driver(sqlx::Error::Database(db_err)) => db_err.code().map(|c| c.to_string()),
            _ => None,
        }
    }

    /// Get a hint for resolving this error, if one is known.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Check the backend type and connection URL format"),
            Self::Driver(err) => match err {
                sqlx::Error::Configuration(_) => {
                    Some("Check the connection string format and credentials")
                }
                sqlx::Error::Database(_) => Some("Check the SQL syntax and referenced objects"),
                sqlx::Error::PoolTimedOut => {
                    Some("Increase connection_limit or acquire_timeout, or release connections sooner")
                }
                sqlx::Error::PoolClosed => Some("Reconnect to the database"),
                sqlx::Error::Io(_) => Some("Check network connectivity and database server status"),
                sqlx::Error::Tls(_) => Some("Verify TLS configuration and certificates"),
                _ => None,
            },
            Self::KeyValue(_) => Some("Check that the key-value server is running and reachable"),
            Self::InvalidStatement { .. } => Some("Add the missing clause before calling finish()"),
            Self::ConnectionNotFound { .. } => {
                Some("Call authenticate() for this name before looking it up")
            }
            Self::KeyValueRejected { .. } => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Driver(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed
            ),
            Self::KeyValue(err) => err.is_timeout() || err.is_connection_dropped(),
            _ => false,
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
