//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection to server failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Protocol/framing error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Request timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Invalid command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Error response from the server.
    #[error("{0}")]
    Server(#[from] calgrid_protocol::ErrorResponse),

    /// Failure running the embedded daemon.
    #[error("daemon error: {0}")]
    Daemon(String),
}

impl ClientError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
