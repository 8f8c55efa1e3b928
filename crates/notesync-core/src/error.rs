//! Error types for notesync-core

use thiserror::Error;

/// Result type alias using notesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote document store rejected the request
    #[error("Remote store error ({status}): {message}")]
    Remote {
        /// HTTP status returned by the remote store
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Batch write exceeded the remote store's per-batch cap
    #[error("Cannot write more than {max} notes in one batch (got {size})")]
    BatchLimit {
        /// Number of notes in the rejected batch
        size: usize,
        /// Maximum batch size accepted
        max: usize,
    },

    /// A store was used without the configuration it requires
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Fault raised on purpose by a test double
    #[error("{0}")]
    Forced(String),
}

impl Error {
    /// Whether this error means the remote store could not be reached at all.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(error) => error.is_connect() || error.is_timeout() || error.is_request(),
            Self::Io(error) => matches!(
                error.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// HTTP status code attached to this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Http(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
