//! Error types for saorsa-nfs.

use thiserror::Error;

use crate::nfs_protocol::{ErrorCode, ProtocolError, RoutingError};
use crate::version_tree::VersionTreeError;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in saorsa-nfs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport error.
    #[error("network error: {0}")]
    Network(String),

    /// A message could not be encoded, or a response could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Version tree operation failed.
    #[error("version tree error: {0}")]
    VersionTree(#[from] VersionTreeError),

    /// A peer reported a failure, or the operation timed out or was cancelled.
    #[error("{0}")]
    Code(#[from] ErrorCode),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the operation timed out before a response arrived.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Code(ErrorCode::Routing(RoutingError::TimedOut)))
    }

    /// Whether the operation was cancelled before a response arrived.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Code(ErrorCode::Routing(RoutingError::TimerCancelled))
        )
    }

    /// The domain error code carried by this error, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Code(code) => Some(*code),
            Self::VersionTree(error) => Some(error.to_error_code()),
            _ => None,
        }
    }
}
