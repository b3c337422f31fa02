//! Error types for drey_core.

use thiserror::Error;

/// Result type alias using drey_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed input, rejected before any state was touched.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// No object stored under the given identity.
    #[error("Object not found: {identity}")]
    ObjectNotFound { identity: String },

    /// Stored bytes fail to decode, or decoded content does not match
    /// the identity it was stored under.
    #[error("Corrupt object: {reason}")]
    CorruptObject { reason: String },
}

impl Error {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create an ObjectNotFound error.
    pub fn object_not_found(identity: impl Into<String>) -> Self {
        Error::ObjectNotFound {
            identity: identity.into(),
        }
    }

    /// Create a CorruptObject error.
    pub fn corrupt_object(reason: impl Into<String>) -> Self {
        Error::CorruptObject {
            reason: reason.into(),
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
