//! Error handling for the hash array.
//!
//! The AVL tree is total over its key type and never fails; only hashing and
//! table configuration can.

use thiserror::Error;

/// Errors raised by [`HashArray`](crate::HashArray) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configured hash strategy could not hash the key.
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Why the strategy rejected the key
        reason: String,
    },

    /// Table configuration rejected at construction time.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// The offending parameter
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidKey`].
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidConfiguration`].
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Result type for hash array operations.
pub type Result<T> = std::result::Result<T, Error>;
