//! Errors surfaced by the external hive reader

use thiserror::Error;

/// Result type for hive decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Failures reported while decoding a hive image into a key tree
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The image could not be decoded by the hive reader
    #[error("failed to decode hive '{name}': {reason}")]
    Malformed {
        /// Name of the image being decoded
        name: String,
        /// Reader-supplied reason
        reason: String,
    },

    /// The base block could not be parsed
    #[error("invalid base block: {0}")]
    InvalidBaseBlock(String),
}

impl DecodeError {
    /// Construct a reader failure for the named image
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
