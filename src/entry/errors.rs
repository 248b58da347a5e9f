//! Record build errors
//!
//! A build error drops the whole record. Field-level problems never end up
//! here; they are `FieldDecodeError`s and leave the record in place.

use thiserror::Error;

/// Result type for entity construction
pub type BuildResult<T> = Result<T, RecordBuildError>;

/// A structurally malformed record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordBuildError {
    /// The hive reader produced no last write time for a key the entity needs
    #[error("key {key_path} has no last write time")]
    MissingLastWriteTime { key_path: String },

    /// The key name the entity is identified by is empty
    #[error("key {key_path} has an empty name")]
    EmptyKeyName { key_path: String },
}

impl RecordBuildError {
    /// Stable code for log output
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingLastWriteTime { .. } => "AMCACHE_RECORD_NO_LAST_WRITE",
            Self::EmptyKeyName { .. } => "AMCACHE_RECORD_EMPTY_KEY_NAME",
        }
    }
}
