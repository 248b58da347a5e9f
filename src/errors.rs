//! Top-level error of an engine run
//!
//! Every variant is fatal: a run that returns an error produced no records.
//! Recoverable conditions (a bad field, a dropped record, a skipped log)
//! are logged where they happen and never surface here.

use std::path::PathBuf;

use thiserror::Error;

use crate::acquisition::AcquisitionError;
use crate::hive::DecodeError;
use crate::linker::StructureError;
use crate::recovery::RecoveryError;

/// Result type for engine runs
pub type AmcacheResult<T> = Result<T, AmcacheError>;

#[derive(Debug, Error)]
pub enum AmcacheError {
    /// Store is locked and raw copy needs administrator rights
    #[error("'{}' is in use, rerun with administrator privileges", path.display())]
    Permission { path: PathBuf },

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error("failed to decode store: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl AmcacheError {
    /// Stable code for log output
    pub fn code(&self) -> &'static str {
        match self {
            AmcacheError::Permission { .. } => "AMCACHE_PERMISSION_DENIED",
            AmcacheError::Acquisition(err) => err.code(),
            AmcacheError::Recovery(err) => err.code().code(),
            AmcacheError::Decode(_) => "AMCACHE_DECODE_FAILED",
            AmcacheError::Structure(err) => err.code(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            AmcacheError::Recovery(err) => err.is_fatal(),
            _ => true,
        }
    }
}
