//! Acquisition errors
//!
//! All acquisition errors are fatal: the scan never starts. A locked store
//! without elevation is not an error at this level; it is reported as
//! `AcquireOutcome::NeedsElevation`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::raw_copy::RawCopyError;

/// Result type for acquisition
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Failures while obtaining a store snapshot
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Store or a sibling log could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The raw copier failed or returned nothing for the store
    #[error("raw copy failed: {0}")]
    RawCopy(#[from] RawCopyError),
}

impl AcquisitionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable code for log output
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "AMCACHE_ACQUISITION_IO_ERROR",
            Self::RawCopy(_) => "AMCACHE_RAW_COPY_FAILED",
        }
    }
}
