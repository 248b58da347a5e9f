//! Raw-sector copy seam
//!
//! A raw copier reads file contents straight from the volume, which works
//! even when another process holds the file exclusively. It needs an
//! elevated process; the manager checks that before calling it.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures reported by a `RawCopier`
#[derive(Debug, Error)]
pub enum RawCopyError {
    /// Host has no raw volume access
    #[error("no raw copier configured, cannot copy locked file {}", path.display())]
    Unsupported { path: PathBuf },

    /// Copier returned no stream for a requested path
    #[error("no stream returned for {}", path.display())]
    MissingStream { path: PathBuf },

    #[error("raw copy of {} failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RawCopyError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// One copied file
pub struct RawCopyStream {
    /// Path that was requested
    pub input_filename: PathBuf,
    /// Contents of the file
    pub stream: Box<dyn Read>,
}

impl fmt::Debug for RawCopyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCopyStream")
            .field("input_filename", &self.input_filename)
            .finish_non_exhaustive()
    }
}

/// Copies files bypassing file locks
pub trait RawCopier {
    /// Copy every path, returning one stream per path in request order
    fn copy_files(&self, paths: &[PathBuf]) -> Result<Vec<RawCopyStream>, RawCopyError>;
}

/// Copier for hosts without raw volume access
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRawCopy;

impl RawCopier for NoRawCopy {
    fn copy_files(&self, paths: &[PathBuf]) -> Result<Vec<RawCopyStream>, RawCopyError> {
        let path = paths
            .first()
            .map(PathBuf::as_path)
            .unwrap_or(Path::new(""))
            .to_path_buf();
        Err(RawCopyError::Unsupported { path })
    }
}
