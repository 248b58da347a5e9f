//! Direct (lock-respecting) store reads

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Result of a direct read attempt
#[derive(Debug)]
pub enum DirectRead {
    /// The whole file was read
    Read(Vec<u8>),
    /// Another process holds the file open exclusively
    InUse(io::Error),
}

/// Reads a store through normal file access
pub trait StoreOpener {
    /// Read the whole file at `path`.
    ///
    /// Lock conflicts come back as `DirectRead::InUse`; any other failure is
    /// an `Err`.
    fn open_direct(&self, path: &Path) -> io::Result<DirectRead>;
}

/// `StoreOpener` over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl StoreOpener for FsOpener {
    fn open_direct(&self, path: &Path) -> io::Result<DirectRead> {
        let read = File::open(path).and_then(|mut file| {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        match read {
            Ok(bytes) => Ok(DirectRead::Read(bytes)),
            Err(e) if is_lock_conflict(&e) => Ok(DirectRead::InUse(e)),
            Err(e) => Err(e),
        }
    }
}

/// Sharing and lock violations mean another process has the file open
#[cfg(windows)]
pub fn is_lock_conflict(err: &io::Error) -> bool {
    use windows::Win32::Foundation::{ERROR_LOCK_VIOLATION, ERROR_SHARING_VIOLATION};

    matches!(
        err.raw_os_error(),
        Some(code) if code == ERROR_SHARING_VIOLATION.0 as i32 || code == ERROR_LOCK_VIOLATION.0 as i32
    )
}

/// Exclusive opens only exist on Windows
#[cfg(not(windows))]
pub fn is_lock_conflict(_err: &io::Error) -> bool {
    false
}
