//! Store acquisition with raw-copy fallback

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::observability::Event;
use crate::recovery::TransactionLogFileInfo;

use super::errors::{AcquisitionError, AcquisitionResult};
use super::logs::discover_sibling_logs;
use super::opener::{DirectRead, FsOpener, StoreOpener};
use super::privilege::{PrivilegeProbe, ProcessElevation};
use super::raw_copy::{NoRawCopy, RawCopier, RawCopyError};

/// In-memory snapshot of a store
#[derive(Debug, Clone)]
pub struct AcquiredStore {
    /// Path the store was read from
    pub path: PathBuf,
    /// Primary store bytes
    pub image: Vec<u8>,
    /// Log contents copied alongside the store.
    ///
    /// `Some` only after a raw copy; recovery then uses these instead of
    /// looking for logs on disk.
    pub side_logs: Option<Vec<TransactionLogFileInfo>>,
}

impl AcquiredStore {
    pub fn new(path: impl Into<PathBuf>, image: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            image,
            side_logs: None,
        }
    }

    /// File name of the store, used as the hive name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// How acquisition went
#[derive(Debug)]
pub enum AcquireOutcome {
    /// Direct read succeeded
    Opened(AcquiredStore),
    /// Store is locked and the process cannot raw-copy it
    NeedsElevation { path: PathBuf },
    /// Store was locked and was copied raw along with its logs
    ElevatedRawCopy(AcquiredStore),
}

/// Obtains a readable snapshot of a possibly locked store
pub struct AcquisitionManager {
    opener: Box<dyn StoreOpener>,
    privileges: Box<dyn PrivilegeProbe>,
    raw_copier: Box<dyn RawCopier>,
}

impl Default for AcquisitionManager {
    fn default() -> Self {
        Self {
            opener: Box::new(FsOpener),
            privileges: Box::new(ProcessElevation),
            raw_copier: Box::new(NoRawCopy),
        }
    }
}

impl AcquisitionManager {
    pub fn new(
        opener: Box<dyn StoreOpener>,
        privileges: Box<dyn PrivilegeProbe>,
        raw_copier: Box<dyn RawCopier>,
    ) -> Self {
        Self {
            opener,
            privileges,
            raw_copier,
        }
    }

    pub fn with_opener(mut self, opener: Box<dyn StoreOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_privileges(mut self, privileges: Box<dyn PrivilegeProbe>) -> Self {
        self.privileges = privileges;
        self
    }

    pub fn with_raw_copier(mut self, raw_copier: Box<dyn RawCopier>) -> Self {
        self.raw_copier = raw_copier;
        self
    }

    /// Read the store at `path`.
    ///
    /// A lock conflict is not an error here: it yields `NeedsElevation` when
    /// the process is not elevated, otherwise the store and its sibling logs
    /// are raw-copied. No retries.
    pub fn acquire(&self, path: &Path) -> AcquisitionResult<AcquireOutcome> {
        let in_use = match self
            .opener
            .open_direct(path)
            .map_err(|e| AcquisitionError::io(path, e))?
        {
            DirectRead::Read(image) => {
                tracing::debug!(
                    event = Event::StoreOpened.as_str(),
                    path = %path.display(),
                    bytes = image.len(),
                    "Store opened directly"
                );
                return Ok(AcquireOutcome::Opened(AcquiredStore::new(path, image)));
            }
            DirectRead::InUse(err) => err,
        };

        if !self.privileges.is_elevated() {
            return Ok(AcquireOutcome::NeedsElevation {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(
            event = Event::StoreInUseReroute.as_str(),
            path = %path.display(),
            error = %in_use,
            "Store in use, rerouting to raw copy"
        );

        let store = self.raw_copy(path)?;
        Ok(AcquireOutcome::ElevatedRawCopy(store))
    }

    fn raw_copy(&self, path: &Path) -> AcquisitionResult<AcquiredStore> {
        let mut requested = vec![path.to_path_buf()];
        requested.extend(discover_sibling_logs(path).map_err(|e| AcquisitionError::io(path, e))?);

        let copies = self
            .raw_copier
            .copy_files(&requested)
            .map_err(AcquisitionError::RawCopy)?;

        let mut copies = copies.into_iter();
        let mut primary = copies.next().ok_or_else(|| RawCopyError::MissingStream {
            path: path.to_path_buf(),
        })?;

        let mut image = Vec::new();
        primary
            .stream
            .read_to_end(&mut image)
            .map_err(|e| AcquisitionError::io(&primary.input_filename, e))?;

        let mut side_logs = Vec::new();
        for mut copy in copies {
            let mut bytes = Vec::new();
            copy.stream
                .read_to_end(&mut bytes)
                .map_err(|e| AcquisitionError::io(&copy.input_filename, e))?;
            side_logs.push(TransactionLogFileInfo::new(
                copy.input_filename.display().to_string(),
                bytes,
            ));
        }

        tracing::info!(
            event = Event::RawCopyComplete.as_str(),
            path = %path.display(),
            bytes = image.len(),
            logs = side_logs.len(),
            "Raw copy complete"
        );

        Ok(AcquiredStore {
            path: path.to_path_buf(),
            image,
            side_logs: Some(side_logs),
        })
    }
}
