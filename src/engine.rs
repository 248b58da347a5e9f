//! The scan state machine
//!
//! ```text
//! Unopened -> Acquired -> Clean | Recovered | DirtyUnreplayed
//!                      \-> RecoveryFailed (terminal, fatal)
//!          -> Decoded -> Linked -> Ready (terminal)
//! ```
//!
//! One run is a pure function of the store bytes and the options: no
//! retries, no state kept between runs. The acquired image is dropped on
//! every exit path.

use std::fmt;
use std::path::Path;

use crate::acquisition::{AcquireOutcome, AcquiredStore, AcquisitionManager};
use crate::config::EngineOptions;
use crate::errors::{AmcacheError, AmcacheResult};
use crate::hive::HiveDecoder;
use crate::linker::{AmcacheOutput, ReconciliationLinker};
use crate::observability::Event;
use crate::recovery::{ConsistencyRecovery, RecoveryOutcome};

/// Phases of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Unopened,
    Acquired,
    Clean,
    Recovered,
    DirtyUnreplayed,
    RecoveryFailed,
    Decoded,
    Linked,
    Ready,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Unopened => "UNOPENED",
            ScanPhase::Acquired => "ACQUIRED",
            ScanPhase::Clean => "CLEAN",
            ScanPhase::Recovered => "RECOVERED",
            ScanPhase::DirtyUnreplayed => "DIRTY_UNREPLAYED",
            ScanPhase::RecoveryFailed => "RECOVERY_FAILED",
            ScanPhase::Decoded => "DECODED",
            ScanPhase::Linked => "LINKED",
            ScanPhase::Ready => "READY",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::RecoveryFailed | ScanPhase::Ready)
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct PhaseTracker {
    current: ScanPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            current: ScanPhase::Unopened,
        }
    }

    fn advance(&mut self, next: ScanPhase) {
        tracing::debug!(
            event = Event::PhaseTransition.as_str(),
            from = self.current.as_str(),
            to = next.as_str(),
            "Scan phase"
        );
        self.current = next;
    }
}

/// Extracts Program and File records from an Amcache store
pub struct AmcacheEngine {
    decoder: Box<dyn HiveDecoder>,
    acquisition: AcquisitionManager,
    options: EngineOptions,
}

impl AmcacheEngine {
    /// Engine over `decoder` with default acquisition and options
    pub fn new(decoder: impl HiveDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
            acquisition: AcquisitionManager::default(),
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_acquisition(mut self, acquisition: AcquisitionManager) -> Self {
        self.acquisition = acquisition;
        self
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Scan the store at `path`.
    ///
    /// # Errors
    ///
    /// Any error is fatal and means zero records were produced.
    pub fn run(&self, path: &Path) -> AmcacheResult<AmcacheOutput> {
        tracing::info!(
            event = Event::ScanBegin.as_str(),
            path = %path.display(),
            recover_deleted = self.options.recover_deleted,
            skip_log_replay = self.options.skip_log_replay,
            "Scanning Amcache store"
        );

        let mut phases = PhaseTracker::new();
        let result = self.run_phases(path, &mut phases);

        match &result {
            Ok(output) => {
                tracing::info!(
                    event = Event::ScanComplete.as_str(),
                    path = %path.display(),
                    programs = output.programs.len(),
                    unassociated = output.unassociated.len(),
                    total_file_entries = output.total_file_entries,
                    "Scan complete"
                );
            }
            Err(err) => {
                tracing::error!(
                    event = Event::ScanFailed.as_str(),
                    path = %path.display(),
                    phase = phases.current.as_str(),
                    code = err.code(),
                    error = %err,
                    "Scan failed, no records produced"
                );
            }
        }

        result
    }

    fn run_phases(&self, path: &Path, phases: &mut PhaseTracker) -> AmcacheResult<AmcacheOutput> {
        let mut store = self.acquire(path)?;
        phases.advance(ScanPhase::Acquired);

        let recovery = ConsistencyRecovery::new(self.options.skip_log_replay);
        match recovery.ensure_consistent(&mut store) {
            Ok(RecoveryOutcome::Clean) => phases.advance(ScanPhase::Clean),
            Ok(RecoveryOutcome::Recovered(_)) => phases.advance(ScanPhase::Recovered),
            Ok(RecoveryOutcome::DirtyUnreplayed { .. }) => {
                phases.advance(ScanPhase::DirtyUnreplayed)
            }
            Err(err) => {
                phases.advance(ScanPhase::RecoveryFailed);
                tracing::error!(
                    event = Event::RecoveryFailed.as_str(),
                    path = %path.display(),
                    code = err.code().code(),
                    error = %err,
                    "Consistency recovery failed"
                );
                return Err(err.into());
            }
        }

        let root = self
            .decoder
            .decode(&store.image, &store.name(), self.options.recover_deleted)?;
        drop(store);
        phases.advance(ScanPhase::Decoded);

        let output = ReconciliationLinker::scan(&root)?;
        phases.advance(ScanPhase::Linked);
        phases.advance(ScanPhase::Ready);

        Ok(output)
    }

    fn acquire(&self, path: &Path) -> AmcacheResult<AcquiredStore> {
        match self.acquisition.acquire(path)? {
            AcquireOutcome::Opened(store) | AcquireOutcome::ElevatedRawCopy(store) => Ok(store),
            AcquireOutcome::NeedsElevation { path } => Err(AmcacheError::Permission { path }),
        }
    }
}
