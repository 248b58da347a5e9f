//! Observable events of an Amcache scan
//!
//! Every log line emitted by the engine carries one of these codes in its
//! `event` field. Codes are stable; downstream tooling may match on them.

use std::fmt;

/// Observable events during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Scan of a store begins
    ScanBegin,
    /// Scan finished, outputs are ready
    ScanComplete,
    /// Scan ended on a fatal error, no output (FATAL)
    ScanFailed,
    /// Engine moved to another scan phase
    PhaseTransition,

    // Acquisition
    /// Store read through a direct open
    StoreOpened,
    /// Store is locked by another process, falling back to raw copy
    StoreInUseReroute,
    /// Raw copy of store and sibling logs finished
    RawCopyComplete,

    // Consistency recovery
    /// Sequence counters match
    StoreClean,
    /// Dirty store, replay required, no logs found (FATAL)
    DirtyStoreNoLogs,
    /// Dirty store, replay disabled, no logs found
    DirtyStoreNoLogsContinuing,
    /// Dirty store, replay disabled although logs exist
    DirtyStoreReplaySkipped,
    /// Transaction log replay begins
    LogReplayBegin,
    /// One transaction log was skipped
    LogSkipped,
    /// Log entries newer than the replayed state were left unapplied
    LogSequenceGap,
    /// Transaction log replay complete
    LogReplayComplete,
    /// Recovery failed (FATAL)
    RecoveryFailed,

    // Decoding
    /// `File` or `Programs` sub-tree absent (FATAL)
    MissingSubtree,
    /// Program pass begins
    ProgramsDecodeBegin,
    /// File pass begins
    FilesDecodeBegin,
    /// Unrecognized Program value name
    UnknownProgramValue,
    /// Unrecognized File value name
    UnknownFileValue,
    /// A single field failed to decode
    FieldDecodeFailed,
    /// A record was dropped because it could not be built
    RecordBuildFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ScanBegin => "AMCACHE_SCAN_BEGIN",
            Event::ScanComplete => "AMCACHE_SCAN_COMPLETE",
            Event::ScanFailed => "AMCACHE_SCAN_FAILED",
            Event::PhaseTransition => "SCAN_PHASE",

            Event::StoreOpened => "STORE_OPENED",
            Event::StoreInUseReroute => "STORE_IN_USE_REROUTE",
            Event::RawCopyComplete => "RAW_COPY_COMPLETE",

            Event::StoreClean => "STORE_CLEAN",
            Event::DirtyStoreNoLogs => "DIRTY_STORE_NO_LOGS",
            Event::DirtyStoreNoLogsContinuing => "DIRTY_STORE_NO_LOGS_CONTINUING",
            Event::DirtyStoreReplaySkipped => "DIRTY_STORE_REPLAY_SKIPPED",
            Event::LogReplayBegin => "LOG_REPLAY_BEGIN",
            Event::LogSkipped => "LOG_SKIPPED",
            Event::LogSequenceGap => "LOG_SEQUENCE_GAP",
            Event::LogReplayComplete => "LOG_REPLAY_COMPLETE",
            Event::RecoveryFailed => "RECOVERY_FAILED",

            Event::MissingSubtree => "MISSING_SUBTREE",
            Event::ProgramsDecodeBegin => "PROGRAMS_DECODE_BEGIN",
            Event::FilesDecodeBegin => "FILES_DECODE_BEGIN",
            Event::UnknownProgramValue => "UNKNOWN_PROGRAM_VALUE",
            Event::UnknownFileValue => "UNKNOWN_FILE_VALUE",
            Event::FieldDecodeFailed => "FIELD_DECODE_FAILED",
            Event::RecordBuildFailed => "RECORD_BUILD_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Event::ScanFailed
                | Event::DirtyStoreNoLogs
                | Event::RecoveryFailed
                | Event::MissingSubtree
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
