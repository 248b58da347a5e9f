//! Consistency recovery
//!
//! A store whose two header sequence counters disagree holds writes that
//! only exist in its transaction logs. Recovery detects that and replays the
//! logs into the in-memory image before anything is decoded.
//!
//! # Sequence
//!
//! 1. Parse the store base block
//! 2. Clean: done
//! 3. Dirty: take raw-copied side logs, or discover `<base>.LOG?` on disk
//! 4. Apply the replay policy (see `ConsistencyRecovery`)
//! 5. Replay logs in name order, then mark the image clean
//!
//! Returning data from a dirty store without its logs would silently omit
//! uncommitted writes, so that case fails closed unless replay was
//! explicitly disabled.

mod consistency;
mod errors;
mod log;
mod replay;

pub use consistency::{ConsistencyRecovery, RecoveryOutcome};
pub use errors::{RecoveryError, RecoveryErrorCode, RecoveryResult, Severity};
pub use log::{DirtyPage, LogEntry, TransactionLogFileInfo};
pub use replay::{LogReplayer, ReplayStats};
