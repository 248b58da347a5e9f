//! Dirty-store detection and the replay policy
//!
//! | Header   | Replay  | Logs    | Result                                  |
//! |----------|---------|---------|-----------------------------------------|
//! | clean    | any     | any     | `Clean`                                 |
//! | dirty    | skipped | present | warn (data loss), `DirtyUnreplayed`     |
//! | dirty    | skipped | absent  | warn, `DirtyUnreplayed`                 |
//! | dirty    | enabled | absent  | FATAL `AMCACHE_DIRTY_STORE_NO_LOGS`     |
//! | dirty    | enabled | present | replay, `Recovered`                     |

use std::fs;
use std::path::Path;

use crate::acquisition::{discover_sibling_logs, AcquiredStore};
use crate::hive::BaseBlock;
use crate::observability::Event;

use super::errors::{RecoveryError, RecoveryResult};
use super::log::TransactionLogFileInfo;
use super::replay::{LogReplayer, ReplayStats};

/// State of the store once recovery finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Sequence counters matched
    Clean,
    /// Logs were replayed into the image
    Recovered(ReplayStats),
    /// Dirty, but replay was disabled by configuration
    DirtyUnreplayed { logs_present: bool },
}

/// Brings an acquired store to a consistent state
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyRecovery {
    skip_log_replay: bool,
}

impl ConsistencyRecovery {
    pub fn new(skip_log_replay: bool) -> Self {
        Self { skip_log_replay }
    }

    /// Check the header and replay logs into `store.image` if needed.
    ///
    /// Logs come from `store.side_logs` when acquisition raw-copied them,
    /// otherwise from `<base>.LOG?` files next to the store.
    pub fn ensure_consistent(&self, store: &mut AcquiredStore) -> RecoveryResult<RecoveryOutcome> {
        let header = BaseBlock::parse(&store.image)
            .map_err(|e| RecoveryError::invalid_store_header(e.to_string()))?;

        if !header.is_dirty() {
            tracing::debug!(
                event = Event::StoreClean.as_str(),
                store = %store.path.display(),
                sequence = header.primary_sequence,
                "Store is clean"
            );
            return Ok(RecoveryOutcome::Clean);
        }

        let (logs, unreadable) = match store.side_logs.take() {
            Some(side_logs) => (side_logs, 0),
            None => load_sibling_logs(&store.path)?,
        };
        let logs_present = !logs.is_empty() || unreadable > 0;

        if self.skip_log_replay {
            if logs_present {
                tracing::warn!(
                    event = Event::DirtyStoreReplaySkipped.as_str(),
                    store = %store.path.display(),
                    primary_sequence = header.primary_sequence,
                    secondary_sequence = header.secondary_sequence,
                    "Store is dirty and transaction logs were found, but replay is disabled; \
                     uncommitted data in the logs will be missing"
                );
            } else {
                tracing::warn!(
                    event = Event::DirtyStoreNoLogsContinuing.as_str(),
                    store = %store.path.display(),
                    primary_sequence = header.primary_sequence,
                    secondary_sequence = header.secondary_sequence,
                    "Store is dirty and no transaction logs were found; continuing without replay"
                );
            }
            return Ok(RecoveryOutcome::DirtyUnreplayed { logs_present });
        }

        if !logs_present {
            tracing::warn!(
                event = Event::DirtyStoreNoLogs.as_str(),
                store = %store.path.display(),
                primary_sequence = header.primary_sequence,
                secondary_sequence = header.secondary_sequence,
                "Store is dirty and no transaction logs were found; \
                 copy the logs alongside the store or disable replay"
            );
            return Err(RecoveryError::dirty_store_no_logs(store.path.display()));
        }

        tracing::info!(
            event = Event::LogReplayBegin.as_str(),
            store = %store.path.display(),
            logs = logs.len(),
            "Replaying transaction logs"
        );

        let mut stats = LogReplayer::replay(&mut store.image, &logs)?;
        stats.logs_skipped += unreadable;

        tracing::info!(
            event = Event::LogReplayComplete.as_str(),
            store = %store.path.display(),
            logs_applied = stats.logs_applied,
            logs_skipped = stats.logs_skipped,
            entries_applied = stats.entries_applied,
            entries_unapplied = stats.entries_unapplied,
            pages_written = stats.pages_written,
            "Transaction log replay complete"
        );

        Ok(RecoveryOutcome::Recovered(stats))
    }
}

/// Read every sibling log from disk; unreadable ones are skipped
fn load_sibling_logs(store_path: &Path) -> RecoveryResult<(Vec<TransactionLogFileInfo>, u64)> {
    let paths = discover_sibling_logs(store_path)
        .map_err(|e| RecoveryError::log_discovery_failed(store_path.display(), e))?;

    let mut logs = Vec::with_capacity(paths.len());
    let mut unreadable = 0;
    for path in paths {
        let name = path.display().to_string();
        match fs::read(&path) {
            Ok(bytes) => logs.push(TransactionLogFileInfo::new(name, bytes)),
            Err(e) => {
                let err = RecoveryError::log_unreadable(name.as_str(), e);
                tracing::warn!(
                    event = Event::LogSkipped.as_str(),
                    log = %name,
                    code = err.code().code(),
                    error = %err,
                    "Transaction log skipped"
                );
                unreadable += 1;
            }
        }
    }

    Ok((logs, unreadable))
}
