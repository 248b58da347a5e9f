//! Transaction log replay into a hive image
//!
//! - Entries from every readable log are merged and applied in sequence
//!   order, so LOG1 and LOG2 may hold either half of the history
//! - Entries older than the image's secondary sequence are already in the
//!   image and are skipped
//! - Replay stops at the first sequence gap; anything newer is reported
//! - The image grows to each applied entry's hive bins size
//! - A dirty page outside the image is fatal
//! - A log that cannot be parsed, or declares an implausible hive bins
//!   size, is skipped (recoverable)
//!
//! When anything was applied, the base block is rewritten as clean.

use crate::hive::{BaseBlock, HIVE_BINS_OFFSET};
use crate::observability::Event;

use super::errors::{RecoveryError, RecoveryResult};
use super::log::{LogEntry, TransactionLogFileInfo};

/// Hive bins sizes are whole bins
const HIVE_BIN_ALIGNMENT: u32 = 4096;

/// Statistics from log replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Logs that contributed at least one applied entry
    pub logs_applied: u64,
    /// Logs skipped for a recoverable error
    pub logs_skipped: u64,
    pub entries_applied: u64,
    /// Entries already reflected in the image
    pub entries_stale: u64,
    /// Entries past a sequence gap
    pub entries_unapplied: u64,
    pub pages_written: u64,
    /// Sequence number the image was marked clean at
    pub final_sequence: Option<u32>,
}

/// Replays transaction logs into a hive image
pub struct LogReplayer;

impl LogReplayer {
    /// Replay `logs` into `image`.
    ///
    /// The order of `logs` only breaks ties between entries carrying the
    /// same sequence number.
    ///
    /// # Errors
    ///
    /// Fatal `RecoveryError`s only; recoverable ones are logged and the log
    /// is counted in `logs_skipped`.
    pub fn replay(image: &mut Vec<u8>, logs: &[TransactionLogFileInfo]) -> RecoveryResult<ReplayStats> {
        let header = BaseBlock::parse(image)
            .map_err(|e| RecoveryError::invalid_store_header(e.to_string()))?;

        // New bins only reach the image as dirty pages, so growth is bounded
        // by what the logs hold
        let size_limit = logs
            .iter()
            .map(|log| log.bytes.len() as u64)
            .sum::<u64>()
            + u64::from(header.hive_bins_data_size);

        let mut stats = ReplayStats::default();
        let mut pending: Vec<(usize, LogEntry<'_>)> = Vec::new();

        for (index, log) in logs.iter().enumerate() {
            let entries = log
                .entries()
                .and_then(|entries| check_hive_bins_sizes(log, entries, size_limit));
            match entries {
                Ok(entries) => pending.extend(entries.into_iter().map(|entry| (index, entry))),
                Err(err) if !err.is_fatal() => {
                    tracing::warn!(
                        event = Event::LogSkipped.as_str(),
                        log = %log.name,
                        code = err.code().code(),
                        error = %err,
                        "Transaction log skipped"
                    );
                    stats.logs_skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        // Stable: equal sequences keep log order
        pending.sort_by_key(|(_, entry)| entry.sequence);

        let mut next_sequence = header.secondary_sequence;
        let mut hive_bins_data_size = header.hive_bins_data_size;
        let mut contributed = vec![false; logs.len()];

        for (position, (index, entry)) in pending.iter().enumerate() {
            let log = &logs[*index];
            if entry.sequence < next_sequence {
                stats.entries_stale += 1;
                continue;
            }
            if entry.sequence != next_sequence {
                stats.entries_unapplied = (pending.len() - position) as u64;
                tracing::warn!(
                    event = Event::LogSequenceGap.as_str(),
                    log = %log.name,
                    expected = next_sequence,
                    found = entry.sequence,
                    unapplied = stats.entries_unapplied,
                    "Sequence gap in transaction logs, newer entries left unapplied"
                );
                break;
            }

            stats.pages_written += apply_entry(image, &log.name, entry)?;
            stats.entries_applied += 1;
            contributed[*index] = true;
            hive_bins_data_size = entry.hive_bins_data_size;
            next_sequence = entry.sequence.wrapping_add(1);
            stats.final_sequence = Some(next_sequence);
        }

        stats.logs_applied = contributed.iter().filter(|c| **c).count() as u64;

        if let Some(sequence) = stats.final_sequence {
            BaseBlock::write_clean(image, sequence, hive_bins_data_size);
        }

        Ok(stats)
    }
}

/// Reject a log whose entries declare a hive bins size that is not a whole
/// number of bins or that exceeds `limit`
fn check_hive_bins_sizes<'a>(
    log: &TransactionLogFileInfo,
    entries: Vec<LogEntry<'a>>,
    limit: u64,
) -> RecoveryResult<Vec<LogEntry<'a>>> {
    for entry in &entries {
        let size = entry.hive_bins_data_size;
        let reason = if size == 0 || size % HIVE_BIN_ALIGNMENT != 0 {
            format!("hive bins size {} is not a whole number of bins", size)
        } else if u64::from(size) > limit {
            format!("hive bins size {} exceeds the {} bytes the logs can supply", size, limit)
        } else {
            continue;
        };
        return Err(RecoveryError::invalid_log_entry(
            &log.name,
            entry.file_offset as u64,
            entry.sequence,
            reason,
        ));
    }
    Ok(entries)
}

fn apply_entry(image: &mut Vec<u8>, log: &str, entry: &LogEntry<'_>) -> RecoveryResult<u64> {
    let required = HIVE_BINS_OFFSET + entry.hive_bins_data_size as usize;
    if image.len() < required {
        image.resize(required, 0);
    }

    for page in &entry.pages {
        let start = HIVE_BINS_OFFSET + page.offset as usize;
        let end = start + page.data.len();
        if end > image.len() {
            return Err(RecoveryError::page_out_of_bounds(
                log,
                entry.file_offset as u64,
                entry.sequence,
                format!(
                    "dirty page {}..{} lies outside a {} byte image",
                    start,
                    end,
                    image.len()
                ),
            ));
        }
        image[start..end].copy_from_slice(page.data);
    }

    Ok(entry.pages.len() as u64)
}
