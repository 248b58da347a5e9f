//! Transaction log parsing
//!
//! A new-format log is a 512-byte base block followed by `HvLE` entries,
//! each padded to a multiple of 512 bytes:
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0x00   | 4    | signature `HvLE`              |
//! | 0x04   | 4    | entry size                    |
//! | 0x08   | 4    | flags                         |
//! | 0x0C   | 4    | sequence number               |
//! | 0x10   | 4    | hive bins data size           |
//! | 0x14   | 4    | dirty page count              |
//! | 0x18   | 8    | hash-1                        |
//! | 0x20   | 8    | hash-2                        |
//! | 0x28   | 8×n  | dirty page references         |
//! | ...    |      | dirty page data, in ref order |
//!
//! A reference is (offset relative to the hive bins start, size). The first
//! entry that fails to parse ends the log.

use crate::hive::{BaseBlock, BASE_BLOCK_SIZE};

use super::errors::{RecoveryError, RecoveryResult};

const ENTRY_SIGNATURE: &[u8; 4] = b"HvLE";
const OLD_FORMAT_SIGNATURE: &[u8; 4] = b"DIRT";
const ENTRY_HEADER_SIZE: usize = 40;
const PAGE_REFERENCE_SIZE: usize = 8;
const ENTRY_ALIGNMENT: usize = 512;

/// A transaction log held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionLogFileInfo {
    /// Input file name, for diagnostics
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One dirty page to write into the hive bins area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyPage<'a> {
    /// Offset relative to the start of the hive bins
    pub offset: u32,
    pub data: &'a [u8],
}

/// One parsed `HvLE` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry<'a> {
    /// Offset of the entry within the log file
    pub file_offset: usize,
    pub sequence: u32,
    pub hive_bins_data_size: u32,
    pub pages: Vec<DirtyPage<'a>>,
}

impl TransactionLogFileInfo {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Parse every valid entry in file order.
    ///
    /// # Errors
    ///
    /// Recoverable errors only: a bad base block or an old-format log.
    pub fn entries(&self) -> RecoveryResult<Vec<LogEntry<'_>>> {
        BaseBlock::parse(&self.bytes)
            .map_err(|e| RecoveryError::invalid_log_base_block(&self.name, e.to_string()))?;

        if !BaseBlock::checksum_matches(&self.bytes) {
            return Err(RecoveryError::invalid_log_base_block(
                &self.name,
                "base block checksum mismatch",
            ));
        }

        if self.bytes.get(BASE_BLOCK_SIZE..BASE_BLOCK_SIZE + 4) == Some(&OLD_FORMAT_SIGNATURE[..]) {
            return Err(RecoveryError::unsupported_log_format(&self.name));
        }

        let mut entries = Vec::new();
        let mut offset = BASE_BLOCK_SIZE;
        while let Some((entry, size)) = parse_entry(&self.bytes, offset) {
            entries.push(entry);
            offset += size;
        }

        Ok(entries)
    }
}

fn parse_entry(bytes: &[u8], offset: usize) -> Option<(LogEntry<'_>, usize)> {
    let header = bytes.get(offset..offset.checked_add(ENTRY_HEADER_SIZE)?)?;
    if &header[0..4] != ENTRY_SIGNATURE {
        return None;
    }

    let size = u32_at(header, 0x04)? as usize;
    if size < ENTRY_HEADER_SIZE || size % ENTRY_ALIGNMENT != 0 {
        return None;
    }
    let entry = bytes.get(offset..offset.checked_add(size)?)?;

    let sequence = u32_at(entry, 0x0C)?;
    let hive_bins_data_size = u32_at(entry, 0x10)?;
    let page_count = u32_at(entry, 0x14)? as usize;

    let refs_end = page_count
        .checked_mul(PAGE_REFERENCE_SIZE)?
        .checked_add(ENTRY_HEADER_SIZE)?;
    let refs = entry.get(ENTRY_HEADER_SIZE..refs_end)?;

    let mut pages = Vec::with_capacity(page_count);
    let mut data_offset = refs_end;
    for reference in refs.chunks_exact(PAGE_REFERENCE_SIZE) {
        let page_offset = u32_at(reference, 0)?;
        let page_size = u32_at(reference, 4)? as usize;
        let data_end = data_offset.checked_add(page_size)?;
        pages.push(DirtyPage {
            offset: page_offset,
            data: entry.get(data_offset..data_end)?,
        });
        data_offset = data_end;
    }

    Some((
        LogEntry {
            file_offset: offset,
            sequence,
            hive_bins_data_size,
            pages,
        },
        size,
    ))
}

fn u32_at(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
