//! Shared fixtures for integration tests
//!
//! Stores are synthesized: a real base block followed by a hive bins area
//! holding a NUL-terminated JSON `KeyNode` tree, read back by
//! `json_decoder`. Transaction logs use the real `HvLE` entry layout, so a
//! replay changes what the decoder sees.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use amcache::acquisition::{
    DirectRead, PrivilegeProbe, RawCopier, RawCopyError, RawCopyStream, StoreOpener,
};
use amcache::hive::{BaseBlock, DecodeError, DecodeResult, KeyNode, HIVE_BINS_OFFSET};
use chrono::{DateTime, TimeZone, Utc};

// =============================================================================
// Key trees
// =============================================================================

pub fn written() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 2, 20, 8, 0, 0).unwrap()
}

pub fn program_key(id: &str, name: &str) -> KeyNode {
    KeyNode::new(format!(r"Root\Programs\{}", id))
        .with_last_write(written())
        .with_value("0", name)
        .with_value("1", "1.0")
        .with_value("2", "Vendor")
}

pub fn file_key(volume: &str, id: &str, path: &str, program_id: Option<&str>) -> KeyNode {
    let mut key = KeyNode::new(format!(r"Root\File\{}\{}", volume, id))
        .with_last_write(written())
        .with_value("15", path)
        .with_value("101", "0000da39a3ee5e6b4b0d3255bfef95601890afd80709");
    if let Some(program_id) = program_id {
        key = key.with_value("100", program_id);
    }
    key
}

pub fn volume_key(volume: &str, files: Vec<KeyNode>) -> KeyNode {
    files.into_iter().fold(
        KeyNode::new(format!(r"Root\File\{}", volume)).with_last_write(written()),
        KeyNode::with_subkey,
    )
}

pub fn root(programs: Vec<KeyNode>, volumes: Vec<KeyNode>) -> KeyNode {
    let programs = programs
        .into_iter()
        .fold(KeyNode::new(r"Root\Programs"), KeyNode::with_subkey);
    let files = volumes
        .into_iter()
        .fold(KeyNode::new(r"Root\File"), KeyNode::with_subkey);
    KeyNode::new("Root")
        .with_last_write(written())
        .with_subkey(files)
        .with_subkey(programs)
}

// =============================================================================
// Store images
// =============================================================================

const BIN_SIZE: usize = 4096;

/// Hive bins bytes for `tree`: JSON, a NUL, zero padding to a bin boundary
pub fn hive_bins(tree: &KeyNode) -> Vec<u8> {
    let mut bins = serde_json::to_vec(tree).unwrap();
    bins.push(0);
    let padded = bins.len().div_ceil(BIN_SIZE) * BIN_SIZE;
    bins.resize(padded, 0);
    bins
}

/// Store image for `tree` with the given sequence counters
pub fn store_image(tree: &KeyNode, primary: u32, secondary: u32) -> Vec<u8> {
    let bins = hive_bins(tree);
    let mut image = vec![0u8; HIVE_BINS_OFFSET];
    image[0..4].copy_from_slice(b"regf");
    BaseBlock::write_clean(&mut image, secondary, bins.len() as u32);
    image[4..8].copy_from_slice(&primary.to_le_bytes());
    image.extend_from_slice(&bins);
    image
}

pub fn clean_image(tree: &KeyNode) -> Vec<u8> {
    store_image(tree, 7, 7)
}

/// Dirty image: primary 8, secondary 7
pub fn dirty_image(tree: &KeyNode) -> Vec<u8> {
    store_image(tree, 8, 7)
}

/// `HiveDecoder` for synthesized images
pub fn json_decoder(image: &[u8], name: &str, _recover_deleted: bool) -> DecodeResult<KeyNode> {
    let header = BaseBlock::parse(image)?;
    let end = HIVE_BINS_OFFSET + header.hive_bins_data_size as usize;
    let bins = image
        .get(HIVE_BINS_OFFSET..end)
        .ok_or_else(|| DecodeError::malformed(name, "hive bins past end of image"))?;
    let json_len = bins.iter().position(|b| *b == 0).unwrap_or(bins.len());
    serde_json::from_slice(&bins[..json_len]).map_err(|e| DecodeError::malformed(name, e.to_string()))
}

pub fn write_store(dir: &Path, image: &[u8]) -> PathBuf {
    let path = dir.join("Amcache.hve");
    std::fs::write(&path, image).unwrap();
    path
}

// =============================================================================
// Transaction logs
// =============================================================================

/// One log entry: (sequence, hive bins size, [(page offset, page data)])
pub type LogEntrySpec = (u32, u32, Vec<(u32, Vec<u8>)>);

pub fn hvle_log(entries: &[LogEntrySpec]) -> Vec<u8> {
    let mut log = vec![0u8; 512];
    log[0..4].copy_from_slice(b"regf");
    BaseBlock::write_clean(&mut log, 1, 0);

    for (sequence, hive_bins_size, pages) in entries {
        let mut entry = vec![0u8; 40];
        entry[0..4].copy_from_slice(b"HvLE");
        entry[12..16].copy_from_slice(&sequence.to_le_bytes());
        entry[16..20].copy_from_slice(&hive_bins_size.to_le_bytes());
        entry[20..24].copy_from_slice(&(pages.len() as u32).to_le_bytes());
        for (offset, data) in pages {
            entry.extend_from_slice(&offset.to_le_bytes());
            entry.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
        for (_, data) in pages {
            entry.extend_from_slice(data);
        }
        let padded = entry.len().div_ceil(512) * 512;
        entry.resize(padded, 0);
        entry[4..8].copy_from_slice(&(padded as u32).to_le_bytes());
        log.extend_from_slice(&entry);
    }

    log
}

/// A log whose single entry (sequence 7) rewrites the hive bins to `tree`
pub fn replacement_log(tree: &KeyNode) -> Vec<u8> {
    let bins = hive_bins(tree);
    hvle_log(&[(7, bins.len() as u32, vec![(0, bins)])])
}

/// Old-format log: base block followed by a `DIRT` block
pub fn old_format_log() -> Vec<u8> {
    let mut log = hvle_log(&[]);
    log.extend_from_slice(b"DIRT");
    log.resize(1024, 0);
    log
}

// =============================================================================
// Acquisition doubles
// =============================================================================

/// Opener that always reports a sharing violation
pub struct LockedOpener;

impl StoreOpener for LockedOpener {
    fn open_direct(&self, _path: &Path) -> io::Result<DirectRead> {
        Ok(DirectRead::InUse(io::Error::from_raw_os_error(32)))
    }
}

pub struct FixedElevation(pub bool);

impl PrivilegeProbe for FixedElevation {
    fn is_elevated(&self) -> bool {
        self.0
    }
}

/// Copier serving in-memory contents by file name, falling back to disk
#[derive(Default)]
pub struct MemoryCopier {
    pub contents: BTreeMap<String, Vec<u8>>,
    pub requested: Arc<Mutex<Vec<PathBuf>>>,
}

impl MemoryCopier {
    pub fn with(mut self, file_name: &str, bytes: Vec<u8>) -> Self {
        self.contents.insert(file_name.to_string(), bytes);
        self
    }
}

impl RawCopier for MemoryCopier {
    fn copy_files(&self, paths: &[PathBuf]) -> Result<Vec<RawCopyStream>, RawCopyError> {
        self.requested.lock().unwrap().extend(paths.iter().cloned());
        paths
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let bytes = match self.contents.get(&name) {
                    Some(bytes) => bytes.clone(),
                    None => std::fs::read(path).map_err(|e| RawCopyError::io(path, e))?,
                };
                Ok(RawCopyStream {
                    input_filename: path.clone(),
                    stream: Box::new(Cursor::new(bytes)),
                })
            })
            .collect()
    }
}

// =============================================================================
// Log capture
// =============================================================================

pub use amcache::observability::capture::{CapturedEvent, CapturedLogs};
