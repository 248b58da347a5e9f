//! Hive base block (header) access
//!
//! Layout of the fields the engine touches (all little-endian):
//!
//! | Offset | Size | Field                    |
//! |--------|------|--------------------------|
//! | 0x000  | 4    | signature `regf`         |
//! | 0x004  | 4    | primary sequence number  |
//! | 0x008  | 4    | secondary sequence number|
//! | 0x028  | 4    | hive bins data size      |
//! | 0x1FC  | 4    | XOR-32 checksum          |
//!
//! A hive image carries a 4096-byte base block; transaction logs carry a
//! 512-byte copy of it. Only the first 512 bytes are meaningful in either.

use super::errors::{DecodeError, DecodeResult};

/// Bytes of the base block that carry data (and that the checksum covers)
pub const BASE_BLOCK_SIZE: usize = 512;

/// Offset of the first hive bin in a hive image
pub const HIVE_BINS_OFFSET: usize = 4096;

const SIGNATURE: &[u8; 4] = b"regf";
const PRIMARY_SEQUENCE_OFFSET: usize = 0x04;
const SECONDARY_SEQUENCE_OFFSET: usize = 0x08;
const HIVE_BINS_SIZE_OFFSET: usize = 0x28;
const CHECKSUM_OFFSET: usize = 0x1FC;

/// Parsed view of a base block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseBlock {
    /// Incremented when a write to the hive starts
    pub primary_sequence: u32,
    /// Set equal to the primary sequence once the write completes
    pub secondary_sequence: u32,
    /// Size of the hive bins area following the base block
    pub hive_bins_data_size: u32,
    /// Stored checksum
    pub checksum: u32,
}

impl BaseBlock {
    /// Parse the base block at the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::InvalidBaseBlock` if `bytes` is shorter than a
    /// base block or does not start with the `regf` signature.
    pub fn parse(bytes: &[u8]) -> DecodeResult<Self> {
        if bytes.len() < BASE_BLOCK_SIZE {
            return Err(DecodeError::InvalidBaseBlock(format!(
                "{} bytes is shorter than a {} byte base block",
                bytes.len(),
                BASE_BLOCK_SIZE
            )));
        }

        if &bytes[0..4] != SIGNATURE {
            return Err(DecodeError::InvalidBaseBlock(
                "missing 'regf' signature".to_string(),
            ));
        }

        Ok(Self {
            primary_sequence: read_u32(bytes, PRIMARY_SEQUENCE_OFFSET),
            secondary_sequence: read_u32(bytes, SECONDARY_SEQUENCE_OFFSET),
            hive_bins_data_size: read_u32(bytes, HIVE_BINS_SIZE_OFFSET),
            checksum: read_u32(bytes, CHECKSUM_OFFSET),
        })
    }

    /// A hive is dirty when a write started but never completed
    pub fn is_dirty(&self) -> bool {
        self.primary_sequence != self.secondary_sequence
    }

    /// Compute the XOR-32 checksum over the first 508 bytes.
    ///
    /// The values 0 and 0xFFFFFFFF are reserved and remapped.
    pub fn compute_checksum(bytes: &[u8]) -> u32 {
        let sum = bytes[..CHECKSUM_OFFSET]
            .chunks_exact(4)
            .fold(0u32, |acc, dword| {
                acc ^ u32::from_le_bytes([dword[0], dword[1], dword[2], dword[3]])
            });

        match sum {
            0xFFFF_FFFF => 0xFFFF_FFFE,
            0 => 1,
            other => other,
        }
    }

    /// Whether the stored checksum matches the block contents
    pub fn checksum_matches(bytes: &[u8]) -> bool {
        bytes.len() >= BASE_BLOCK_SIZE
            && read_u32(bytes, CHECKSUM_OFFSET) == Self::compute_checksum(bytes)
    }

    /// Mark the image clean at `sequence` and refresh its checksum
    pub fn write_clean(image: &mut [u8], sequence: u32, hive_bins_data_size: u32) {
        write_u32(image, PRIMARY_SEQUENCE_OFFSET, sequence);
        write_u32(image, SECONDARY_SEQUENCE_OFFSET, sequence);
        write_u32(image, HIVE_BINS_SIZE_OFFSET, hive_bins_data_size);
        let checksum = Self::compute_checksum(image);
        write_u32(image, CHECKSUM_OFFSET, checksum);
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
