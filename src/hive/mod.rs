//! Seams to the external hive reader
//!
//! The on-disk cell format of a hive is decoded by an external reader. This
//! module only defines what the engine consumes from it:
//!
//! - A decoded key tree (`KeyNode`) whose values are
//!   (name, raw bytes, decoded text) triples
//! - A `HiveDecoder` that turns a (possibly replayed) image into that tree
//! - The base block header (`BaseBlock`) exposing the two sequence counters
//!
//! The base block is parsed here because transaction-log replay rewrites it
//! in place before the image is handed to the decoder.

mod errors;
mod header;
mod key;

pub use errors::{DecodeError, DecodeResult};
pub use header::{BaseBlock, BASE_BLOCK_SIZE, HIVE_BINS_OFFSET};
pub use key::{KeyNode, KeyValue};

/// Decodes a hive image into its key tree.
///
/// Implementations wrap a concrete hive reader. `recover_deleted` is passed
/// through untouched; the engine attaches no meaning to it.
pub trait HiveDecoder {
    /// Decode `image` (named `name` for diagnostics) and return the root key.
    fn decode(&self, image: &[u8], name: &str, recover_deleted: bool) -> DecodeResult<KeyNode>;
}

impl<F> HiveDecoder for F
where
    F: Fn(&[u8], &str, bool) -> DecodeResult<KeyNode>,
{
    fn decode(&self, image: &[u8], name: &str, recover_deleted: bool) -> DecodeResult<KeyNode> {
        self(image, name, recover_deleted)
    }
}
