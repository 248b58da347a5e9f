//! amcache - program execution history from Windows Amcache stores
//!
//! Extracts Program and File records from an Amcache hive, links each File
//! to the Program it belongs to, and copes with stores that are locked by
//! another process or left dirty with pending transaction logs.
//!
//! # Pipeline
//!
//! 1. `acquisition`: read the store, raw-copying it when locked
//! 2. `recovery`: replay transaction logs into a dirty image
//! 3. `hive`: decode the image into a key tree (external reader)
//! 4. `entry` + `codec`: build typed entries from each key's values
//! 5. `linker`: link files to programs in scan order
//!
//! `engine::AmcacheEngine` runs the whole pipeline.
//!
//! ```no_run
//! use std::path::Path;
//! use amcache::{AmcacheEngine, DecodeResult, EngineOptions, KeyNode};
//!
//! fn decode(image: &[u8], name: &str, recover_deleted: bool) -> DecodeResult<KeyNode> {
//!     // hand the image to a hive reader
//! #   let _ = (image, name, recover_deleted);
//! #   unimplemented!()
//! }
//!
//! let output = AmcacheEngine::new(decode)
//!     .with_options(EngineOptions::default())
//!     .run(Path::new(r"C:\Windows\AppCompat\Programs\Amcache.hve"))?;
//! println!("{} programs, {} files", output.programs.len(), output.total_file_entries);
//! # Ok::<(), amcache::AmcacheError>(())
//! ```

pub mod acquisition;
pub mod codec;
pub mod config;
pub mod engine;
pub mod entry;
pub mod errors;
pub mod hive;
pub mod linker;
pub mod observability;
pub mod recovery;

pub use config::EngineOptions;
pub use engine::{AmcacheEngine, ScanPhase};
pub use entry::{FileEntry, ProgramEntry, UNASSOCIATED_PROGRAM_NAME};
pub use errors::{AmcacheError, AmcacheResult};
pub use hive::{DecodeError, DecodeResult, HiveDecoder, KeyNode, KeyValue};
pub use linker::AmcacheOutput;
