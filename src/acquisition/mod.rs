//! Store acquisition
//!
//! Produces a byte-accurate in-memory image of the primary store even when
//! another process holds it open exclusively.
//!
//! # Flow
//!
//! 1. Direct read through a `StoreOpener`
//! 2. On a lock conflict, check elevation through a `PrivilegeProbe`
//! 3. Not elevated: `AcquireOutcome::NeedsElevation`
//! 4. Elevated: raw-copy the store and every `<base>.LOG?` sibling through a
//!    `RawCopier`; the copied logs travel with the image as side buffers
//!
//! Everything is blocking and single-attempt.

mod errors;
mod logs;
mod manager;
mod opener;
mod privilege;
mod raw_copy;

pub use errors::{AcquisitionError, AcquisitionResult};
pub use logs::discover_sibling_logs;
pub use manager::{AcquireOutcome, AcquiredStore, AcquisitionManager};
pub use opener::{is_lock_conflict, DirectRead, FsOpener, StoreOpener};
pub use privilege::{PrivilegeProbe, ProcessElevation};
pub use raw_copy::{NoRawCopy, RawCopier, RawCopyError, RawCopyStream};
