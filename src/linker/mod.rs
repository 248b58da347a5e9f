//! Reconciliation of File records with Program records
//!
//! Two ordered passes over the decoded tree:
//!
//! 1. Every `Root\Programs` sub-key becomes a `ProgramEntry`, indexed by
//!    ProgramID (first occurrence wins)
//! 2. Every `Root\File\<volume>\<file>` key, volume then file, becomes a
//!    `FileEntry` that is linked to its program on the spot or appended to
//!    the unassociated list
//!
//! The single lookup per file makes the result depend on scan order: a file
//! decoded before its program exists stays unassociated.

mod errors;
mod reconcile;

pub use errors::StructureError;
pub use reconcile::{AmcacheOutput, ReconciliationLinker, FILES_SUBTREE, PROGRAMS_SUBTREE};
