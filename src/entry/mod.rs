//! Domain entities and their record builders
//!
//! A builder visits one key's values exactly once, routes each through the
//! codec into staging fields, then converts the staging fields into an
//! immutable entity.
//!
//! # Record policy
//!
//! - File record without a full path: skipped silently, never counted
//! - Field that fails to decode: logged, left unset, record kept
//! - Entity construction fails: record dropped, logged with a report hint

mod errors;
mod file;
mod program;

pub use errors::{BuildResult, RecordBuildError};
pub use file::{FileEntry, FileRecordBuilder, UNASSOCIATED_PROGRAM_NAME};
pub use program::{ProgramEntry, ProgramRecordBuilder};

use crate::codec::{FieldDecodeError, FieldOutcome};
use crate::hive::{KeyNode, KeyValue};
use crate::observability::{Event, REPORT_HINT};

/// The two record kinds an Amcache store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Program,
    File,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Program => "Program",
            RecordKind::File => "File",
        }
    }
}

fn report_value_outcome(
    kind: RecordKind,
    key_path: &str,
    value: &KeyValue,
    outcome: Result<FieldOutcome, FieldDecodeError>,
) {
    match outcome {
        Ok(FieldOutcome::Applied(_)) => {}
        Ok(FieldOutcome::Unknown) => {
            let event = match kind {
                RecordKind::Program => Event::UnknownProgramValue,
                RecordKind::File => Event::UnknownFileValue,
            };
            tracing::warn!(
                event = event.as_str(),
                record = kind.as_str(),
                key_path,
                value_name = %value.name,
                "Unknown value name in {} record",
                kind.as_str()
            );
        }
        Err(err) => {
            tracing::warn!(
                event = Event::FieldDecodeFailed.as_str(),
                record = kind.as_str(),
                key_path,
                field = err.field,
                value_name = %err.value_name,
                value_data = %err.value_data,
                error = %err.source,
                "Field left unset"
            );
        }
    }
}

fn report_build_failure(kind: RecordKind, key: &KeyNode, err: &RecordBuildError) {
    let value_names: Vec<&str> = key.values.iter().map(|v| v.name.as_str()).collect();
    tracing::error!(
        event = Event::RecordBuildFailed.as_str(),
        record = kind.as_str(),
        code = err.code(),
        key_path = %key.path,
        error = %err,
        hint = REPORT_HINT,
        key_name = %key.name,
        value_count = key.values.len(),
        value_names = ?value_names,
        "Error parsing {} entry, record dropped",
        kind.as_str()
    );
}
