//! Program entries (`Root\Programs\<ProgramID>`)

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::{BuildResult, RecordBuildError};
use super::file::FileEntry;
use super::{report_build_failure, report_value_outcome, RecordKind};
use crate::codec::{decode_program_value, ProgramFields};
use crate::hive::KeyNode;

/// An installed program.
///
/// Everything except the linked file list is fixed at construction. The
/// list is appended to by the linker while the File pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramEntry {
    /// Linking key: the name of the program's key
    pub program_id: String,
    pub name: String,
    pub version: String,
    pub vendor: String,
    pub locale_id: String,
    pub install_source: String,
    pub uninstall_key: String,
    pub guid_10: String,
    pub uninstall_guid_11: String,
    pub guid_12: String,
    pub guid_f: String,
    pub dword_5: i32,
    pub dword_13: i32,
    pub dword_14: i32,
    pub dword_15: i32,
    pub unknown_bytes: Vec<u8>,
    pub qword_17: i64,
    pub dword_18: i32,
    pub install_date: Option<DateTime<Utc>>,
    pub uninstall_date: Option<DateTime<Utc>>,
    /// Delimited list of install paths
    pub path_list: String,
    /// File list exactly as stored
    pub raw_files: String,
    pub key_name: String,
    pub key_last_write: DateTime<Utc>,
    file_entries: Vec<FileEntry>,
}

impl ProgramEntry {
    /// Files linked to this program, in File-scan order
    pub fn file_entries(&self) -> &[FileEntry] {
        &self.file_entries
    }

    pub(crate) fn push_file(&mut self, file: FileEntry) {
        self.file_entries.push(file);
    }

    fn from_fields(fields: ProgramFields, key: &KeyNode) -> BuildResult<Self> {
        if key.name.is_empty() {
            return Err(RecordBuildError::EmptyKeyName {
                key_path: key.path.clone(),
            });
        }

        let key_last_write =
            key.last_write_time
                .ok_or_else(|| RecordBuildError::MissingLastWriteTime {
                    key_path: key.path.clone(),
                })?;

        Ok(Self {
            program_id: key.name.clone(),
            name: fields.name,
            version: fields.version,
            vendor: fields.vendor,
            locale_id: fields.locale_id,
            install_source: fields.install_source,
            uninstall_key: fields.uninstall_key,
            guid_10: fields.guid_10,
            uninstall_guid_11: fields.uninstall_guid_11,
            guid_12: fields.guid_12,
            guid_f: fields.guid_f,
            dword_5: fields.dword_5,
            dword_13: fields.dword_13,
            dword_14: fields.dword_14,
            dword_15: fields.dword_15,
            unknown_bytes: fields.unknown_bytes,
            qword_17: fields.qword_17,
            dword_18: fields.dword_18,
            install_date: fields.install_date,
            uninstall_date: fields.uninstall_date,
            path_list: fields.path_list,
            raw_files: fields.raw_files,
            key_name: key.name.clone(),
            key_last_write,
            file_entries: Vec::new(),
        })
    }
}

/// Staging state for one Program key.
///
/// Visits each value once, then converts into a [`ProgramEntry`].
pub struct ProgramRecordBuilder<'k> {
    key: &'k KeyNode,
    fields: ProgramFields,
}

impl<'k> ProgramRecordBuilder<'k> {
    pub fn new(key: &'k KeyNode) -> Self {
        Self {
            key,
            fields: ProgramFields::default(),
        }
    }

    /// Route every value of the key through the codec.
    ///
    /// Unknown tokens and undecodable fields are logged and skipped.
    pub fn visit_values(&mut self) {
        for value in &self.key.values {
            let outcome = decode_program_value(&mut self.fields, value);
            report_value_outcome(RecordKind::Program, &self.key.path, value, outcome);
        }
    }

    /// Finalize the entity
    pub fn finish(self) -> BuildResult<ProgramEntry> {
        ProgramEntry::from_fields(self.fields, self.key)
    }

    /// Build the entry for `key`, or log and drop it if it is malformed
    pub fn build(key: &KeyNode) -> Option<ProgramEntry> {
        let mut builder = ProgramRecordBuilder::new(key);
        builder.visit_values();

        match builder.finish() {
            Ok(entry) => Some(entry),
            Err(err) => {
                report_build_failure(RecordKind::Program, key, &err);
                None
            }
        }
    }
}
