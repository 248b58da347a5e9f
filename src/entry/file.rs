//! File entries (`Root\File\<volume>\<file>`)

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::{BuildResult, RecordBuildError};
use super::{report_build_failure, report_value_outcome, RecordKind};
use crate::codec::{decode_file_value, FileFields};
use crate::hive::KeyNode;

/// Program name given to files with no matching program
pub const UNASSOCIATED_PROGRAM_NAME: &str = "Unassociated";

/// An executed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub product_name: String,
    /// Lookup key into the programs; never an ownership edge
    pub program_id: Option<String>,
    pub sha1: String,
    pub full_path: String,
    pub last_modified_store: Option<DateTime<Utc>>,
    /// Name of the containing volume key
    pub volume_id: String,
    pub volume_last_write: DateTime<Utc>,
    /// Name of the file key
    pub file_id: String,
    pub file_last_write: DateTime<Utc>,
    pub is_local: bool,
    pub company_name: String,
    pub language_code: Option<i32>,
    pub file_version_string: String,
    pub file_version_number: String,
    pub file_description: String,
    pub pe_header_hash: String,
    pub pe_header_checksum: Option<u32>,
    pub bin_product_version: i64,
    pub bin_file_version: u64,
    pub linker_version: i32,
    pub binary_type: i32,
    pub switch_back_context: String,
    pub file_size: Option<i64>,
    pub link_date: Option<DateTime<Utc>>,
    pub size_of_image: Option<i64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub guess_program_id: i32,
    program_name: String,
}

impl FileEntry {
    /// Name of the linked program, or `"Unassociated"`.
    ///
    /// Empty until the linker has placed the entry.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    pub(crate) fn set_program_name(&mut self, name: impl Into<String>) {
        self.program_name = name.into();
    }

    fn from_fields(fields: FileFields, volume: &KeyNode, file: &KeyNode) -> BuildResult<Self> {
        if file.name.is_empty() {
            return Err(RecordBuildError::EmptyKeyName {
                key_path: file.path.clone(),
            });
        }

        let volume_last_write = last_write(volume)?;
        let file_last_write = last_write(file)?;

        Ok(Self {
            product_name: fields.product_name,
            program_id: fields.program_id,
            sha1: fields.sha1,
            full_path: fields.full_path,
            last_modified_store: fields.last_modified_store,
            volume_id: volume.name.clone(),
            volume_last_write,
            file_id: file.name.clone(),
            file_last_write,
            is_local: fields.is_local,
            company_name: fields.company_name,
            language_code: fields.language_code,
            file_version_string: fields.file_version_string,
            file_version_number: fields.file_version_number,
            file_description: fields.file_description,
            pe_header_hash: fields.pe_header_hash,
            pe_header_checksum: fields.pe_header_checksum,
            bin_product_version: fields.bin_product_version,
            bin_file_version: fields.bin_file_version,
            linker_version: fields.linker_version,
            binary_type: fields.binary_type,
            switch_back_context: fields.switch_back_context,
            file_size: fields.file_size,
            link_date: fields.link_date,
            size_of_image: fields.size_of_image,
            last_modified: fields.last_modified,
            created: fields.created,
            guess_program_id: fields.guess_program_id,
            program_name: String::new(),
        })
    }
}

fn last_write(key: &KeyNode) -> BuildResult<DateTime<Utc>> {
    key.last_write_time
        .ok_or_else(|| RecordBuildError::MissingLastWriteTime {
            key_path: key.path.clone(),
        })
}

/// Staging state for one File key under its volume key
pub struct FileRecordBuilder<'k> {
    volume: &'k KeyNode,
    file: &'k KeyNode,
    fields: FileFields,
}

impl<'k> FileRecordBuilder<'k> {
    pub fn new(volume: &'k KeyNode, file: &'k KeyNode) -> Self {
        Self {
            volume,
            file,
            fields: FileFields::default(),
        }
    }

    /// Route every value of the file key through the codec
    pub fn visit_values(&mut self) {
        for value in &self.file.values {
            let outcome = decode_file_value(&mut self.fields, value);
            report_value_outcome(RecordKind::File, &self.file.path, value, outcome);
        }
    }

    /// Whether the record resolved to a path at all
    pub fn has_full_path(&self) -> bool {
        !self.fields.full_path.is_empty()
    }

    /// Finalize the entity
    pub fn finish(self) -> BuildResult<FileEntry> {
        FileEntry::from_fields(self.fields, self.volume, self.file)
    }

    /// Build the entry for `file`.
    ///
    /// Returns `None` without logging when the record has no full path, and
    /// `None` with an error log when the record is malformed.
    pub fn build(volume: &KeyNode, file: &KeyNode) -> Option<FileEntry> {
        let mut builder = FileRecordBuilder::new(volume, file);
        builder.visit_values();

        if !builder.has_full_path() {
            return None;
        }
        builder.finish_or_report()
    }

    /// Finalize, logging and dropping a malformed record
    pub fn finish_or_report(self) -> Option<FileEntry> {
        let file = self.file;
        match self.finish() {
            Ok(entry) => Some(entry),
            Err(err) => {
                report_build_failure(RecordKind::File, file, &err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::capture::CapturedLogs;
    use crate::observability::Event;
    use chrono::TimeZone;

    fn written() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 2, 20, 8, 0, 0).unwrap()
    }

    fn volume_key() -> KeyNode {
        KeyNode::new(r"Root\File\{a2bb4b6c-6d2b-11e3-be6c-806e6f6e6963}").with_last_write(written())
    }

    fn file_key(name: &str, path: &str) -> KeyNode {
        KeyNode::new(format!(
            r"Root\File\{{a2bb4b6c-6d2b-11e3-be6c-806e6f6e6963}}\{}",
            name
        ))
        .with_last_write(written())
        .with_value("15", path)
        .with_value("100", "p1")
        .with_value("101", "0000f2e4f8c8d2a4e6f3c7e3f2d6c1b0a9e8d7c6b5a4")
    }

    #[test]
    fn test_build_file_entry() {
        let entry = FileRecordBuilder::build(&volume_key(), &file_key("1000a", r"C:\Tools\a.exe"))
            .unwrap();

        assert_eq!(entry.full_path, r"C:\Tools\a.exe");
        assert_eq!(entry.program_id.as_deref(), Some("p1"));
        assert_eq!(entry.volume_id, "{a2bb4b6c-6d2b-11e3-be6c-806e6f6e6963}");
        assert_eq!(entry.file_id, "1000a");
        assert_eq!(entry.file_last_write, written());
        assert_eq!(entry.program_name(), "");
    }

    #[test]
    fn test_empty_path_skipped_silently() {
        let logs = CapturedLogs::default();
        let file = file_key("1000b", "");

        let entry = logs.capture(|| FileRecordBuilder::build(&volume_key(), &file));

        assert!(entry.is_none());
        assert_eq!(logs.count(Event::RecordBuildFailed.as_str()), 0);
    }

    #[test]
    fn test_missing_path_value_skipped() {
        let file = KeyNode::new(r"Root\File\v\1").with_last_write(written());
        assert!(FileRecordBuilder::build(&volume_key(), &file).is_none());
    }

    #[test]
    fn test_unknown_code_warns_per_occurrence() {
        let logs = CapturedLogs::default();
        let file = file_key("1000c", r"C:\b.exe")
            .with_value("13", "x")
            .with_value("14", "y");

        let entry = logs.capture(|| FileRecordBuilder::build(&volume_key(), &file));

        assert!(entry.is_some());
        assert_eq!(logs.count(Event::UnknownFileValue.as_str()), 2);
    }

    #[test]
    fn test_bad_field_keeps_record() {
        let logs = CapturedLogs::default();
        let file = file_key("1000d", r"C:\c.exe").with_value("6", "huge?");

        let entry = logs
            .capture(|| FileRecordBuilder::build(&volume_key(), &file))
            .unwrap();

        assert_eq!(entry.file_size, None);
        assert_eq!(logs.count(Event::FieldDecodeFailed.as_str()), 1);
    }

    #[test]
    fn test_volume_without_last_write_drops_record() {
        let logs = CapturedLogs::default();
        let volume = KeyNode::new(r"Root\File\v");
        let file = file_key("1000e", r"C:\d.exe");

        let entry = logs.capture(|| FileRecordBuilder::build(&volume, &file));

        assert!(entry.is_none());
        assert_eq!(logs.count(Event::RecordBuildFailed.as_str()), 1);
    }
}
