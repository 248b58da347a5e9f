//! Value codec for Amcache records
//!
//! Maps a record's raw values onto typed fields through one static table
//! per record kind. Each table entry pairs a key token with a domain field
//! name and a typed setter. Pure: no I/O and no logging; the record
//! builders decide what to report.
//!
//! # Outcomes per value
//!
//! - Known token, text decodes: field set
//! - Known token, text does not decode: `FieldDecodeError`, field left as is
//! - Unknown token: reported back as `FieldOutcome::Unknown`

mod convert;
mod errors;
mod file;
mod program;

pub use convert::{epoch_seconds, filetime_to_utc, parse_int, unix_seconds_to_utc};
pub use errors::{ConvertError, FieldDecodeError};
pub use file::{FileFields, FILE_FIELDS};
pub use program::{ProgramFields, PROGRAM_FIELDS};

use crate::hive::KeyValue;

/// Typed setter applied to a record's staging fields
pub type Setter<T> = fn(&mut T, &KeyValue) -> Result<(), ConvertError>;

/// One entry of a field table
pub struct FieldSpec<K, T> {
    /// Key token as it appears in the value name
    pub token: K,
    /// Domain field name, used in diagnostics
    pub field: &'static str,
    /// Decoder and setter
    pub apply: Setter<T>,
}

/// What happened to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Value decoded into the named field
    Applied(&'static str),
    /// Value name is not in the table
    Unknown,
}

/// Decode one Program value into `fields`
pub fn decode_program_value(
    fields: &mut ProgramFields,
    value: &KeyValue,
) -> Result<FieldOutcome, FieldDecodeError> {
    match program::lookup(&value.name) {
        Some(spec) => apply(spec, fields, value),
        None => Ok(FieldOutcome::Unknown),
    }
}

/// Decode one File value into `fields`
pub fn decode_file_value(
    fields: &mut FileFields,
    value: &KeyValue,
) -> Result<FieldOutcome, FieldDecodeError> {
    match file::parse_code(&value.name).and_then(file::lookup) {
        Some(spec) => apply(spec, fields, value),
        None => Ok(FieldOutcome::Unknown),
    }
}

fn apply<K, T>(
    spec: &FieldSpec<K, T>,
    fields: &mut T,
    value: &KeyValue,
) -> Result<FieldOutcome, FieldDecodeError> {
    (spec.apply)(fields, value)
        .map(|()| FieldOutcome::Applied(spec.field))
        .map_err(|source| FieldDecodeError::new(spec.field, &value.name, &value.data, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn value(name: &str, data: &str) -> KeyValue {
        KeyValue::text(name, data)
    }

    // =========================================================================
    // Program values
    // =========================================================================

    #[test]
    fn test_program_text_fields() {
        let mut fields = ProgramFields::default();
        for (name, data) in [
            ("0", "7-Zip 9.20 (x64 edition)"),
            ("1", "9.20.00.0"),
            ("2", "Igor Pavlov"),
            ("3", "1033"),
            ("6", "C:\\Users\\tester\\Downloads\\"),
            ("7", "{23170F69-40C1-2702-0920-000001000000}"),
            ("d", "C:\\Program Files\\7-Zip\\"),
            ("f", "{23170F69-40C1-2702-0920-000001000000}"),
            ("Files", "0000ad2cb2ab0fcc3a9e5b6ec16fb0d8e0d700000904"),
        ] {
            assert!(matches!(
                decode_program_value(&mut fields, &value(name, data)).unwrap(),
                FieldOutcome::Applied(_)
            ));
        }

        assert_eq!(fields.name, "7-Zip 9.20 (x64 edition)");
        assert_eq!(fields.version, "9.20.00.0");
        assert_eq!(fields.vendor, "Igor Pavlov");
        assert_eq!(fields.locale_id, "1033");
        assert_eq!(fields.path_list, "C:\\Program Files\\7-Zip\\");
        assert_eq!(fields.raw_files, "0000ad2cb2ab0fcc3a9e5b6ec16fb0d8e0d700000904");
    }

    #[test]
    fn test_program_integer_fields_are_distinct() {
        let mut fields = ProgramFields::default();
        decode_program_value(&mut fields, &value("13", "1")).unwrap();
        decode_program_value(&mut fields, &value("14", "2")).unwrap();
        decode_program_value(&mut fields, &value("15", "3")).unwrap();
        decode_program_value(&mut fields, &value("17", "4294967296")).unwrap();

        assert_eq!((fields.dword_13, fields.dword_14, fields.dword_15), (1, 2, 3));
        assert_eq!(fields.qword_17, 4_294_967_296);
    }

    #[test]
    fn test_program_raw_bytes_field() {
        let mut fields = ProgramFields::default();
        let raw = KeyValue::new("16", vec![0xde, 0xad, 0xbe, 0xef], "DE-AD-BE-EF");
        decode_program_value(&mut fields, &raw).unwrap();
        assert_eq!(fields.unknown_bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_program_install_date_tolerates_huge_value() {
        let mut fields = ProgramFields::default();
        let outcome =
            decode_program_value(&mut fields, &value("a", "184467440737095516150")).unwrap();
        assert_eq!(outcome, FieldOutcome::Applied("InstallDate"));
        assert_eq!(fields.install_date, None);
    }

    #[test]
    fn test_program_uninstall_date_huge_value_fails() {
        let mut fields = ProgramFields::default();
        let err =
            decode_program_value(&mut fields, &value("b", "184467440737095516150")).unwrap_err();
        assert_eq!(err.field, "UninstallDate");
        assert_eq!(fields.uninstall_date, None);
    }

    #[test]
    fn test_program_epoch_dates() {
        let mut fields = ProgramFields::default();
        decode_program_value(&mut fields, &value("a", "1392824592")).unwrap();
        decode_program_value(&mut fields, &value("b", "0")).unwrap();

        assert_eq!(
            fields.install_date,
            Some(Utc.with_ymd_and_hms(2014, 2, 19, 15, 43, 12).unwrap())
        );
        assert_eq!(fields.uninstall_date, None);
    }

    #[test]
    fn test_program_unknown_token() {
        let mut fields = ProgramFields::default();
        let outcome = decode_program_value(&mut fields, &value("4", "whatever")).unwrap();
        assert_eq!(outcome, FieldOutcome::Unknown);
        assert_eq!(fields, ProgramFields::default());
    }

    #[test]
    fn test_program_bad_integer_scoped_to_field() {
        let mut fields = ProgramFields::default();
        let err = decode_program_value(&mut fields, &value("5", "n/a")).unwrap_err();

        assert_eq!(err.field, "Dword5");
        assert_eq!(err.value_name, "5");
        assert_eq!(err.value_data, "n/a");
        assert_eq!(fields.dword_5, 0);
    }

    // =========================================================================
    // File values
    // =========================================================================

    #[test]
    fn test_file_fields_by_hex_code() {
        let mut fields = FileFields::default();
        for (name, data) in [
            ("0", "Microsoft® Windows® Operating System"),
            ("1", "Microsoft Corporation"),
            ("3", "1033"),
            ("6", "193536"),
            ("9", "212468"),
            ("b", "1688854155231232"),
            ("d", "655370"),
            ("f", "1247527595"),
            ("15", "C:\\Windows\\System32\\notepad.exe"),
            ("16", "1"),
            ("100", "0000f519feec486de87ed73cb92d3cac802400000000"),
            ("101", "0000f2e4f8c8d2a4e6f3c7e3f2d6c1b0a9e8d7c6b5a4"),
            ("106", "2"),
        ] {
            assert!(matches!(
                decode_file_value(&mut fields, &value(name, data)).unwrap(),
                FieldOutcome::Applied(_)
            ));
        }

        assert_eq!(fields.company_name, "Microsoft Corporation");
        assert_eq!(fields.language_code, Some(1033));
        assert_eq!(fields.file_size, Some(193_536));
        assert_eq!(fields.pe_header_checksum, Some(212_468));
        assert_eq!(fields.bin_file_version, 1_688_854_155_231_232);
        assert_eq!(fields.linker_version, 655_370);
        assert_eq!(
            fields.link_date,
            Some(Utc.with_ymd_and_hms(2009, 7, 13, 23, 26, 35).unwrap())
        );
        assert_eq!(fields.full_path, "C:\\Windows\\System32\\notepad.exe");
        assert!(fields.is_local);
        assert_eq!(
            fields.program_id.as_deref(),
            Some("0000f519feec486de87ed73cb92d3cac802400000000")
        );
        assert_eq!(fields.guess_program_id, 2);
    }

    #[test]
    fn test_file_filetime_fields() {
        let mut fields = FileFields::default();
        decode_file_value(&mut fields, &value("11", "130372981920000000")).unwrap();
        decode_file_value(&mut fields, &value("12", "130372981920000000")).unwrap();
        decode_file_value(&mut fields, &value("17", "130372981920000000")).unwrap();

        let expected = Some(Utc.with_ymd_and_hms(2014, 2, 19, 15, 43, 12).unwrap());
        assert_eq!(fields.last_modified, expected);
        assert_eq!(fields.created, expected);
        assert_eq!(fields.last_modified_store, expected);
    }

    #[test]
    fn test_file_unknown_codes() {
        let mut fields = FileFields::default();
        for name in ["e", "13", "14", "200", "Name"] {
            assert_eq!(
                decode_file_value(&mut fields, &value(name, "x")).unwrap(),
                FieldOutcome::Unknown
            );
        }
    }

    #[test]
    fn test_file_bad_checksum_scoped_to_field() {
        let mut fields = FileFields::default();
        let err = decode_file_value(&mut fields, &value("9", "-5")).unwrap_err();
        assert_eq!(err.field, "PEHeaderChecksum");
        assert_eq!(fields.pe_header_checksum, None);
    }

    #[test]
    fn test_file_negative_filetime_fails() {
        let mut fields = FileFields::default();
        let err = decode_file_value(&mut fields, &value("12", "-1")).unwrap_err();
        assert_eq!(err.field, "Created");
        assert!(matches!(err.source, ConvertError::TimestampOutOfRange { .. }));
    }
}
