//! File record field table
//!
//! Value names under `Root\File\<volume>\<file>` are hexadecimal codes.
//! Codes 0xe, 0x13 and 0x14 have no known meaning and fall through as
//! unknown, as do names that are not hexadecimal at all.

use chrono::{DateTime, Utc};

use super::convert::{filetime_to_utc, parse_int, unix_seconds_to_utc};
use super::errors::ConvertError;
use super::FieldSpec;
use crate::hive::KeyValue;

/// Decoded fields of one File record, before the entity is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFields {
    pub product_name: String,
    pub company_name: String,
    pub file_version_number: String,
    pub language_code: Option<i32>,
    pub switch_back_context: String,
    pub file_version_string: String,
    pub file_size: Option<i64>,
    pub size_of_image: Option<i64>,
    pub pe_header_hash: String,
    pub pe_header_checksum: Option<u32>,
    pub bin_product_version: i64,
    pub bin_file_version: u64,
    pub file_description: String,
    pub linker_version: i32,
    pub link_date: Option<DateTime<Utc>>,
    pub binary_type: i32,
    pub last_modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub full_path: String,
    pub is_local: bool,
    pub last_modified_store: Option<DateTime<Utc>>,
    pub program_id: Option<String>,
    pub sha1: String,
    pub guess_program_id: i32,
}

type FileSpec = FieldSpec<u32, FileFields>;

fn text(value: &KeyValue) -> String {
    value.data.clone()
}

fn filetime(value: &KeyValue) -> Result<Option<DateTime<Utc>>, ConvertError> {
    let ticks: i64 = parse_int(&value.data)?;
    filetime_to_utc(ticks).map(Some)
}

/// File code table, ordered by code
pub static FILE_FIELDS: &[FileSpec] = &[
    FileSpec {
        token: 0x0,
        field: "ProductName",
        apply: |f, v| {
            f.product_name = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x1,
        field: "CompanyName",
        apply: |f, v| {
            f.company_name = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x2,
        field: "FileVersionNumber",
        apply: |f, v| {
            f.file_version_number = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x3,
        field: "LanguageCode",
        apply: |f, v| {
            f.language_code = Some(parse_int(&v.data)?);
            Ok(())
        },
    },
    FileSpec {
        token: 0x4,
        field: "SwitchBackContext",
        apply: |f, v| {
            f.switch_back_context = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x5,
        field: "FileVersionString",
        apply: |f, v| {
            f.file_version_string = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x6,
        field: "FileSize",
        apply: |f, v| {
            f.file_size = Some(parse_int(&v.data)?);
            Ok(())
        },
    },
    FileSpec {
        token: 0x7,
        field: "SizeOfImage",
        apply: |f, v| {
            f.size_of_image = Some(parse_int(&v.data)?);
            Ok(())
        },
    },
    FileSpec {
        token: 0x8,
        field: "PEHeaderHash",
        apply: |f, v| {
            f.pe_header_hash = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x9,
        field: "PEHeaderChecksum",
        apply: |f, v| {
            f.pe_header_checksum = Some(parse_int(&v.data)?);
            Ok(())
        },
    },
    FileSpec {
        token: 0xa,
        field: "BinProductVersion",
        apply: |f, v| {
            f.bin_product_version = parse_int(&v.data)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0xb,
        field: "BinFileVersion",
        apply: |f, v| {
            f.bin_file_version = parse_int(&v.data)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0xc,
        field: "FileDescription",
        apply: |f, v| {
            f.file_description = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0xd,
        field: "LinkerVersion",
        apply: |f, v| {
            f.linker_version = parse_int(&v.data)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0xf,
        field: "LinkDate",
        apply: |f, v| {
            f.link_date = Some(unix_seconds_to_utc(parse_int(&v.data)?)?);
            Ok(())
        },
    },
    FileSpec {
        token: 0x10,
        field: "BinaryType",
        apply: |f, v| {
            f.binary_type = parse_int(&v.data)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0x11,
        field: "LastModified",
        apply: |f, v| {
            f.last_modified = filetime(v)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0x12,
        field: "Created",
        apply: |f, v| {
            f.created = filetime(v)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0x15,
        field: "FullPath",
        apply: |f, v| {
            f.full_path = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x16,
        field: "IsLocal",
        apply: |f, v| {
            f.is_local = parse_int::<i32>(&v.data)? != 0;
            Ok(())
        },
    },
    FileSpec {
        token: 0x17,
        field: "LastModifiedStore",
        apply: |f, v| {
            f.last_modified_store = filetime(v)?;
            Ok(())
        },
    },
    FileSpec {
        token: 0x100,
        field: "ProgramID",
        apply: |f, v| {
            f.program_id = Some(text(v));
            Ok(())
        },
    },
    FileSpec {
        token: 0x101,
        field: "SHA1",
        apply: |f, v| {
            f.sha1 = text(v);
            Ok(())
        },
    },
    FileSpec {
        token: 0x106,
        field: "GuessProgramID",
        apply: |f, v| {
            f.guess_program_id = parse_int(&v.data)?;
            Ok(())
        },
    },
];

/// Parse a File value name into its code
pub fn parse_code(value_name: &str) -> Option<u32> {
    if value_name.is_empty() {
        return None;
    }
    u32::from_str_radix(value_name, 16).ok()
}

/// Find the table entry for a File value code
pub fn lookup(code: u32) -> Option<&'static FileSpec> {
    FILE_FIELDS
        .binary_search_by_key(&code, |spec| spec.token)
        .ok()
        .map(|index| &FILE_FIELDS[index])
}
