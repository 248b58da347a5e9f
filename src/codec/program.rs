//! Program record field table
//!
//! Value names under `Root\Programs\<id>` are short literal tokens. Each
//! known token maps to one field of [`ProgramFields`] through a typed
//! setter. Tokens 4, 8, 9, c and e have no known meaning and fall through
//! as unknown.

use chrono::{DateTime, Utc};

use super::convert::{epoch_seconds, parse_int};
use super::FieldSpec;
use crate::hive::KeyValue;

/// Decoded fields of one Program record, before the entity is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramFields {
    pub name: String,
    pub version: String,
    pub vendor: String,
    pub locale_id: String,
    pub dword_5: i32,
    pub install_source: String,
    pub uninstall_key: String,
    pub install_date: Option<DateTime<Utc>>,
    pub uninstall_date: Option<DateTime<Utc>>,
    pub path_list: String,
    pub guid_f: String,
    pub guid_10: String,
    pub uninstall_guid_11: String,
    pub guid_12: String,
    pub dword_13: i32,
    pub dword_14: i32,
    pub dword_15: i32,
    pub unknown_bytes: Vec<u8>,
    pub qword_17: i64,
    pub dword_18: i32,
    pub raw_files: String,
}

type ProgramSpec = FieldSpec<&'static str, ProgramFields>;

fn text(value: &KeyValue) -> String {
    value.data.clone()
}

/// Program token table, in stored-token order
pub static PROGRAM_FIELDS: &[ProgramSpec] = &[
    ProgramSpec {
        token: "0",
        field: "ProgramName",
        apply: |f, v| {
            f.name = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "1",
        field: "ProgramVersion",
        apply: |f, v| {
            f.version = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "2",
        field: "VendorName",
        apply: |f, v| {
            f.vendor = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "3",
        field: "LocaleID",
        apply: |f, v| {
            f.locale_id = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "5",
        field: "Dword5",
        apply: |f, v| {
            f.dword_5 = parse_int(&v.data)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "6",
        field: "InstallSource",
        apply: |f, v| {
            f.install_source = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "7",
        field: "UninstallKey",
        apply: |f, v| {
            f.uninstall_key = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "a",
        field: "InstallDate",
        apply: |f, v| {
            // Some installers write values far outside the epoch range
            f.install_date = epoch_seconds(&v.data, true)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "b",
        field: "UninstallDate",
        apply: |f, v| {
            f.uninstall_date = epoch_seconds(&v.data, false)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "d",
        field: "PathList",
        apply: |f, v| {
            f.path_list = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "f",
        field: "GuidF",
        apply: |f, v| {
            f.guid_f = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "10",
        field: "Guid10",
        apply: |f, v| {
            f.guid_10 = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "11",
        field: "UninstallGuid11",
        apply: |f, v| {
            f.uninstall_guid_11 = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "12",
        field: "Guid12",
        apply: |f, v| {
            f.guid_12 = text(v);
            Ok(())
        },
    },
    ProgramSpec {
        token: "13",
        field: "Dword13",
        apply: |f, v| {
            f.dword_13 = parse_int(&v.data)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "14",
        field: "Dword14",
        apply: |f, v| {
            f.dword_14 = parse_int(&v.data)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "15",
        field: "Dword15",
        apply: |f, v| {
            f.dword_15 = parse_int(&v.data)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "16",
        field: "UnknownBytes",
        apply: |f, v| {
            f.unknown_bytes = v.raw.clone();
            Ok(())
        },
    },
    ProgramSpec {
        token: "17",
        field: "Qword17",
        apply: |f, v| {
            f.qword_17 = parse_int(&v.data)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "18",
        field: "Dword18",
        apply: |f, v| {
            f.dword_18 = parse_int(&v.data)?;
            Ok(())
        },
    },
    ProgramSpec {
        token: "Files",
        field: "Files",
        apply: |f, v| {
            f.raw_files = text(v);
            Ok(())
        },
    },
];

/// Find the table entry for a Program value name
pub fn lookup(token: &str) -> Option<&'static ProgramSpec> {
    PROGRAM_FIELDS.iter().find(|spec| spec.token == token)
}
