//! Two-pass scan linking File entries to Program entries

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

use crate::entry::{
    FileEntry, FileRecordBuilder, ProgramEntry, ProgramRecordBuilder, UNASSOCIATED_PROGRAM_NAME,
};
use crate::hive::KeyNode;
use crate::observability::Event;

use super::errors::StructureError;

/// Sub-tree holding one key per program
pub const PROGRAMS_SUBTREE: &str = "Programs";

/// Sub-tree holding volume keys, each holding one key per file
pub const FILES_SUBTREE: &str = "File";

/// The finished scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AmcacheOutput {
    /// Programs in scan order, each owning its linked files
    pub programs: Vec<ProgramEntry>,
    /// Files with no matching program when decoded, in scan order
    pub unassociated: Vec<FileEntry>,
    /// File records with a full path, linked or not
    pub total_file_entries: usize,
}

/// Links File entries to Program entries by ProgramID.
///
/// The lookup for a file happens once, when the file is linked. A program
/// added afterwards never claims a file that already went to the
/// unassociated list.
#[derive(Debug, Default)]
pub struct ReconciliationLinker {
    programs: Vec<ProgramEntry>,
    /// ProgramID -> index into `programs`; first occurrence wins
    by_id: HashMap<String, usize>,
    unassociated: Vec<FileEntry>,
    total_file_entries: usize,
}

impl ReconciliationLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` (the store's root key): every program, then every file.
    ///
    /// # Errors
    ///
    /// `StructureError` if either sub-tree is missing. Nothing is decoded in
    /// that case.
    pub fn scan(root: &KeyNode) -> Result<AmcacheOutput, StructureError> {
        let files = root.subkey(FILES_SUBTREE);
        let programs = root.subkey(PROGRAMS_SUBTREE);

        let (files, programs) = match (files, programs) {
            (Some(files), Some(programs)) => (files, programs),
            (files, programs) => {
                let missing = [
                    (FILES_SUBTREE, files.is_none()),
                    (PROGRAMS_SUBTREE, programs.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect::<Vec<_>>()
                .join(", ");
                tracing::error!(
                    event = Event::MissingSubtree.as_str(),
                    root = %root.path,
                    missing = missing.as_str(),
                    "Store does not contain a File and/or Programs key, processing cannot continue"
                );
                return Err(StructureError::MissingSubtree {
                    root: root.path.clone(),
                    missing,
                });
            }
        };

        let mut linker = Self::new();

        tracing::debug!(
            event = Event::ProgramsDecodeBegin.as_str(),
            keys = programs.subkeys.len(),
            "Decoding Programs"
        );
        for key in &programs.subkeys {
            if let Some(program) = ProgramRecordBuilder::build(key) {
                linker.add_program(program);
            }
        }

        tracing::debug!(
            event = Event::FilesDecodeBegin.as_str(),
            volumes = files.subkeys.len(),
            "Decoding Files"
        );
        for volume in &files.subkeys {
            for file in &volume.subkeys {
                let mut builder = FileRecordBuilder::new(volume, file);
                builder.visit_values();
                if !builder.has_full_path() {
                    continue;
                }
                linker.count_file_record();
                if let Some(entry) = builder.finish_or_report() {
                    linker.link_file(entry);
                }
            }
        }

        Ok(linker.finish())
    }

    /// Add a decoded program.
    ///
    /// Returns `false` when its ProgramID was already taken; the program is
    /// still kept in the output but files never link to it.
    pub fn add_program(&mut self, program: ProgramEntry) -> bool {
        let index = self.programs.len();
        let first = match self.by_id.entry(program.program_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(index);
                true
            }
        };
        self.programs.push(program);
        first
    }

    /// Place a decoded file with its program, or in the unassociated list.
    ///
    /// Returns whether a program matched.
    pub fn link_file(&mut self, mut file: FileEntry) -> bool {
        let matched = file
            .program_id
            .as_deref()
            .and_then(|id| self.by_id.get(id))
            .copied();

        match matched {
            Some(index) => {
                let program = &mut self.programs[index];
                file.set_program_name(program.name.clone());
                program.push_file(file);
                true
            }
            None => {
                file.set_program_name(UNASSOCIATED_PROGRAM_NAME);
                self.unassociated.push(file);
                false
            }
        }
    }

    /// Count a file record that had a full path, whether or not it linked
    pub fn count_file_record(&mut self) {
        self.total_file_entries += 1;
    }

    pub fn finish(self) -> AmcacheOutput {
        AmcacheOutput {
            programs: self.programs,
            unassociated: self.unassociated,
            total_file_entries: self.total_file_entries,
        }
    }
}
