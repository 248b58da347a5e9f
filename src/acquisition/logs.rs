//! Sibling transaction log discovery

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Find `<base>.LOG?` siblings of the store at `store_path`.
///
/// The prefix match is ASCII case-insensitive and exactly one character
/// must follow it. Results are sorted by file name. A path without a parent
/// directory is searched in the current directory.
pub fn discover_sibling_logs(store_path: &Path) -> io::Result<Vec<PathBuf>> {
    let dir = match store_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let base = match store_path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return Ok(Vec::new()),
    };
    let prefix = format!("{}.LOG", base);

    let mut logs = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if is_sibling_log_name(&prefix, name) {
                logs.push(entry.path());
            }
        }
    }

    logs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(logs)
}

fn is_sibling_log_name(prefix: &str, name: &str) -> bool {
    if name.len() <= prefix.len() || !name.is_char_boundary(prefix.len()) {
        return false;
    }
    let (head, tail) = name.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix) && tail.chars().count() == 1
}
