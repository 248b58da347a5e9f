//! Locked stores: elevation gate and raw-copy fallback

mod common;

use std::sync::Arc;

use amcache::acquisition::AcquisitionManager;
use amcache::observability::Event;
use amcache::{AmcacheEngine, AmcacheError};
use common::*;
use tempfile::TempDir;

fn locked_engine(elevated: bool, copier: MemoryCopier) -> AmcacheEngine {
    AmcacheEngine::new(json_decoder).with_acquisition(AcquisitionManager::new(
        Box::new(LockedOpener),
        Box::new(FixedElevation(elevated)),
        Box::new(copier),
    ))
}

fn tree() -> amcache::KeyNode {
    root(
        vec![program_key("P1", "Editor")],
        vec![volume_key(
            "v",
            vec![file_key("v", "1", r"C:\Editor\edit.exe", Some("P1"))],
        )],
    )
}

#[test]
fn test_locked_store_without_elevation_is_permission_error() {
    let dir = TempDir::new().unwrap();
    let path = write_store(dir.path(), &clean_image(&tree()));
    let copier = MemoryCopier::default();
    let requested = Arc::clone(&copier.requested);

    let err = locked_engine(false, copier).run(&path).unwrap_err();

    assert!(matches!(err, AmcacheError::Permission { .. }));
    assert_eq!(err.code(), "AMCACHE_PERMISSION_DENIED");
    assert!(requested.lock().unwrap().is_empty());
}

#[test]
fn test_locked_store_raw_copied_when_elevated() {
    let dir = TempDir::new().unwrap();
    let path = write_store(dir.path(), &clean_image(&tree()));

    let logs = CapturedLogs::default();
    let output = logs
        .capture(|| locked_engine(true, MemoryCopier::default()).run(&path))
        .unwrap();

    assert_eq!(output.programs.len(), 1);
    assert_eq!(output.programs[0].file_entries().len(), 1);

    let reroutes = logs.with_code(Event::StoreInUseReroute.as_str());
    assert_eq!(reroutes.len(), 1);
    assert_eq!(reroutes[0].level, tracing::Level::INFO);
}

#[test]
fn test_raw_copy_requests_store_then_sibling_logs() {
    let dir = TempDir::new().unwrap();
    let path = write_store(dir.path(), &clean_image(&tree()));
    std::fs::write(dir.path().join("Amcache.hve.LOG2"), b"").unwrap();
    std::fs::write(dir.path().join("Amcache.hve.LOG1"), b"").unwrap();
    std::fs::write(dir.path().join("Amcache.hve.LOG"), b"").unwrap();
    std::fs::write(dir.path().join("Amcache.hve.LOG10"), b"").unwrap();

    let copier = MemoryCopier::default();
    let requested = Arc::clone(&copier.requested);
    locked_engine(true, copier).run(&path).unwrap();

    let names: Vec<String> = requested
        .lock()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Amcache.hve", "Amcache.hve.LOG1", "Amcache.hve.LOG2"]);
}

#[test]
fn test_raw_copied_logs_replace_disk_lookup() {
    let dir = TempDir::new().unwrap();
    let path = write_store(dir.path(), &dirty_image(&tree()));
    // Locked on disk: only the raw copy sees the real content
    std::fs::write(dir.path().join("Amcache.hve.LOG1"), b"locked").unwrap();

    let after = root(
        vec![program_key("P1", "Editor"), program_key("P2", "Shell")],
        vec![volume_key(
            "v",
            vec![file_key("v", "1", r"C:\Editor\edit.exe", Some("P1"))],
        )],
    );
    let copier = MemoryCopier::default().with("Amcache.hve.LOG1", replacement_log(&after));

    let output = locked_engine(true, copier).run(&path).unwrap();

    assert_eq!(output.programs.len(), 2);
}

#[test]
fn test_raw_copy_of_dirty_store_without_logs_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_store(dir.path(), &dirty_image(&tree()));

    let err = locked_engine(true, MemoryCopier::default())
        .run(&path)
        .unwrap_err();

    assert!(matches!(err, AmcacheError::Recovery(_)));
}

#[test]
fn test_missing_store_is_acquisition_error() {
    let dir = TempDir::new().unwrap();
    let err = AmcacheEngine::new(json_decoder)
        .run(&dir.path().join("Amcache.hve"))
        .unwrap_err();

    assert!(matches!(err, AmcacheError::Acquisition(_)));
    assert_eq!(err.code(), "AMCACHE_ACQUISITION_IO_ERROR");
}
