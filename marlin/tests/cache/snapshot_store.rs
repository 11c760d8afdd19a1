use marlin::{MarlinError, SnapshotStore};

use crate::helpers::{sample_list, snapshot_path};

#[test]
fn missing_file_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(snapshot_path(dir.path()));
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_in_place_of_the_directory_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data"), b"not a directory").unwrap();
    let store = SnapshotStore::new(snapshot_path(dir.path()));
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn saved_snapshot_reloads_equal_in_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(snapshot_path(dir.path()));
    let list = sample_list(1_700_000_000);

    store.save(&list).unwrap();
    assert_eq!(store.load().unwrap(), Some(list));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("data"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("exchange.json")]);
}

#[test]
fn save_replaces_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(snapshot_path(dir.path()));
    store.save(&sample_list(1)).unwrap();
    store.save(&sample_list(2)).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert!(loaded.exchanges.iter().all(|e| e.last_update == 2));
}

#[test]
fn undecodable_file_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    std::fs::write(&path, b"{\"exchanges\": [").unwrap();
    let err = SnapshotStore::new(&path).load().unwrap_err();
    assert!(matches!(err, MarlinError::SnapshotCorrupt { .. }), "{err:?}");
}

#[test]
fn unwritable_location_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let err = SnapshotStore::new(snapshot_path(dir.path()))
        .save(&sample_list(1))
        .unwrap_err();
    assert!(matches!(err, MarlinError::Io { .. }), "{err:?}");
}
