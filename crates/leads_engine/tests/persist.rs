use std::fs;

use leads_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn nested_download_dir_is_created() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("exports").join("ottawa");

    ensure_output_dir(&dir).unwrap();
    assert!(dir.is_dir());
    // Second call is a no-op on an existing directory.
    ensure_output_dir(&dir).unwrap();
}

#[test]
fn saving_twice_overwrites_and_leaves_no_part_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let path = writer.write("run-1.csv", b"Company\nA\n").unwrap();
    let again = writer.write("run-1.csv", b"Company\nB\n").unwrap();

    assert_eq!(path, again);
    assert_eq!(fs::read_to_string(&path).unwrap(), "Company\nB\n");
    let leftovers: Vec<_> = fs::read_dir(writer.dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn file_in_place_of_dir_is_reported() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("downloads");
    fs::write(&blocker, "not a directory").unwrap();

    let writer = AtomicFileWriter::new(blocker.clone());
    let err = writer.write("run-1.csv", b"data").unwrap_err();

    assert!(matches!(err, PersistError::OutputDir { .. }));
    assert!(!temp.path().join("run-1.csv").exists());
}
