//! Tests for RealFileSystem as used by the JSON store and uploads

use std::fs;

use tempfile::TempDir;

use saurieng::infrastructure::traits::{FileSystem, RealFileSystem};

#[test]
fn given_nested_path_when_ensure_parent_then_creates_directories() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("a/b/gardens.json");
    let fs = RealFileSystem;

    // Act
    fs.ensure_parent(&target).unwrap();

    // Assert
    assert!(temp.path().join("a/b").is_dir());
    assert!(!target.exists());
}

#[test]
fn given_bare_file_name_when_ensure_parent_then_noop() {
    let fs = RealFileSystem;
    fs.ensure_parent(std::path::Path::new("gardens.json")).unwrap();
}

#[test]
fn given_staged_file_when_renaming_over_target_then_target_replaced() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("gardens.json");
    let staging = temp.path().join("gardens.json.tmp");
    let fs = RealFileSystem;
    fs.write(&target, "old").unwrap();
    fs.write(&staging, "new").unwrap();

    // Act
    fs.rename(&staging, &target).unwrap();

    // Assert
    assert_eq!(fs.read_to_string(&target).unwrap(), "new");
    assert!(!fs.exists(&staging));
}

#[test]
fn given_binary_content_when_write_bytes_then_round_trips() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("photo.jpg");
    let fs = RealFileSystem;

    fs.write_bytes(&target, &[0xff, 0xd8, 0x00, 0x10]).unwrap();

    assert_eq!(fs::read(&target).unwrap(), vec![0xff, 0xd8, 0x00, 0x10]);
}
