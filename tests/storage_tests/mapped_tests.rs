//! Tests for MappedRegion
//!
//! These tests verify:
//! - Creating a new extent (sparse, zero-filled, exact size)
//! - Reopening an existing extent and the size policies
//! - Size validation (zero, unaligned, bad existing files)
//! - A failed create leaves no file behind
//! - Close idempotence and access after close

use std::fs;

use atomstore::config::SizePolicy;
use atomstore::storage::{check_extent, MappedRegion};
use atomstore::AtomError;
use tempfile::TempDir;

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_open_creates_file_of_requested_size() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    assert!(!path.exists());

    let region = MappedRegion::open_or_create(&path, 64 * 1024).unwrap();

    assert!(path.exists());
    assert!(region.was_created());
    assert!(!region.is_closed());
    assert_eq!(region.len(), 64 * 1024);
    assert_eq!(region.byte_range().unwrap().len(), 64 * 1024);
    assert_eq!(region.path(), path.as_path());
    assert_eq!(fs::metadata(&path).unwrap().len(), 64 * 1024);
}

#[test]
fn test_reopen_uses_on_disk_size() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    MappedRegion::open_or_create(&path, 256).unwrap().close().unwrap();

    let region = MappedRegion::open_or_create(&path, 1024).unwrap();
    assert!(!region.was_created());
    assert_eq!(region.len(), 256);
}

#[test]
fn test_exact_policy_accepts_matching_size() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    MappedRegion::open_or_create(&path, 256).unwrap().close().unwrap();

    let region = MappedRegion::open_with_policy(&path, 256, SizePolicy::Exact).unwrap();
    assert_eq!(region.len(), 256);
}

#[test]
fn test_exact_policy_rejects_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    MappedRegion::open_or_create(&path, 256).unwrap().close().unwrap();

    let result = MappedRegion::open_with_policy(&path, 512, SizePolicy::Exact);
    assert!(matches!(result, Err(AtomError::StorageInit { .. })));
}

// =============================================================================
// Size Validation Tests
// =============================================================================

#[test]
fn test_zero_size_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    let result = MappedRegion::open_or_create(&path, 0);
    assert!(matches!(result, Err(AtomError::StorageInit { .. })));
    assert!(!path.exists());
}

#[test]
fn test_unaligned_size_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    let err = MappedRegion::open_or_create(&path, 65).err().unwrap();
    assert!(matches!(err, AtomError::StorageInit { .. }));
    assert!(err.to_string().contains("not a multiple"));
}

#[test]
fn test_existing_unaligned_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");
    fs::write(&path, vec![0u8; 100]).unwrap();

    let result = MappedRegion::open_or_create(&path, 128);
    assert!(matches!(result, Err(AtomError::StorageInit { .. })));
}

#[test]
fn test_existing_empty_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");
    fs::write(&path, b"").unwrap();

    let result = MappedRegion::open_or_create(&path, 128);
    assert!(matches!(result, Err(AtomError::StorageInit { .. })));
}

#[test]
fn test_directory_path_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let err = MappedRegion::open_or_create(temp_dir.path(), 128).err().unwrap();
    match err {
        AtomError::StorageInit { path, .. } => assert_eq!(path, temp_dir.path()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_failed_create_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    // 2^60 bytes is aligned but cannot be sized or mapped on any test host
    let result = MappedRegion::open_or_create(&path, 1u64 << 60);
    assert!(matches!(result, Err(AtomError::StorageInit { .. })));
    assert!(!path.exists());

    let region = MappedRegion::open_or_create(&path, 1024 * 1024).unwrap();
    assert!(region.was_created());
    assert_eq!(region.len(), 1024 * 1024);
}

#[test]
fn test_failed_open_keeps_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    MappedRegion::open_or_create(&path, 256).unwrap().close().unwrap();

    let result = MappedRegion::open_with_policy(&path, 512, SizePolicy::Exact);
    assert!(matches!(result, Err(AtomError::StorageInit { .. })));
    assert_eq!(fs::metadata(&path).unwrap().len(), 256);
}

#[test]
fn test_check_extent_messages() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    assert!(check_extent(&path, 64).is_ok());
    assert!(check_extent(&path, 0)
        .unwrap_err()
        .to_string()
        .contains("must be positive"));
    assert!(check_extent(&path, 65)
        .unwrap_err()
        .to_string()
        .contains("not a multiple"));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_mutations_persist_through_close() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    let mut region = MappedRegion::open_or_create(&path, 128).unwrap();
    region.byte_range_mut().unwrap()[..4].copy_from_slice(b"ATOM");
    region.flush().unwrap();
    region.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"ATOM");
}

#[test]
fn test_access_after_close_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("region.zpa");

    let mut region = MappedRegion::open_or_create(&path, 128).unwrap();
    region.close().unwrap();
    region.close().unwrap();

    assert!(region.is_closed());
    assert!(matches!(region.byte_range(), Err(AtomError::EngineClosed)));
    assert!(matches!(region.byte_range_mut(), Err(AtomError::EngineClosed)));
    assert_eq!(region.len(), 128);
}
