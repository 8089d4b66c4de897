//! Unit tests for file_device.rs

use crate::error::RioError;
use crate::file_device::{FileDevice, FsFileDevice, MemoryFileDevice};

// ============================================================================
// MEMORY FILE DEVICE
// ============================================================================

#[test]
fn test_memory_device_load_registered_file() {
    let mut device = MemoryFileDevice::new();
    assert!(device.is_empty());

    device.insert("shaders/sky.vert", b"void main() {}".to_vec());

    assert!(device.contains("shaders/sky.vert"));
    assert_eq!(device.len(), 1);
    assert_eq!(device.load("shaders/sky.vert").unwrap(), b"void main() {}".to_vec());
}

#[test]
fn test_memory_device_missing_file_is_io_error() {
    let device = MemoryFileDevice::new();
    match device.load("textures/none.rtx") {
        Err(RioError::Io(msg)) => assert!(msg.contains("textures/none.rtx")),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_memory_device_insert_replaces() {
    let mut device = MemoryFileDevice::new();
    device.insert("a", vec![1]);
    device.insert("a", vec![2, 3]);
    assert_eq!(device.load("a").unwrap(), vec![2, 3]);
    assert_eq!(device.len(), 1);
}

// ============================================================================
// FILESYSTEM FILE DEVICE
// ============================================================================

#[test]
fn test_fs_device_reads_relative_to_root() {
    let root = std::env::temp_dir().join(format!("rio_gpu_fs_device_{}", std::process::id()));
    std::fs::create_dir_all(root.join("textures")).unwrap();
    std::fs::write(root.join("textures/blob.bin"), [9u8, 8, 7]).unwrap();

    let device = FsFileDevice::new(&root);
    assert_eq!(device.root(), &root);
    assert_eq!(device.load("textures/blob.bin").unwrap(), vec![9, 8, 7]);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_fs_device_missing_file() {
    let device = FsFileDevice::new("/nonexistent/rio_gpu_root");
    assert!(matches!(device.load("x.rtx"), Err(RioError::Io(_))));
}
