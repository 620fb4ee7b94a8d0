// JobPulse - platform/fs.rs
//
// Filesystem helpers used by the loader.

use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Read the full content of a file as bytes.
pub fn read_bytes(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path)
}

/// Last-modification time of a file, or `None` if it does not exist or the
/// platform does not report one.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Create `path` (truncating) for writing, creating missing parent
/// directories first.
pub fn create_for_write(path: &Path) -> io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modified_time_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(modified_time(&dir.path().join("nope.csv")).is_none());
    }

    #[test]
    fn test_create_for_write_makes_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("out.csv");
        create_for_write(&target).unwrap();
        assert!(target.exists());
        assert!(modified_time(&target).is_some());
        assert_eq!(read_bytes(&target).unwrap(), Vec::<u8>::new());
    }
}
