//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to read the real `/proc`
//! filesystem on Linux or an in-memory mock in tests and CI.

use std::io;
use std::path::Path;

/// Abstraction for filesystem operations.
///
/// Collectors read through this trait so they can be pointed at the real
/// `/proc` or at a mock implementation.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diskstats");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "   8       0 sda 1 0 8 4 2 0 16 3 0 6 7 0 0 0 0").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(&path).unwrap();
        assert!(content.contains("sda"));
    }

    #[test]
    fn test_real_fs_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(dir.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }
}
