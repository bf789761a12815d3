//! In-memory mock filesystem for testing the collector without real `/proc`.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::collector::traits::FileSystem;

/// In-memory filesystem for testing.
///
/// File contents live behind a shared handle, so a clone held by a running
/// collector sees updates made through the original. Tests use this to
/// advance counters between sampling cycles.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) a file with the given content.
    pub fn set_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file, so subsequent reads fail with `NotFound`.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path:?}"))
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}
