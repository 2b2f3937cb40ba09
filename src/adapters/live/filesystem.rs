//! Live filesystem adapter using `std::fs`.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::ports::FileSystem;

/// Filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

fn storage_error(action: &str, path: &Path, err: &std::io::Error) -> Error {
    Error::Storage(format!("failed to {action} {}: {err}", path.display()))
}

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| storage_error("read", path, &e))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error("create", parent, &e))?;
        }
        std::fs::write(path, contents).map_err(|e| storage_error("write", path, &e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(storage_error("remove", path, &e)),
            _ => Ok(()),
        }
    }
}
