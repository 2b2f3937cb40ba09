//! Filesystem port for the client's local state files.

use std::path::Path;

use crate::error::Result;

/// Reads and writes the small state files the client keeps between runs
/// (session, demo dataset, cassettes).
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Writes the given contents to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Returns `true` if the path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Removes a file. Removing a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file exists but cannot be removed.
    fn remove(&self, path: &Path) -> Result<()>;
}
