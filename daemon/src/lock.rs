//! Exclusive lock serialising `pollsys` invocations on one data file.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Context;
use fs2::FileExt;

/// Advisory lock on `<data_file>.lock`, released on drop.
///
/// The data file itself is replaced by rename on every save, so the lock
/// lives on a sidecar that is never replaced.
#[derive(Debug)]
pub struct DataLock {
    file: File,
    path: PathBuf,
}

impl DataLock {
    /// Block until no other invocation holds the lock for `data_file`.
    pub fn acquire(data_file: &Path) -> anyhow::Result<Self> {
        let path = lock_path(data_file);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("opening lock file {}", path.display()))?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("locking {}", path.display()))?;
        tracing::debug!("acquired {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for DataLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to unlock {}: {e}", self.path.display());
        }
    }
}

pub fn lock_path(data_file: &Path) -> PathBuf {
    let mut name = OsString::from(data_file.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
