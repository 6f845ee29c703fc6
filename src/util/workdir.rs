//! Scoped temporary working directories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Retries after the first failed removal attempt.
const CLEANUP_RETRIES: u32 = 2;

/// Delay between removal attempts.
const CLEANUP_DELAY: Duration = Duration::from_secs(10);

/// A temporary working directory removed on every exit path.
///
/// Removal is retried a bounded number of times; exhausting the retries
/// only warns, it never fails the run.
#[derive(Debug)]
pub struct ScopedWorkdir {
    dir: Option<TempDir>,
    path: PathBuf,
    cleanup_delay: Duration,
}

impl ScopedWorkdir {
    /// Create a fresh working directory under the system temp location.
    pub fn new() -> Result<Self> {
        Self::with_cleanup_delay(CLEANUP_DELAY)
    }

    fn with_cleanup_delay(cleanup_delay: Duration) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("hepstack-")
            .tempdir()
            .context("failed to create temporary working directory")?;
        let path = dir.path().to_path_buf();
        Ok(ScopedWorkdir {
            dir: Some(dir),
            path,
            cleanup_delay,
        })
    }

    /// Path of the working directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedWorkdir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else { return };
        if dir.close().is_ok() {
            return;
        }

        for _ in 0..CLEANUP_RETRIES {
            std::thread::sleep(self.cleanup_delay);
            if std::fs::remove_dir_all(&self.path).is_ok() {
                return;
            }
        }
        tracing::warn!(
            "directory {} not completely cleaned, it can be removed manually",
            self.path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let path;
        {
            let work = ScopedWorkdir::new().unwrap();
            path = work.path().to_path_buf();
            assert!(path.is_dir());
            std::fs::write(path.join("scratch.txt"), "x").unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_distinct_directories() {
        let a = ScopedWorkdir::with_cleanup_delay(Duration::from_millis(1)).unwrap();
        let b = ScopedWorkdir::with_cleanup_delay(Duration::from_millis(1)).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
