//! Private temporary storage for a single conversion.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};

/// A temporary directory owned by one conversion attempt.
///
/// The directory is removed by [`Scratch::release`] or, failing that, when
/// the handle is dropped. Removal errors are never reported to the caller.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Create a scratch directory under `root`, or the system temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("doc2epub-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(Error::Scratch)?;
        tracing::debug!("Created scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file named `name` inside the scratch directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Delete the directory and everything in it.
    ///
    /// Safe to call after a failed conversion and when the directory has
    /// already been removed by someone else.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::debug!("Ignoring scratch cleanup failure for {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_removes_directory() {
        let root = TempDir::new().unwrap();
        let scratch = Scratch::create(Some(root.path())).unwrap();
        std::fs::write(scratch.file("a.png"), b"data").unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());

        scratch.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_release_tolerates_missing_directory() {
        let root = TempDir::new().unwrap();
        let scratch = Scratch::create(Some(root.path())).unwrap();
        std::fs::remove_dir_all(scratch.path()).unwrap();

        // Must not panic
        scratch.release();
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let path = {
            let scratch = Scratch::create(Some(root.path())).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
