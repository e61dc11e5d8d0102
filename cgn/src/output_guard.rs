//! RAII guard that deletes a partially-written output file unless the
//! operation that produced it explicitly commits.
//!
//! Every multi-step write in [`crate::api`] (parse/encode succeeds, then
//! the file write itself, then any post-write bookkeeping) can fail
//! partway through; without this guard a failed `encode` or `decode` call
//! could leave a truncated or empty file at the caller's requested output
//! path.

use std::path::{Path, PathBuf};

pub struct OutputGuard {
    path: PathBuf,
    committed: bool,
}

impl OutputGuard {
    /// Tracks `path` for cleanup. Does not touch the filesystem itself;
    /// call this before the first write to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        OutputGuard {
            path: path.as_ref().to_path_buf(),
            committed: false,
        }
    }

    /// Marks the output as complete; the file will not be removed on drop.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if self.path.exists() {
            log::warn!(
                "removing partial output file {} after a failed operation",
                self.path.display()
            );
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("failed to remove partial output file: {e}");
            }
        }
    }
}
