use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Per-request working directory holding every artifact of one stitch.
///
/// Removal happens at most once: awaited through [`ScratchDir::remove`], or
/// on drop, whichever comes first. Either way the recursive delete runs on the
/// blocking pool when a runtime is available. Removal errors are logged and
/// swallowed.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    /// Create a uniquely named directory under `root`
    pub fn create_in(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix("stitch-").tempdir_in(root)?;
        let path = dir.path().to_path_buf();
        debug!("Created scratch directory: {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory and wait for it to be gone
    pub async fn remove(mut self) {
        if let Some(dir) = self.dir.take() {
            let path = self.path.clone();
            match tokio::task::spawn_blocking(move || dir.close()).await {
                Ok(result) => log_removal(&path, result),
                Err(e) => warn!("Scratch cleanup task for {} failed: {}", path.display(), e),
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            // If the pool rejects the task, dropping the closure drops the TempDir,
            // which deletes inline
            Ok(handle) => {
                handle.spawn_blocking(move || log_removal(&path, dir.close()));
            }
            Err(_) => log_removal(&path, dir.close()),
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!("Removed scratch directory: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Failed to remove scratch directory {}: {}",
            path.display(),
            e
        ),
    }
}
