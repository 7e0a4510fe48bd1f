use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// A document written to a uniquely named `.pdf` file for the duration of one request.
///
/// Call [`StagedDocument::release`] when done. If the guard is dropped instead (a panic,
/// or the request future being cancelled) the file is still removed.
#[derive(Debug)]
pub struct StagedDocument {
    path: TempPath,
}

impl StagedDocument {
    pub async fn write(staging_dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        let staging_dir = staging_dir.to_path_buf();
        let bytes = bytes.to_vec();

        let path = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(".pdf")
                .tempfile_in(&staging_dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!(path = %path.display(), "Document staged");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staged file. Failure to remove is logged, never returned.
    pub fn release(self) {
        let path: PathBuf = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => debug!(path = %path.display(), "Staged document removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staged document"),
        }
    }
}
