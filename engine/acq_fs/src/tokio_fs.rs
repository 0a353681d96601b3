//! The real filesystem, through `tokio::fs`.

use std::path::Path;

use crate::{is_absent, FileSystem, FsError, FsOp, Probe};

/// [`FileSystem`] backed by `tokio::fs`.
///
/// Metadata lookups follow symlinks, so a link to a regular file probes as
/// [`Probe::File`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioFs;

#[async_trait::async_trait]
impl FileSystem for TokioFs {
    async fn stat(&self, path: &Path) -> Result<Probe, FsError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(Probe::from_file_type(meta.file_type())),
            Err(e) if is_absent(&e) => Ok(Probe::Missing),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "stat failed");
                Err(FsError::new(FsOp::Stat, path, e))
            }
        }
    }

    async fn read_all(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| FsError::new(FsOp::Read, path, e))
    }
}
