//! Filesystem collaborator for the acquisition engine.
//!
//! The engine never touches `std::fs` directly. Everything it needs from the
//! host filesystem goes through the [`FileSystem`] trait:
//!
//! - [`FileSystem::stat`] classifies a path as [`Probe::Missing`],
//!   [`Probe::File`], [`Probe::Directory`] or [`Probe::Other`], or fails with
//!   an [`FsError`] for anything that is not a plain "nothing here".
//! - [`FileSystem::read_all`] returns the full content of a file.
//!
//! Both are suspension points: the resolver and loader await them and never
//! block a runtime worker.
//!
//! # Implementations
//!
//! - [`TokioFs`]: the real filesystem via `tokio::fs`.
//! - [`MemoryFs`]: an in-memory tree with fault injection, for tests and for
//!   embedders that serve units from somewhere other than disk.

mod memory;
mod tokio_fs;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use memory::{Fault, MemoryFs};
pub use tokio_fs::TokioFs;

/// Result of probing a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Probe {
    /// Nothing exists at the path (or a parent component is not a directory).
    Missing,
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Something else: a socket, a FIFO, a device node.
    Other,
}

impl Probe {
    /// Classify a `std::fs::FileType`.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            Probe::File
        } else if file_type.is_dir() {
            Probe::Directory
        } else {
            Probe::Other
        }
    }

    /// Returns `true` if something exists at the probed path.
    #[inline]
    pub fn exists(self) -> bool {
        !matches!(self, Probe::Missing)
    }

    /// Returns `true` if the probed path is a regular file.
    #[inline]
    pub fn is_file(self) -> bool {
        matches!(self, Probe::File)
    }
}

/// Which filesystem operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FsOp {
    Stat,
    Read,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsOp::Stat => f.write_str("cannot stat"),
            FsOp::Read => f.write_str("cannot read"),
        }
    }
}

/// An I/O failure reported by a [`FileSystem`].
///
/// `Clone` so that one failure can be handed to every waiter on a shared
/// load; the underlying `io::Error` sits behind an `Arc`.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{op} `{}`: {source}", .path.display())]
pub struct FsError {
    op: FsOp,
    path: PathBuf,
    #[source]
    source: Arc<io::Error>,
}

impl FsError {
    #[cold]
    pub fn new(op: FsOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError {
            op,
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// The operation that failed.
    pub fn op(&self) -> FsOp {
        self.op
    }

    /// The path the operation was applied to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `io::ErrorKind` of the underlying failure.
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    /// The underlying I/O error.
    pub fn io(&self) -> &io::Error {
        &self.source
    }
}

/// Returns `true` for errors that mean "there is nothing at this path".
///
/// `NotADirectory` shows up when a candidate like `x.acq/x.acq` is probed
/// and `x.acq` is a file; for resolution purposes that is plain absence.
pub fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Host filesystem as seen by the resolver and loader.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Classify `path`.
    ///
    /// Absence is `Ok(Probe::Missing)`, never an error. Every other failure
    /// (permission denied, I/O error) is an `Err`, and callers treat it as
    /// fatal.
    async fn stat(&self, path: &Path) -> Result<Probe, FsError>;

    /// Read the entire content of `path`.
    async fn read_all(&self, path: &Path) -> Result<Vec<u8>, FsError>;
}
