//! In-memory filesystem with fault injection.
//!
//! Paths are stored verbatim; callers hand in absolute, already-normalized
//! paths (the resolver normalizes every candidate before probing). Inserting
//! a file creates its ancestor directories.
//!
//! Every probe and read yields to the scheduler once before answering, so
//! concurrent acquisitions interleave the way they would against a real disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{FileSystem, FsError, FsOp, Probe};

/// A failure injected at one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Probes and reads fail with `PermissionDenied`.
    Denied,
    /// Probes and reads fail with a generic I/O error.
    Broken,
    /// Probes succeed, but the entry disappears before its content can be
    /// read: the first read removes the node and fails with `NotFound`.
    VanishOnRead,
}

#[derive(Clone, Debug)]
enum Node {
    File(Arc<[u8]>),
    Dir,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: FxHashMap<PathBuf, Node>,
    faults: FxHashMap<PathBuf, Fault>,
    reads: FxHashMap<PathBuf, usize>,
}

/// [`FileSystem`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryFs {
    tree: RwLock<Tree>,
    probes: AtomicUsize,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a regular file, creating parent directories.
    pub fn insert_file(&self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) {
        let path = path.into();
        let mut tree = self.tree.write();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            tree.nodes.insert(ancestor.to_path_buf(), Node::Dir);
        }
        tree.nodes.insert(path, Node::File(Arc::from(content.as_ref())));
    }

    /// Insert a directory, creating parent directories.
    pub fn insert_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut tree = self.tree.write();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            tree.nodes.insert(ancestor.to_path_buf(), Node::Dir);
        }
    }

    /// Remove the entry at `path`. Returns `true` if something was removed.
    pub fn remove(&self, path: &Path) -> bool {
        self.tree.write().nodes.remove(path).is_some()
    }

    /// Inject `fault` at `path`. Replaces any previous fault there.
    pub fn inject(&self, path: impl Into<PathBuf>, fault: Fault) {
        self.tree.write().faults.insert(path.into(), fault);
    }

    /// Clear any fault injected at `path`.
    pub fn heal(&self, path: &Path) {
        self.tree.write().faults.remove(path);
    }

    /// Number of `read_all` calls made against `path`, successful or not.
    pub fn read_count(&self, path: &Path) -> usize {
        self.tree.read().reads.get(path).copied().unwrap_or(0)
    }

    /// Total number of `stat` calls made against this filesystem.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

fn fault_error(fault: Fault) -> Option<io::Error> {
    match fault {
        Fault::Denied => Some(io::Error::from(io::ErrorKind::PermissionDenied)),
        Fault::Broken => Some(io::Error::other("injected I/O failure")),
        Fault::VanishOnRead => None,
    }
}

#[async_trait::async_trait]
impl FileSystem for MemoryFs {
    async fn stat(&self, path: &Path) -> Result<Probe, FsError> {
        tokio::task::yield_now().await;
        self.probes.fetch_add(1, Ordering::Relaxed);

        let tree = self.tree.read();
        if let Some(err) = tree.faults.get(path).copied().and_then(fault_error) {
            return Err(FsError::new(FsOp::Stat, path, err));
        }
        Ok(match tree.nodes.get(path) {
            Some(Node::File(_)) => Probe::File,
            Some(Node::Dir) => Probe::Directory,
            None => Probe::Missing,
        })
    }

    async fn read_all(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        tokio::task::yield_now().await;

        let mut tree = self.tree.write();
        *tree.reads.entry(path.to_path_buf()).or_insert(0) += 1;

        match tree.faults.get(path).copied() {
            Some(Fault::VanishOnRead) => {
                tree.nodes.remove(path);
                tree.faults.remove(path);
                return Err(FsError::new(
                    FsOp::Read,
                    path,
                    io::Error::from(io::ErrorKind::NotFound),
                ));
            }
            Some(fault) => {
                if let Some(err) = fault_error(fault) {
                    return Err(FsError::new(FsOp::Read, path, err));
                }
            }
            None => {}
        }

        match tree.nodes.get(path) {
            Some(Node::File(content)) => Ok(content.to_vec()),
            Some(Node::Dir) => Err(FsError::new(
                FsOp::Read,
                path,
                io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
            )),
            None => Err(FsError::new(
                FsOp::Read,
                path,
                io::Error::from(io::ErrorKind::NotFound),
            )),
        }
    }
}
