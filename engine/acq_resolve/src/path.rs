//! Lexical path normalization and the resolved-path key.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Normalize a path by resolving `.` and `..` components lexically.
///
/// Symlinks are not consulted. `..` at the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => result.push(component),
        }
    }
    result
}

/// A normalized absolute path that referred to a regular file when it was
/// probed.
///
/// This is the key of the load cache: two specifiers that resolve to the
/// same `ResolvedPath` share one load. The file may have changed or vanished
/// since the probe; the loader reports that separately.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedPath(Arc<Path>);

impl ResolvedPath {
    /// Wrap `path`, normalizing it. Returns `None` for relative paths.
    pub fn new(path: &Path) -> Option<Self> {
        path.is_absolute()
            .then(|| ResolvedPath(Arc::from(normalize_path(path))))
    }

    /// Wrap a path the resolver built from absolute parts and normalized.
    pub(crate) fn from_probed(path: PathBuf) -> Self {
        ResolvedPath(Arc::from(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}
