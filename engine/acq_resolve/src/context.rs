//! The requesting unit, threaded explicitly through relative resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ResolveError;
use crate::path::{normalize_path, ResolvedPath};

/// The unit whose execution issued a request.
///
/// `lineage` lists the units whose execution led here, outermost first,
/// ending with `file` itself. It is only consulted for cycle detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    file: PathBuf,
    lineage: Arc<[PathBuf]>,
}

impl Context {
    /// A root context for `file`, which must be absolute.
    pub fn new(file: impl Into<PathBuf>) -> Result<Self, ResolveError> {
        let file = file.into();
        if !file.is_absolute() {
            return Err(ResolveError::InvalidContext { path: file });
        }
        let file = normalize_path(&file);
        Ok(Context {
            lineage: Arc::from(vec![file.clone()]),
            file,
        })
    }

    /// A root context for a unit acquired outside of any other unit.
    pub fn for_unit(path: &ResolvedPath) -> Self {
        let file = path.as_path().to_path_buf();
        Context {
            lineage: Arc::from(vec![file.clone()]),
            file,
        }
    }

    /// The context of a unit loaded from within this one.
    ///
    /// `file` is a path the resolver produced, so it is already absolute
    /// and normalized.
    pub fn child(&self, file: &Path) -> Self {
        let mut lineage = self.lineage.to_vec();
        lineage.push(file.to_path_buf());
        Context {
            file: file.to_path_buf(),
            lineage: lineage.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Directory relative specifiers are joined onto.
    pub fn dir(&self) -> &Path {
        self.file.parent().unwrap_or(Path::new("/"))
    }

    pub fn lineage(&self) -> &[PathBuf] {
        &self.lineage
    }

    /// Returns `true` if `path` is this unit or one of the units that led
    /// to it.
    pub fn is_ancestor_or_self(&self, path: &Path) -> bool {
        self.lineage.iter().any(|p| p == path)
    }
}
