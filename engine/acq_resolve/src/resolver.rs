//! The resolver: probes candidates against the filesystem.
//!
//! # Fallback policy
//!
//! | probe result            | effect                                   |
//! |-------------------------|------------------------------------------|
//! | regular file            | stop, resolved                           |
//! | missing                 | next candidate, then next root           |
//! | exists, wrong type      | next candidate, then next root           |
//! | any other I/O failure   | stop, fail with that error verbatim      |
//!
//! Wrong-type entries are not fatal because a later candidate or root may
//! still satisfy the request. I/O failures are fatal: retrying against later
//! roots would hide a broken environment behind a "not found".

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use acq_fs::{FileSystem, Probe};

use crate::candidates::{candidates, ExtensionPriority};
use crate::context::Context;
use crate::error::ResolveError;
use crate::path::{normalize_path, ResolvedPath};
use crate::specifier::{Specifier, SpecifierKind};

/// Ordered search roots for package specifiers. Cloning shares the snapshot,
/// so a resolution in flight never observes later configuration changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SearchRoots(Arc<[PathBuf]>);

impl SearchRoots {
    /// Build from `roots`. Relative roots are made absolute against the
    /// current directory so every resolved path is absolute.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        SearchRoots(
            roots
                .into_iter()
                .map(|root| {
                    let root = root.into();
                    std::path::absolute(&root).unwrap_or(root)
                })
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of probing one candidate.
enum Step {
    Found,
    WrongType,
    Missing,
}

/// Running state of one resolution.
struct Walk<'a> {
    specifier: &'a Specifier,
    tried: Vec<PathBuf>,
    wrong_type: Option<PathBuf>,
}

impl<'a> Walk<'a> {
    fn new(specifier: &'a Specifier) -> Self {
        Walk {
            specifier,
            tried: Vec::new(),
            wrong_type: None,
        }
    }

    fn does_not_exist(self) -> ResolveError {
        ResolveError::DoesNotExist {
            specifier: self.specifier.raw().to_owned(),
            tried: self.tried,
        }
    }
}

/// Resolves specifiers to files through a [`FileSystem`].
#[derive(Clone, Debug)]
pub struct Resolver {
    fs: Arc<dyn FileSystem>,
}

impl Resolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Resolver { fs }
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Resolve `specifier`.
    ///
    /// `context` is only consulted for relative specifiers; `roots` only for
    /// package specifiers. Usage errors (a relative specifier without a
    /// context) are reported before any probe is issued.
    pub async fn resolve(
        &self,
        specifier: &Specifier,
        context: Option<&Context>,
        roots: &SearchRoots,
        extensions: &ExtensionPriority,
    ) -> Result<ResolvedPath, ResolveError> {
        let result = match specifier.kind() {
            SpecifierKind::Absolute => {
                let path = specifier.as_path();
                if !path.is_absolute() {
                    return Err(ResolveError::NotAbsolute {
                        specifier: specifier.raw().to_owned(),
                    });
                }
                self.resolve_rooted(specifier, path, extensions).await
            }
            SpecifierKind::Relative => {
                let Some(context) = context else {
                    return Err(ResolveError::MissingContext {
                        specifier: specifier.raw().to_owned(),
                    });
                };
                let joined = context.dir().join(specifier.as_path());
                self.resolve_rooted(specifier, &joined, extensions).await
            }
            SpecifierKind::Package => {
                if specifier
                    .as_path()
                    .components()
                    .any(|c| matches!(c, Component::ParentDir))
                {
                    return Err(ResolveError::EscapesRoot {
                        specifier: specifier.raw().to_owned(),
                    });
                }
                self.resolve_package(specifier, roots, extensions).await
            }
        };

        match &result {
            Ok(path) => tracing::debug!(%specifier, resolved = %path, "resolved"),
            Err(e) => tracing::debug!(%specifier, error = %e, "resolution failed"),
        }
        result
    }

    /// Absolute and relative resolution: candidates rooted at the path
    /// itself, no search roots.
    async fn resolve_rooted(
        &self,
        specifier: &Specifier,
        path: &Path,
        extensions: &ExtensionPriority,
    ) -> Result<ResolvedPath, ResolveError> {
        let path = normalize_path(path);
        let (dir, base) = match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) => (dir.to_path_buf(), PathBuf::from(name)),
            _ => (PathBuf::new(), path.clone()),
        };

        let mut walk = Walk::new(specifier);
        for candidate in candidates(&base, extensions) {
            let full = dir.join(candidate);
            if let Step::Found = self.probe(&mut walk, &full).await? {
                return Ok(ResolvedPath::from_probed(full));
            }
        }

        match walk.wrong_type.take() {
            Some(path) => Err(ResolveError::NotAFile {
                specifier: specifier.raw().to_owned(),
                path,
                tried: walk.tried,
            }),
            None => Err(walk.does_not_exist()),
        }
    }

    /// Package resolution: every root in order, every candidate in order.
    async fn resolve_package(
        &self,
        specifier: &Specifier,
        roots: &SearchRoots,
        extensions: &ExtensionPriority,
    ) -> Result<ResolvedPath, ResolveError> {
        let relative = candidates(specifier.as_path(), extensions);
        let mut walk = Walk::new(specifier);

        for root in roots.as_slice() {
            for candidate in &relative {
                let full = normalize_path(&root.join(candidate));
                if let Step::Found = self.probe(&mut walk, &full).await? {
                    return Ok(ResolvedPath::from_probed(full));
                }
            }
        }
        Err(walk.does_not_exist())
    }

    async fn probe(&self, walk: &mut Walk<'_>, path: &Path) -> Result<Step, ResolveError> {
        walk.tried.push(path.to_path_buf());
        match self.fs.stat(path).await {
            Ok(Probe::File) => {
                tracing::trace!(path = %path.display(), "probe: file");
                Ok(Step::Found)
            }
            Ok(Probe::Missing) => {
                tracing::trace!(path = %path.display(), "probe: missing");
                Ok(Step::Missing)
            }
            Ok(probe @ (Probe::Directory | Probe::Other)) => {
                tracing::trace!(path = %path.display(), ?probe, "probe: not a file");
                walk.wrong_type.get_or_insert_with(|| path.to_path_buf());
                Ok(Step::WrongType)
            }
            Err(source) => {
                tracing::warn!(specifier = %walk.specifier, error = %source, "probe failed");
                Err(ResolveError::Io {
                    specifier: walk.specifier.raw().to_owned(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests;
