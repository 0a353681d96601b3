//! Candidate generation.
//!
//! For a base name `x` and extensions `[e1, e2]` the candidates are, in
//! order:
//!
//! ```text
//! x  x.e1  x.e2  x/x  x/x.e1  x/x.e2
//! ```
//!
//! An exact match always beats a self-named directory, and an earlier
//! extension always beats a later one. Package authors shadow one format
//! with another by relying on this order, so it must not change.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use smallvec::SmallVec;

/// Candidate list. Six inline slots cover one or two extensions without
/// allocating.
pub type Candidates = SmallVec<[PathBuf; 6]>;

/// Ordered extension suffixes, without leading dots.
///
/// The exact (suffix-less) match is implicit and always tried first, so it
/// is never stored here. Cloning shares the underlying snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtensionPriority(Arc<[String]>);

impl ExtensionPriority {
    /// Build from suffixes, stripping leading dots and dropping empties.
    /// Duplicates keep their first position.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            if !ext.is_empty() && !normalized.iter().any(|e| e == ext) {
                normalized.push(ext.to_owned());
            }
        }
        ExtensionPriority(normalized.into())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionPriority {
    fn default() -> Self {
        ExtensionPriority::new(["acq"])
    }
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Generate the ordered candidates for `base`.
///
/// `base` may contain several components (`std/http`); the self-named
/// directory variant uses the last one (`std/http/http`). A base without a
/// final name component only yields its exact and suffixed forms.
pub fn candidates(base: &Path, extensions: &ExtensionPriority) -> Candidates {
    let mut out = Candidates::new();
    out.push(base.to_path_buf());
    out.extend(extensions.as_slice().iter().map(|ext| with_suffix(base, ext)));

    if let Some(stem) = base.file_name() {
        let inner = base.join(stem);
        let suffixed: Candidates = extensions
            .as_slice()
            .iter()
            .map(|ext| with_suffix(&inner, ext))
            .collect();
        out.push(inner);
        out.extend(suffixed);
    }
    out
}
