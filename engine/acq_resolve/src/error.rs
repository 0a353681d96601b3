//! Resolution failures.

use std::path::PathBuf;

use acq_fs::FsError;

/// Why a specifier could not be resolved.
///
/// Every variant names the specifier; the "nothing matched" variants also
/// carry the candidates that were probed, in probe order.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ResolveError {
    /// An absolute path was required and the specifier is not one.
    #[error("`{specifier}` is not an absolute path")]
    NotAbsolute { specifier: String },

    /// No candidate exists.
    #[error("cannot find `{specifier}`; tried {}", display_tried(.tried))]
    DoesNotExist {
        specifier: String,
        tried: Vec<PathBuf>,
    },

    /// Something exists, but no candidate is a regular file.
    #[error("`{specifier}` resolves to `{}`, which is not a file", .path.display())]
    NotAFile {
        specifier: String,
        path: PathBuf,
        tried: Vec<PathBuf>,
    },

    /// A probe failed for a reason other than absence. Fatal: resolution
    /// stops at the failing candidate.
    #[error("cannot resolve `{specifier}`: {source}")]
    Io {
        specifier: String,
        #[source]
        source: FsError,
    },

    /// A relative specifier arrived with no requesting unit.
    #[error("cannot resolve relative `{specifier}` outside of a loading unit")]
    MissingContext { specifier: String },

    /// A package name with a `..` component, which would leave its root.
    #[error("package `{specifier}` must stay inside its search root")]
    EscapesRoot { specifier: String },

    /// A context was built from a path that is not absolute.
    #[error("context path `{}` is not absolute", .path.display())]
    InvalidContext { path: PathBuf },
}

impl ResolveError {
    /// Candidates probed before giving up, if this failure records them.
    pub fn tried(&self) -> &[PathBuf] {
        match self {
            ResolveError::DoesNotExist { tried, .. } | ResolveError::NotAFile { tried, .. } => {
                tried
            }
            _ => &[],
        }
    }

    /// Returns `true` for caller mistakes detected before any I/O.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ResolveError::MissingContext { .. }
                | ResolveError::EscapesRoot { .. }
                | ResolveError::InvalidContext { .. }
        )
    }
}

fn display_tried(tried: &[PathBuf]) -> String {
    if tried.is_empty() {
        return "nothing".to_owned();
    }
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
