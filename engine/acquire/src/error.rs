//! Acquisition failures.
//!
//! Every failure an [`Acquisition`](crate::Acquisition) can settle with is
//! an [`AcquireError`]. Errors are `Clone` because one load outcome is
//! handed to every requester of that path.

use std::fmt;
use std::path::PathBuf;
use std::str::Utf8Error;
use std::sync::Arc;

use acq_fs::FsError;
use acq_resolve::{ResolveError, ResolvedPath};
use acq_script::ExecError;

/// Coarse classification of an [`AcquireError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An absolute path was required.
    NotAbsolute,
    /// No candidate exists.
    DoesNotExist,
    /// Something exists, but not a regular file.
    NotAFile,
    /// The file resolved but could not be read.
    Unreadable,
    /// The file was read but failed to decode, compile or run.
    CompileError,
    /// A probe failed for a reason other than absence.
    Io,
    /// The unit is already being loaded by one of its requesters.
    Cycle,
    /// Slot projection failed.
    Import,
    /// The API was called in a way that cannot work.
    Usage,
    /// The runtime shut down before the acquisition settled.
    Abandoned,
}

/// Why a unit failed after its content was read.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CompileError {
    #[error("source is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("executor panicked: {0}")]
    Panic(String),
}

/// Which side of a projection had the wrong type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportRole {
    /// The acquired value.
    Source,
    /// The record slots are copied onto.
    Target,
}

impl fmt::Display for ImportRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportRole::Source => f.write_str("acquired value"),
            ImportRole::Target => f.write_str("import target"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("{role} must be a record, found `{found}`")]
    NotARecord {
        role: ImportRole,
        found: &'static str,
    },

    #[error("acquired value has no slot `{slot}`")]
    MissingSlot { slot: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("`wait()` called from inside an async runtime; `.await` the acquisition instead")]
    WaitInsideRuntime,

    #[error("no tokio runtime is available")]
    NoRuntime,
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum AcquireError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("`{path}` cannot be read: {source}")]
    Unreadable {
        path: ResolvedPath,
        #[source]
        source: FsError,
    },

    #[error("`{path}` failed to load: {source}")]
    Compile {
        path: ResolvedPath,
        #[source]
        source: CompileError,
    },

    #[error("`{path}` is already being loaded (cycle: {})", display_chain(.chain))]
    Cycle {
        path: ResolvedPath,
        chain: Vec<PathBuf>,
    },

    /// An acquisition issued by a unit failed, so the unit fails too.
    #[error("`{unit}` depends on a failed acquisition: {source}")]
    Dependency {
        unit: ResolvedPath,
        #[source]
        source: Arc<AcquireError>,
    },

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("the runtime shut down before the acquisition settled")]
    Abandoned,
}

impl AcquireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AcquireError::Resolve(e) => match e {
                ResolveError::NotAbsolute { .. } => ErrorKind::NotAbsolute,
                ResolveError::DoesNotExist { .. } => ErrorKind::DoesNotExist,
                ResolveError::NotAFile { .. } => ErrorKind::NotAFile,
                ResolveError::Io { .. } => ErrorKind::Io,
                ResolveError::MissingContext { .. }
                | ResolveError::EscapesRoot { .. }
                | ResolveError::InvalidContext { .. } => ErrorKind::Usage,
            },
            AcquireError::Unreadable { .. } => ErrorKind::Unreadable,
            AcquireError::Compile { .. } => ErrorKind::CompileError,
            AcquireError::Cycle { .. } => ErrorKind::Cycle,
            AcquireError::Dependency { source, .. } => source.kind(),
            AcquireError::Import(_) => ErrorKind::Import,
            AcquireError::Usage(_) => ErrorKind::Usage,
            AcquireError::Abandoned => ErrorKind::Abandoned,
        }
    }

    /// The failure that started a chain of [`AcquireError::Dependency`]s.
    pub fn root_cause(&self) -> &AcquireError {
        let mut error = self;
        while let AcquireError::Dependency { source, .. } = error {
            error = source;
        }
        error
    }

    /// Candidates probed before resolution gave up, if any.
    pub fn tried(&self) -> &[PathBuf] {
        match self.root_cause() {
            AcquireError::Resolve(e) => e.tried(),
            _ => &[],
        }
    }
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
