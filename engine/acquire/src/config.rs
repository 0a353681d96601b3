//! Facade configuration.
//!
//! # Environment
//!
//! | variable             | meaning                                   | default  |
//! |----------------------|-------------------------------------------|----------|
//! | `ACQUIRE_PATH`       | search roots, platform path-list syntax   | none     |
//! | `ACQUIRE_EXTENSIONS` | comma-separated extension priority        | `acq`    |
//! | `ACQUIRE_EXEC`       | `inline` or `blocking`                    | `inline` |

use std::ffi::OsString;
use std::path::PathBuf;

use acq_resolve::{ExtensionPriority, SearchRoots};
use acq_script::{Bindings, Value};

/// Names every unit is given; configured bindings may not shadow them.
pub const RESERVED_BINDINGS: [&str; 2] = ["__filename", "from"];

/// Where unit bodies run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// On the task that performed the read.
    #[default]
    Inline,
    /// On tokio's blocking pool, for bodies that take long enough to stall
    /// a runtime worker.
    Blocking,
}

impl std::str::FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(ExecutionMode::Inline),
            "blocking" => Ok(ExecutionMode::Blocking),
            _ => Err(ConfigError::InvalidExecutionMode {
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ACQUIRE_EXEC value `{value}` (expected `inline` or `blocking`)")]
    InvalidExecutionMode { value: String },

    #[error("binding `{name}` is reserved")]
    ReservedBinding { name: String },

    #[error("{variable} is not valid unicode")]
    NotUnicode { variable: &'static str },
}

/// Configuration snapshot taken by an [`Acquirer`](crate::Acquirer).
#[derive(Clone, Debug, Default)]
pub struct AcquireConfig {
    search_roots: SearchRoots,
    extensions: ExtensionPriority,
    execution: ExecutionMode,
    bindings: Bindings,
}

impl AcquireConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `ACQUIRE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var_os(name))
    }

    /// Read the `ACQUIRE_*` variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, ConfigError> {
        let mut config = AcquireConfig::new();

        if let Some(paths) = lookup("ACQUIRE_PATH") {
            config.search_roots = SearchRoots::new(
                std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()),
            );
        }
        if let Some(extensions) = lookup("ACQUIRE_EXTENSIONS") {
            let extensions = extensions.into_string().map_err(|_| ConfigError::NotUnicode {
                variable: "ACQUIRE_EXTENSIONS",
            })?;
            config.extensions = ExtensionPriority::new(extensions.split(','));
        }
        if let Some(mode) = lookup("ACQUIRE_EXEC") {
            let mode = mode
                .into_string()
                .map_err(|_| ConfigError::NotUnicode {
                    variable: "ACQUIRE_EXEC",
                })?;
            config.execution = mode.parse()?;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_search_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_roots = SearchRoots::new(roots);
        self
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = ExtensionPriority::new(extensions);
        self
    }

    #[must_use]
    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.execution = mode;
        self
    }

    /// Add a binding injected into every unit after `__filename` and `from`.
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Result<Self, ConfigError> {
        let name = name.into();
        if RESERVED_BINDINGS.contains(&name.as_str()) {
            return Err(ConfigError::ReservedBinding { name });
        }
        self.bindings.bind(name, value);
        Ok(self)
    }

    pub fn search_roots(&self) -> &SearchRoots {
        &self.search_roots
    }

    pub fn extensions(&self) -> &ExtensionPriority {
        &self.extensions
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}
