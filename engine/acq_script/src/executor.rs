//! The execution seam between the loader and a unit language.

use std::fmt;
use std::path::Path;

use crate::bindings::Bindings;
use crate::value::Value;

/// Failure to compile or run a unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("runtime error on line {line}: {message}")]
    Runtime { line: u32, message: String },
}

impl ExecError {
    #[cold]
    pub fn syntax(line: u32, column: u32, message: impl Into<String>) -> Self {
        ExecError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    #[cold]
    pub fn runtime(line: u32, message: impl Into<String>) -> Self {
        ExecError::Runtime {
            line,
            message: message.into(),
        }
    }
}

/// Compiles `source` as the body of a unit whose parameters are the
/// binding names, in order, and runs it with the bound values.
///
/// `origin` names the unit in diagnostics only. Implementations run
/// synchronously and must not block on acquisitions.
pub trait Executor: Send + Sync + fmt::Debug {
    fn execute(&self, source: &str, origin: &Path, bindings: &Bindings)
        -> Result<Value, ExecError>;
}
