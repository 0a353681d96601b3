//! Reads a resolved file and runs it as a unit.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use acq_fs::FileSystem;
use acq_resolve::ResolvedPath;
use acq_script::{Bindings, Executor, Value};

use crate::config::ExecutionMode;
use crate::error::{AcquireError, CompileError};
use crate::issued::Issued;

#[derive(Clone, Debug)]
pub(crate) struct Loader {
    fs: Arc<dyn FileSystem>,
    executor: Arc<dyn Executor>,
    mode: ExecutionMode,
}

impl Loader {
    pub(crate) fn new(
        fs: Arc<dyn FileSystem>,
        executor: Arc<dyn Executor>,
        mode: ExecutionMode,
    ) -> Self {
        Loader { fs, executor, mode }
    }

    /// Read `path` and run it with `bindings` as its parameters.
    /// Acquisitions the body issues are recorded in `issued`.
    ///
    /// A file that vanished or became unreadable since it was resolved is
    /// `Unreadable`; it is never treated as empty.
    pub(crate) async fn load(
        &self,
        path: &ResolvedPath,
        bindings: Bindings,
        issued: &Arc<Issued>,
    ) -> Result<Value, AcquireError> {
        let bytes = self
            .fs
            .read_all(path.as_path())
            .await
            .map_err(|source| AcquireError::Unreadable {
                path: path.clone(),
                source,
            })?;

        let source = String::from_utf8(bytes).map_err(|e| AcquireError::Compile {
            path: path.clone(),
            source: CompileError::Encoding(e.utf8_error()),
        })?;

        let result = match self.mode {
            ExecutionMode::Inline => issued.scope(|| {
                run_unit(self.executor.as_ref(), &source, path, &bindings)
            }),
            ExecutionMode::Blocking => {
                let executor = Arc::clone(&self.executor);
                let path = path.clone();
                let issued = Arc::clone(issued);
                tokio::task::spawn_blocking(move || {
                    issued.scope(|| run_unit(executor.as_ref(), &source, &path, &bindings))
                })
                .await
                .unwrap_or_else(|join| Err(CompileError::Panic(join.to_string())))
            }
        };

        result.map_err(|source| AcquireError::Compile {
            path: path.clone(),
            source,
        })
    }
}

/// Execute one unit body. Panics inside the executor become compile errors.
fn run_unit(
    executor: &dyn Executor,
    source: &str,
    path: &ResolvedPath,
    bindings: &Bindings,
) -> Result<Value, CompileError> {
    match catch_unwind(AssertUnwindSafe(|| {
        executor.execute(source, path.as_path(), bindings)
    })) {
        Ok(result) => result.map_err(CompileError::from),
        Err(payload) => Err(CompileError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
