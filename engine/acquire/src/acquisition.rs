//! Handles to acquisitions in flight.

use std::any::Any;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use tokio::runtime::Handle;

use acq_script::{HostObject, Value};

use crate::completion::{Completion, Outcome, SettleOnDrop};
use crate::error::{AcquireError, UsageError};
use crate::import::{project, ImportSpec};
use crate::issued::Issued;

/// A cloneable handle to one acquisition.
///
/// The work is already running when the handle is returned; dropping every
/// handle does not cancel it. Every clone observes the same outcome.
///
/// ```no_run
/// # async fn demo(from: acquire::Acquirer) -> Result<(), acquire::AcquireError> {
/// let _lib = from.package("std/http").await?;
/// let _only_get = from.package("std/http").import(acquire::ImportSpec::slots(["get"])).await?;
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Acquisition {
    completion: Arc<Completion>,
    runtime: Handle,
}

impl Acquisition {
    /// Spawn `work` onto `runtime` and return its handle.
    pub(crate) fn spawn<F>(runtime: &Handle, work: F) -> Self
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let completion = Arc::new(Completion::new());
        let settle = SettleOnDrop::new(Arc::clone(&completion));
        runtime.spawn(async move { settle.finish(work.await) });

        let acquisition = Acquisition {
            completion,
            runtime: runtime.clone(),
        };
        Issued::record(&acquisition);
        acquisition
    }

    /// Wait for the outcome.
    pub async fn result(&self) -> Outcome {
        self.completion.wait().await
    }

    /// The outcome, if already settled.
    pub fn try_result(&self) -> Option<Outcome> {
        self.completion.get()
    }

    pub fn is_settled(&self) -> bool {
        self.completion.is_done()
    }

    /// Block the current thread until the outcome is available.
    ///
    /// For synchronous code outside the runtime only: called from inside
    /// any tokio runtime context it fails with
    /// [`UsageError::WaitInsideRuntime`] instead of deadlocking. The
    /// runtime must be making progress on other threads (a multi-thread
    /// runtime, or a current-thread runtime driven elsewhere).
    pub fn wait(&self) -> Outcome {
        if Handle::try_current().is_ok() {
            return Err(AcquireError::Usage(UsageError::WaitInsideRuntime));
        }
        self.runtime.block_on(self.result())
    }

    /// Project slots of the acquired value; see [`ImportSpec`].
    ///
    /// The projection is itself an acquisition, settling with the target
    /// record once the copy is done.
    pub fn import(&self, spec: ImportSpec) -> Acquisition {
        let source = self.clone();
        Acquisition::spawn(&self.runtime, async move {
            let value = source.result().await?;
            project(&value, &spec)
        })
    }
}

impl IntoFuture for Acquisition {
    type Output = Outcome;
    type IntoFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.result().await })
    }
}

impl fmt::Debug for Acquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acquisition")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

impl HostObject for Acquisition {
    fn type_name(&self) -> &'static str {
        "acquisition"
    }

    fn call_method(&self, method: &str, args: &[Value]) -> Result<Value, String> {
        match method {
            "import" => Ok(Value::host(self.import(ImportSpec::from_args(args)?))),
            _ => Err(format!("no method `{method}`")),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests;
