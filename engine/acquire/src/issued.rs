//! Acquisitions issued by a unit while its body runs.
//!
//! A unit body runs synchronously on one thread, so the unit that is
//! executing is tracked in a thread-local for the duration of the call.
//! Every [`Acquisition`] created in that window is recorded against it, and
//! the unit's own outcome is only published once they have all settled.

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::Mutex;

use acq_resolve::ResolvedPath;
use acq_script::Value;

use crate::acquisition::Acquisition;
use crate::completion::Outcome;
use crate::error::AcquireError;

thread_local! {
    static CURRENT: RefCell<Option<Arc<Issued>>> = const { RefCell::new(None) };
}

/// Acquisitions recorded for one unit. Closed once the unit settles;
/// recording into a closed list is a no-op.
#[derive(Debug)]
pub(crate) struct Issued {
    list: Mutex<Option<Vec<Acquisition>>>,
}

impl Issued {
    pub(crate) fn new() -> Self {
        Issued {
            list: Mutex::new(Some(Vec::new())),
        }
    }

    /// Run `f` with `self` as the unit currently issuing acquisitions.
    pub(crate) fn scope<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<Arc<Issued>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let previous = self.0.take();
                CURRENT.with(|current| *current.borrow_mut() = previous);
            }
        }

        let previous = CURRENT.with(|current| current.borrow_mut().replace(Arc::clone(self)));
        let _restore = Restore(previous);
        f()
    }

    /// Record `acquisition` against the executing unit, if any.
    pub(crate) fn record(acquisition: &Acquisition) {
        CURRENT.with(|current| {
            if let Some(issued) = &*current.borrow() {
                if let Some(list) = &mut *issued.list.lock() {
                    list.push(acquisition.clone());
                }
            }
        });
    }

    fn get(&self, index: usize) -> Option<Acquisition> {
        self.list
            .lock()
            .as_ref()
            .and_then(|list| list.get(index).cloned())
    }

    fn close(&self) {
        self.list.lock().take();
    }

    /// Wait for every recorded acquisition in issue order, then resolve a
    /// returned handle to its value.
    ///
    /// The first failure fails the unit.
    pub(crate) async fn settle(&self, unit: &ResolvedPath, value: Value) -> Outcome {
        let depends = |source: AcquireError| AcquireError::Dependency {
            unit: unit.clone(),
            source: Arc::new(source),
        };

        let mut index = 0;
        while let Some(acquisition) = self.get(index) {
            if let Err(e) = acquisition.result().await {
                self.close();
                return Err(depends(e));
            }
            index += 1;
        }
        self.close();

        match value.downcast_host::<Acquisition>() {
            Some(handle) => handle.result().await.map_err(depends),
            None => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests;
