//! Singleflight load cache.
//!
//! One entry per resolved path, created atomically by the first requester
//! and never evicted:
//!
//! ```text
//! absent ──(first requester)──► pending ──(loader finishes)──► done
//!                                  ▲                            │
//!                     later requesters wait          later requesters read
//! ```
//!
//! The loader runs on its own task, so a requester that stops waiting does
//! not cancel the load. Requests made by a loading unit are tracked in a
//! [`WaitGraph`]; one that would close a waiting loop fails as a cycle
//! rather than joining it.

use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use acq_resolve::ResolvedPath;

use crate::completion::{Completion, Outcome, SettleOnDrop};
use crate::error::AcquireError;
use crate::wait_graph::WaitGraph;

/// Per-facade table from resolved path to load outcome.
#[derive(Default)]
pub struct LoadCache {
    entries: DashMap<ResolvedPath, Arc<Completion>>,
    waits: Arc<Mutex<WaitGraph>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the outcome of loading `path`, running `loader` if and only if
    /// no entry exists yet.
    ///
    /// `waiter` is the unit whose load is asking, if any. A request that
    /// would leave two loads waiting on each other fails with
    /// [`AcquireError::Cycle`] instead of waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_or_load<F, Fut>(
        &self,
        path: ResolvedPath,
        waiter: Option<&ResolvedPath>,
        loader: F,
    ) -> Outcome
    where
        F: FnOnce(ResolvedPath) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let (completion, loader) = match self.entries.entry(path.clone()) {
            Entry::Occupied(entry) => {
                tracing::trace!(%path, "load cache hit");
                (Arc::clone(entry.get()), None)
            }
            Entry::Vacant(entry) => {
                let completion = Arc::new(Completion::new());
                entry.insert(Arc::clone(&completion));
                (completion, Some(loader))
            }
        };

        // Registered before a new load starts, so the load's own requests
        // already see this edge.
        let cycle = waiter.and_then(|waiter| self.wait(waiter, &path, &completion).err());
        if let Some(loader) = loader {
            tracing::debug!(%path, "load started");
            self.start(path, &completion, loader);
        }
        if let Some(cycle) = cycle {
            return Err(cycle);
        }
        completion.wait().await
    }

    fn wait(
        &self,
        waiter: &ResolvedPath,
        target: &ResolvedPath,
        completion: &Completion,
    ) -> Result<(), AcquireError> {
        let mut waits = self.waits.lock();
        // A settled target cannot block; a settled waiter is not waiting.
        if completion.is_done() || !self.is_pending(waiter) {
            return Ok(());
        }
        waits.wait(waiter, target).map_err(|chain| {
            tracing::debug!(%waiter, %target, "acquisition cycle");
            AcquireError::Cycle {
                path: target.clone(),
                chain,
            }
        })
    }

    fn start<F, Fut>(&self, path: ResolvedPath, completion: &Arc<Completion>, loader: F)
    where
        F: FnOnce(ResolvedPath) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let settle = SettleOnDrop::new(Arc::clone(completion));
        let release = Release {
            waits: Arc::clone(&self.waits),
            path: path.clone(),
        };
        let load = loader(path);
        tokio::spawn(async move {
            let outcome = load.await;
            drop(release);
            settle.finish(outcome);
        });
    }

    /// Number of entries, pending or done.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `path` has a settled outcome.
    pub fn is_cached(&self, path: &ResolvedPath) -> bool {
        self.entries.get(path).is_some_and(|c| c.is_done())
    }

    /// Returns `true` if a load of `path` is in flight.
    pub fn is_pending(&self, path: &ResolvedPath) -> bool {
        self.entries.get(path).is_some_and(|c| !c.is_done())
    }

    /// The settled outcome for `path`, without waiting.
    pub fn peek(&self, path: &ResolvedPath) -> Option<Outcome> {
        self.entries.get(path).and_then(|c| c.get())
    }
}

/// Drops a load's outgoing waits once it ends, however it ends.
struct Release {
    waits: Arc<Mutex<WaitGraph>>,
    path: ResolvedPath,
}

impl Drop for Release {
    fn drop(&mut self) {
        self.waits.lock().release(&self.path);
    }
}

impl std::fmt::Debug for LoadCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
