//! Which in-flight loads are waiting on which.
//!
//! A unit's outcome is published only after everything it acquired has
//! settled, so a request from unit `u` for a pending path `t` makes `u`
//! wait on `t`. Two loads that end up waiting on each other, through any
//! number of hops and across separate acquisition trees, would never
//! finish; [`WaitGraph::wait`] refuses the edge that closes such a loop.

use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};

use acq_resolve::ResolvedPath;

#[derive(Debug, Default)]
pub(crate) struct WaitGraph {
    edges: FxHashMap<ResolvedPath, Vec<ResolvedPath>>,
}

impl WaitGraph {
    /// Record that `waiter` waits on `target`.
    ///
    /// If `target` already waits on `waiter`, directly or transitively, the
    /// edge is not added and the loop `target -> ... -> waiter -> target` is
    /// returned instead.
    pub(crate) fn wait(
        &mut self,
        waiter: &ResolvedPath,
        target: &ResolvedPath,
    ) -> Result<(), Vec<PathBuf>> {
        if let Some(mut chain) = self.route(target, waiter) {
            chain.push(target.as_path().to_path_buf());
            return Err(chain);
        }
        let targets = self.edges.entry(waiter.clone()).or_default();
        if !targets.contains(target) {
            targets.push(target.clone());
        }
        Ok(())
    }

    /// Forget everything `path` was waiting on. Called when its load ends.
    pub(crate) fn release(&mut self, path: &ResolvedPath) {
        self.edges.remove(path);
    }

    #[cfg(test)]
    pub(crate) fn is_waiting(&self, path: &ResolvedPath) -> bool {
        self.edges.get(path).is_some_and(|targets| !targets.is_empty())
    }

    /// Depth-first search for `from -> ... -> to`, in edge insertion order.
    fn route<'a>(&'a self, from: &'a ResolvedPath, to: &ResolvedPath) -> Option<Vec<PathBuf>> {
        let mut seen: FxHashSet<&ResolvedPath> = FxHashSet::default();
        seen.insert(from);
        let mut trail: Vec<(&ResolvedPath, usize)> = vec![(from, 0)];

        loop {
            let &(node, index) = trail.last()?;
            if node == to {
                return Some(
                    trail
                        .iter()
                        .map(|(step, _)| step.as_path().to_path_buf())
                        .collect(),
                );
            }
            let successors = self.edges.get(node).map_or(&[][..], Vec::as_slice);
            match successors.get(index) {
                Some(next) => {
                    if let Some(top) = trail.last_mut() {
                        top.1 += 1;
                    }
                    if seen.insert(next) {
                        trail.push((next, 0));
                    }
                }
                None => {
                    trail.pop();
                }
            }
        }
    }
}
