//! Once-set completion cell with FIFO waiters.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use acq_script::Value;

use crate::error::AcquireError;

/// Terminal result of an acquisition or a load.
pub type Outcome = Result<Value, AcquireError>;

enum State {
    Pending(Vec<oneshot::Sender<Outcome>>),
    Done(Outcome),
}

/// A cell that settles once and hands a clone of its outcome to every
/// waiter, in the order they subscribed.
pub(crate) struct Completion {
    state: Mutex<State>,
}

impl Completion {
    pub(crate) fn new() -> Self {
        Completion {
            state: Mutex::new(State::Pending(Vec::new())),
        }
    }

    /// Settle the cell. Returns `false` if it was already settled, in which
    /// case `outcome` is discarded.
    pub(crate) fn complete(&self, outcome: Outcome) -> bool {
        let waiters = {
            let mut state = self.state.lock();
            match &mut *state {
                State::Done(_) => return false,
                State::Pending(waiters) => {
                    let waiters = std::mem::take(waiters);
                    *state = State::Done(outcome.clone());
                    waiters
                }
            }
        };
        // Sent outside the lock; a dropped receiver just means the waiter
        // stopped listening.
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
        true
    }

    /// Wait for the outcome.
    pub(crate) async fn wait(&self) -> Outcome {
        let receiver = {
            let mut state = self.state.lock();
            match &mut *state {
                State::Done(outcome) => return outcome.clone(),
                State::Pending(waiters) => {
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    receiver
                }
            }
        };
        receiver.await.unwrap_or(Err(AcquireError::Abandoned))
    }

    pub(crate) fn get(&self) -> Option<Outcome> {
        match &*self.state.lock() {
            State::Done(outcome) => Some(outcome.clone()),
            State::Pending(_) => None,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        matches!(&*self.state.lock(), State::Done(_))
    }
}

/// Settles a completion with [`AcquireError::Abandoned`] unless
/// [`finish`](SettleOnDrop::finish) runs first.
///
/// Built before the owning task is spawned and moved into its future, so a
/// task dropped before its first poll still settles.
pub(crate) struct SettleOnDrop(Arc<Completion>);

impl SettleOnDrop {
    pub(crate) fn new(completion: Arc<Completion>) -> Self {
        SettleOnDrop(completion)
    }

    pub(crate) fn finish(self, outcome: Outcome) {
        self.0.complete(outcome);
    }
}

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        self.0.complete(Err(AcquireError::Abandoned));
    }
}
