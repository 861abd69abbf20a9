use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

/// Deferred action waiting for the gate's value
pub type PendingOperation<T> = Box<dyn FnOnce(&T) + Send>;

/// Handle to a queued operation, used to withdraw it with [`RequestGate::cancel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingId(u64);

type Queue<T> = Vec<(PendingId, PendingOperation<T>)>;

enum GateState<T> {
    Unready(Queue<T>),
    // value supplied, queued operations still being released
    Draining(Arc<T>, Queue<T>),
    Ready(Arc<T>),
}

/// Single-slot readiness gate.
///
/// Operations registered before [`RequestGate::supply`] are queued and run once, in
/// registration order, when the value arrives. Operations registered while that queue is
/// being released join the end of it, from any thread. Once the queue is empty, operations
/// run immediately on the caller's thread. Operations always run outside the internal lock,
/// so they may register further operations.
pub struct RequestGate<T> {
    state: Mutex<GateState<T>>,
    next_id: AtomicU64,
}

impl<T> Default for RequestGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestGate<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Unready(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState<T>> {
        // a panicking operation never runs under the lock, so poisoning carries no torn state
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `op` with the value, now or once it is supplied.
    ///
    /// Returns the queue handle when the operation was deferred, `None` when it already ran.
    pub fn run_when_ready<F>(&self, op: F) -> Option<PendingId>
    where
        F: FnOnce(&T) + Send + 'static,
    {
        let ready = {
            let mut state = self.lock();
            match &mut *state {
                GateState::Ready(value) => Arc::clone(value),
                GateState::Unready(queue) | GateState::Draining(_, queue) => {
                    let id = PendingId(self.next_id.fetch_add(1, Ordering::Relaxed));
                    queue.push((id, Box::new(op)));
                    debug!(pending = queue.len(), "operation queued until configuration is ready");
                    return Some(id);
                }
            }
        };
        op(&ready);
        None
    }

    /// Withdraw a queued operation. Returns false if it already ran or was withdrawn.
    pub fn cancel(&self, id: PendingId) -> bool {
        let mut state = self.lock();
        let queue = match &mut *state {
            GateState::Unready(queue) | GateState::Draining(_, queue) => queue,
            GateState::Ready(_) => return false,
        };
        match queue.iter().position(|(queued, _)| *queued == id) {
            Some(index) => {
                let (_, op) = queue.remove(index);
                // the operation's captures drop outside the lock
                drop(state);
                drop(op);
                true
            }
            None => false,
        }
    }

    /// Store the value and release every queued operation.
    ///
    /// A second call replaces the stored value; operations released earlier are not re-run.
    pub fn supply(&self, value: T) {
        let value = Arc::new(value);
        let mut batch = {
            let mut state = self.lock();
            match mem::replace(&mut *state, GateState::Ready(Arc::clone(&value))) {
                GateState::Unready(queue) => {
                    *state = GateState::Draining(Arc::clone(&value), Vec::new());
                    queue
                }
                GateState::Draining(_, queue) => {
                    // the running drain picks up the new value for what is still queued
                    *state = GateState::Draining(value, queue);
                    return;
                }
                GateState::Ready(_) => return,
            }
        };

        debug!(released = batch.len(), "configuration ready, releasing queued operations");
        let mut current = value;
        loop {
            for (_, op) in batch {
                op(&current);
            }

            let mut state = self.lock();
            match &mut *state {
                GateState::Draining(latest, queue) if !queue.is_empty() => {
                    current = Arc::clone(latest);
                    batch = mem::take(queue);
                }
                GateState::Draining(latest, _) => {
                    let latest = Arc::clone(latest);
                    *state = GateState::Ready(latest);
                    return;
                }
                _ => return,
            }
        }
    }

    /// True once a value has been supplied
    pub fn is_ready(&self) -> bool {
        !matches!(&*self.lock(), GateState::Unready(_))
    }

    /// Current value, if supplied
    pub fn value(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            GateState::Ready(value) | GateState::Draining(value, _) => Some(Arc::clone(value)),
            GateState::Unready(_) => None,
        }
    }

    pub fn pending(&self) -> usize {
        match &*self.lock() {
            GateState::Ready(_) => 0,
            GateState::Unready(queue) | GateState::Draining(_, queue) => queue.len(),
        }
    }
}
