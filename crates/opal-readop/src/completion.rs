use std::sync::{Arc, Condvar, Mutex};

use opal_types::{OpError, OpResult};

/// Lifecycle phase of a completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Created, not yet submitted.
    Idle,
    /// Submitted; the engine owns the transition out of this phase.
    InFlight,
    /// Terminal. The return value is readable and the callback has fired.
    Complete,
}

struct CompletionState {
    phase: Phase,
    /// Durability flag, orthogonal to completion. Read operations are
    /// durable as soon as they complete.
    safe: bool,
    rval: Option<OpResult<i32>>,
}

type Callback = Box<dyn Fn(OpResult<i32>) + Send + Sync>;

struct CompletionInner {
    state: Mutex<CompletionState>,
    cond: Condvar,
    callback: Option<Callback>,
}

/// Handle for the outcome of an asynchronous dispatch.
///
/// Tracks `Pending -> Complete` (terminal) plus an orthogonal durability
/// flag. Every result-slot write of the dispatched operation
/// happens-before the Complete transition; observing completion through
/// [`wait_for_complete`] or [`is_complete`] is the only cross-thread
/// synchronization the caller needs.
///
/// Cloning shares the same underlying state (the engine keeps one clone
/// while the operation is in flight). Dropping the caller's last handle
/// before completion detaches it: the engine still runs the operation to
/// completion and the outcome is discarded. A completion can be
/// submitted exactly once; reuse is rejected at submission time.
///
/// [`wait_for_complete`]: Completion::wait_for_complete
/// [`is_complete`]: Completion::is_complete
#[derive(Clone)]
pub struct Completion {
    inner: Arc<CompletionInner>,
}

impl Completion {
    /// Create a completion with no callback.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a completion whose callback fires exactly once, on an
    /// engine-managed thread, at the Complete transition — never
    /// synchronously within the submitting call.
    pub fn with_callback(callback: impl Fn(OpResult<i32>) + Send + Sync + 'static) -> Self {
        Self::build(Some(Box::new(callback)))
    }

    fn build(callback: Option<Callback>) -> Self {
        Self {
            inner: Arc::new(CompletionInner {
                state: Mutex::new(CompletionState {
                    phase: Phase::Idle,
                    safe: false,
                    rval: None,
                }),
                cond: Condvar::new(),
                callback,
            }),
        }
    }

    /// Block the calling thread until the operation completes.
    pub fn wait_for_complete(&self) {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        while state.phase != Phase::Complete {
            state = self.inner.cond.wait(state).expect("lock poisoned");
        }
    }

    /// Non-blocking completion poll.
    pub fn is_complete(&self) -> bool {
        self.inner.state.lock().expect("lock poisoned").phase == Phase::Complete
    }

    /// Whether the outcome is durable.
    pub fn is_safe(&self) -> bool {
        self.inner.state.lock().expect("lock poisoned").safe
    }

    /// The overall status of the dispatched operation; `None` before
    /// completion.
    pub fn return_value(&self) -> Option<OpResult<i32>> {
        self.inner
            .state
            .lock()
            .expect("lock poisoned")
            .rval
            .clone()
    }

    /// Claim this completion for a submission. Fails if it is already in
    /// flight or has already been consumed.
    pub(crate) fn claim(&self) -> OpResult<()> {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        match state.phase {
            Phase::Idle => {
                state.phase = Phase::InFlight;
                Ok(())
            }
            Phase::InFlight => Err(OpError::Rejected(
                "completion is already in flight".to_string(),
            )),
            Phase::Complete => Err(OpError::Rejected(
                "completion has already been consumed".to_string(),
            )),
        }
    }

    /// Transition to Complete with the overall status, wake waiters, and
    /// fire the callback. Called by the engine, on an engine thread.
    pub(crate) fn finish(&self, status: OpResult<i32>) {
        {
            let mut state = self.inner.state.lock().expect("lock poisoned");
            state.rval = Some(status.clone());
            // A read operation mutates nothing, so its outcome is durable
            // the moment it completes.
            state.safe = true;
            state.phase = Phase::Complete;
        }
        self.inner.cond.notify_all();
        if let Some(callback) = &self.inner.callback {
            callback(status);
        }
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().expect("lock poisoned");
        f.debug_struct("Completion")
            .field("phase", &state.phase)
            .field("safe", &state.safe)
            .finish()
    }
}
