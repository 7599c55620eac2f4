use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Cooperative stop flag for long-running render loops.
///
/// Clones share one flag. Loops poll it once per iteration, so a stop takes
/// effect after the frame in flight is written.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Outcome a worker reports once its setup phase is over.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Readiness {
    /// Context bound and pipeline built.
    Ready,
    /// Setup failed; the worker is exiting.
    Failed,
}

/// One-shot readiness handoff between a worker and the thread waiting on it.
///
/// The first `notify` wins; later calls are ignored.
#[derive(Debug, Default)]
pub struct ReadySignal {
    state: Mutex<Option<Readiness>>,
    changed: Condvar,
}

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self, readiness: Readiness) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_none() {
            *state = Some(readiness);
            self.changed.notify_all();
        }
    }

    /// Blocks until a worker has called `notify`.
    pub fn wait(&self) -> Readiness {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = self
            .changed
            .wait_while(state, |state| state.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        (*state).unwrap_or(Readiness::Failed)
    }

    pub fn peek(&self) -> Option<Readiness> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
