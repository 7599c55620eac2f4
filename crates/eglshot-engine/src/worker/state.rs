/// Lifecycle of a render worker thread, up to the point it returns.
///
/// Joining is observed by the spawning thread, not tracked here.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum WorkerState {
    Created,
    ContextBound,
    Rendering,
    Teardown,
}

impl WorkerState {
    /// Whether `next` may follow `self`.
    ///
    /// States only move forward; a worker that fails during setup may skip
    /// straight to `Teardown`.
    pub fn can_advance_to(self, next: WorkerState) -> bool {
        match (self, next) {
            (Self::Created, Self::ContextBound | Self::Teardown)
            | (Self::ContextBound, Self::Rendering | Self::Teardown)
            | (Self::Rendering, Self::Teardown) => true,
            _ => false,
        }
    }
}

/// Per-worker state holder that logs each transition.
#[derive(Debug)]
pub struct StateTracker {
    name: &'static str,
    state: WorkerState,
}

impl StateTracker {
    pub fn new(name: &'static str) -> Self {
        log::debug!("{name}: {:?}", WorkerState::Created);
        Self {
            name,
            state: WorkerState::Created,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Moves to `next`. Out-of-order transitions are logged and ignored.
    pub fn advance(&mut self, next: WorkerState) {
        if !self.state.can_advance_to(next) {
            log::warn!("{}: ignoring transition {:?} -> {next:?}", self.name, self.state);
            return;
        }
        log::debug!("{}: {:?} -> {next:?}", self.name, self.state);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_accepted() {
        let mut tracker = StateTracker::new("test");
        for next in [
            WorkerState::ContextBound,
            WorkerState::Rendering,
            WorkerState::Teardown,
        ] {
            tracker.advance(next);
            assert_eq!(tracker.state(), next);
        }
    }

    #[test]
    fn setup_failure_skips_to_teardown() {
        assert!(WorkerState::Created.can_advance_to(WorkerState::Teardown));
        assert!(WorkerState::ContextBound.can_advance_to(WorkerState::Teardown));
    }

    #[test]
    fn backwards_transition_is_ignored() {
        let mut tracker = StateTracker::new("test");
        tracker.advance(WorkerState::ContextBound);
        tracker.advance(WorkerState::Rendering);
        tracker.advance(WorkerState::ContextBound);
        assert_eq!(tracker.state(), WorkerState::Rendering);
    }

    #[test]
    fn teardown_is_final() {
        for next in [WorkerState::Created, WorkerState::ContextBound, WorkerState::Rendering] {
            assert!(!WorkerState::Teardown.can_advance_to(next));
        }
        assert!(!WorkerState::Created.can_advance_to(WorkerState::Rendering));
    }
}
