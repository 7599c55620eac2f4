//! Concurrent rendering from several threads against one display.
//!
//! The main thread owns the `Display` and the selected `PixelConfig`; each
//! worker borrows both, creates its own `GpuContext`, and tears it down before
//! it returns. Workers run inside a `std::thread::scope`, so they are joined
//! before the caller can terminate the display.

mod signal;
mod state;
mod threads;

pub use signal::{ReadySignal, Readiness, StopToken};
pub use state::{StateTracker, WorkerState};
pub use threads::{
    LoopLimit, SharedGpu, ThreadPlan, ThreadReport, run_looping_worker, run_oneshot_worker,
    run_render_threads,
};
