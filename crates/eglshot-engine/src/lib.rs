//! eglshot engine crate.
//!
//! Shared pieces of the offscreen EGL demos: display bootstrap, per-thread
//! GPU contexts, framebuffer/shader/draw helpers, pixel readback + PNG export
//! and the worker-thread orchestration used by the threaded demo.

pub mod config;
pub mod device;
pub mod logging;
pub mod readback;
pub mod render;
pub mod worker;
