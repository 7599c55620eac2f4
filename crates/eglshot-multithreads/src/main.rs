//! Threaded offscreen demo.
//!
//! The main thread opens the display and selects one config; two worker
//! threads then render concurrently with their own contexts:
//! - `render-loop` redraws a textured quad into `img.png` until stopped
//! - `render-once` draws a triangle into `img2.png` and exits
//!
//! The loop has no frame limit here; it runs until SIGINT or SIGTERM fires the
//! stop token, after which both workers tear down and the display is
//! terminated. Any GL error terminates the process with a non-zero exit code.

use anyhow::{Context, Result};

use eglshot_engine::config::CanvasConfig;
use eglshot_engine::device::{ConfigRequirements, Display, GlErrorPolicy};
use eglshot_engine::logging::{LoggingConfig, init_logging};
use eglshot_engine::worker::{LoopLimit, SharedGpu, StopToken, ThreadPlan, run_render_threads};

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = run(&CanvasConfig::default()) {
        log::error!("{err:#}");
    }
}

fn run(canvas: &CanvasConfig) -> Result<()> {
    let display = Display::open()?;
    let config = display.select_config(&ConfigRequirements::default())?;
    display.bind_gles_api()?;

    log::info!(
        "main thread {:?} display {:?} config {:?}",
        std::thread::current().id(),
        display.raw(),
        config.raw(),
    );

    let plan = ThreadPlan::for_canvas(canvas, LoopLimit::Unbounded, GlErrorPolicy::Abort);
    install_stop_handler(&plan.stop)?;

    let shared = SharedGpu {
        display: &display,
        config: &config,
        canvas,
    };
    let outcome = run_render_threads(shared, &plan);

    // Both workers are joined at this point, whatever the outcome.
    display.terminate()?;

    let report = outcome?;
    log::info!("render threads finished, {} looping frames", report.frames_rendered);
    Ok(())
}

/// Fires `stop` on Ctrl-C or SIGTERM.
fn install_stop_handler(stop: &StopToken) -> Result<()> {
    let stop = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("stop requested, finishing the current frame");
        stop.stop();
    })
    .context("failed to install the stop signal handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_handler_installs_without_firing() {
        let stop = StopToken::new();
        install_stop_handler(&stop).unwrap();
        assert!(!stop.is_stopped());
    }
}
