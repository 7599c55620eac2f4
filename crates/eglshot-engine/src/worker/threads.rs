use std::path::{Path, PathBuf};
use std::thread::{self, ScopedJoinHandle};

use anyhow::{Context, Result, anyhow};

use crate::config::CanvasConfig;
use crate::device::{Display, GlErrorPolicy, GpuContext, PixelConfig};
use crate::readback::{PixelBuffer, read_framebuffer_into, write_png};
use crate::render::{Framebuffer, TexturedQuadRenderer, render_triangle_to_file};

use super::signal::{ReadySignal, Readiness, StopToken};
use super::state::{StateTracker, WorkerState};

const LOOP_THREAD: &str = "render-loop";
const ONCE_THREAD: &str = "render-once";

/// Read-only state every worker borrows from the main thread.
#[derive(Debug, Copy, Clone)]
pub struct SharedGpu<'a> {
    pub display: &'a Display,
    pub config: &'a PixelConfig,
    pub canvas: &'a CanvasConfig,
}

/// How many frames the looping worker renders before returning on its own.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopLimit {
    /// Keep going until the stop token fires.
    Unbounded,
    Frames(u64),
}

impl LoopLimit {
    /// Whether another frame may start after `rendered` frames.
    pub fn allows(self, rendered: u64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Frames(limit) => rendered < limit,
        }
    }
}

/// Inputs of one threaded run.
#[derive(Debug, Clone)]
pub struct ThreadPlan {
    pub looping_output: PathBuf,
    pub oneshot_output: PathBuf,
    pub limit: LoopLimit,
    pub stop: StopToken,
    pub policy: GlErrorPolicy,
}

impl ThreadPlan {
    /// Plan writing to the canvas outputs: the loop overwrites the primary
    /// file, the one-shot worker writes the secondary one.
    pub fn for_canvas(canvas: &CanvasConfig, limit: LoopLimit, policy: GlErrorPolicy) -> Self {
        Self {
            looping_output: canvas.primary_output.clone(),
            oneshot_output: canvas.secondary_output.clone(),
            limit,
            stop: StopToken::new(),
            policy,
        }
    }
}

/// What came back from a threaded run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ThreadReport {
    /// Frames the looping worker wrote before it stopped.
    pub frames_rendered: u64,
}

/// Runs the looping and the one-shot worker concurrently and joins both.
///
/// The one-shot worker is only spawned after the looping worker reported
/// readiness (or failure), so the two never race through context setup.
/// Returns once both threads have torn down their contexts; the display may
/// then be terminated.
pub fn run_render_threads(shared: SharedGpu<'_>, plan: &ThreadPlan) -> Result<ThreadReport> {
    let ready = ReadySignal::new();

    thread::scope(|scope| -> Result<ThreadReport> {
        let looping = thread::Builder::new()
            .name(LOOP_THREAD.to_owned())
            .spawn_scoped(scope, || {
                run_looping_worker(shared, &plan.looping_output, plan.limit, &plan.stop, &ready, plan.policy)
            })
            .context("failed to spawn render-loop thread")?;

        if ready.wait() == Readiness::Failed {
            log::warn!("{LOOP_THREAD} failed during setup; starting {ONCE_THREAD} anyway");
        }

        let spawned = thread::Builder::new()
            .name(ONCE_THREAD.to_owned())
            .spawn_scoped(scope, || run_oneshot_worker(shared, &plan.oneshot_output, plan.policy));
        let oneshot = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                plan.stop.stop();
                if let Err(loop_err) = join_worker(looping, LOOP_THREAD) {
                    log::error!("{LOOP_THREAD}: {loop_err:#}");
                }
                return Err(anyhow!(err).context("failed to spawn render-once thread"));
            }
        };

        let frames = join_worker(looping, LOOP_THREAD);
        let once = join_worker(oneshot, ONCE_THREAD);

        let frames_rendered = frames?;
        once?;
        Ok(ThreadReport { frames_rendered })
    })
}

/// Worker A: binds its own context, builds the textured-quad pipeline once
/// and re-renders into `output` until `limit` is reached or `stop` fires.
///
/// `ready` is notified as soon as setup finished or failed. Returns the
/// number of frames written.
pub fn run_looping_worker(
    shared: SharedGpu<'_>,
    output: &Path,
    limit: LoopLimit,
    stop: &StopToken,
    ready: &ReadySignal,
    policy: GlErrorPolicy,
) -> Result<u64> {
    let _unblock = NotifyOnDrop(ready);
    let mut tracker = StateTracker::new(LOOP_THREAD);
    log_shared(&shared);

    let ctx = GpuContext::new(shared.display, shared.config, shared.canvas)
        .inspect_err(|_| tracker.advance(WorkerState::Teardown))?;
    tracker.advance(WorkerState::ContextBound);
    ctx.read_format();

    let gl = ctx.gl();
    let (target, renderer) =
        prepare_quad(&ctx, policy).inspect_err(|_| tracker.advance(WorkerState::Teardown))?;
    ready.notify(Readiness::Ready);
    tracker.advance(WorkerState::Rendering);

    let result = render_loop(&ctx, &target, &renderer, output, limit, stop, policy);

    tracker.advance(WorkerState::Teardown);
    renderer.destroy(gl);
    target.destroy(gl);
    drop(ctx);

    if let Ok(frames) = &result {
        log::info!("{LOOP_THREAD} stopped after {frames} frames");
    }
    result
}

/// Worker B: binds its own context, renders the triangle once into `output`
/// and tears everything down.
pub fn run_oneshot_worker(shared: SharedGpu<'_>, output: &Path, policy: GlErrorPolicy) -> Result<()> {
    let mut tracker = StateTracker::new(ONCE_THREAD);
    log_shared(&shared);

    let ctx = GpuContext::new(shared.display, shared.config, shared.canvas)
        .inspect_err(|_| tracker.advance(WorkerState::Teardown))?;
    tracker.advance(WorkerState::ContextBound);
    ctx.read_format();

    tracker.advance(WorkerState::Rendering);
    let result = render_triangle_to_file(&ctx, output, policy).map(|_| ());

    tracker.advance(WorkerState::Teardown);
    drop(ctx);
    result
}

fn prepare_quad(ctx: &GpuContext<'_>, policy: GlErrorPolicy) -> Result<(Framebuffer, TexturedQuadRenderer)> {
    let gl = ctx.gl();
    let target = Framebuffer::new(gl, ctx.width(), ctx.height(), policy)?;
    match TexturedQuadRenderer::new(gl) {
        Ok(renderer) => Ok((target, renderer)),
        Err(err) => {
            target.destroy(gl);
            Err(err)
        }
    }
}

fn render_loop(
    ctx: &GpuContext<'_>,
    target: &Framebuffer,
    renderer: &TexturedQuadRenderer,
    output: &Path,
    limit: LoopLimit,
    stop: &StopToken,
    policy: GlErrorPolicy,
) -> Result<u64> {
    let gl = ctx.gl();
    let mut pixels = PixelBuffer::new(target.width(), target.height());
    let mut frames = 0;

    while limit.allows(frames) && !stop.is_stopped() {
        renderer.draw(gl, target, policy);
        ctx.log_current_bindings();
        read_framebuffer_into(gl, target, &mut pixels, policy);
        write_png(output, &pixels)?;
        frames += 1;

        if frames == 1 {
            log::info!("finish saving {}", output.display());
        } else {
            log::debug!("finish saving {} (frame {frames})", output.display());
        }
    }
    Ok(frames)
}

fn join_worker<T>(handle: ScopedJoinHandle<'_, Result<T>>, name: &str) -> Result<T> {
    let outcome = handle
        .join()
        .map_err(|_| anyhow!("{name} thread panicked"))?;
    log::debug!("{name}: joined");
    outcome.with_context(|| format!("{name} failed"))
}

fn log_shared(shared: &SharedGpu<'_>) {
    log::info!(
        "thread {:?} display {:?} config {:?} width {} height {}",
        thread::current().id(),
        shared.display.raw(),
        shared.config.raw(),
        shared.canvas.width,
        shared.canvas.height,
    );
}

/// Reports `Failed` if the worker leaves before announcing readiness,
/// including by panic, so the spawning thread never waits forever.
struct NotifyOnDrop<'a>(&'a ReadySignal);

impl Drop for NotifyOnDrop<'_> {
    fn drop(&mut self) {
        self.0.notify(Readiness::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_loop_always_allows_another_frame() {
        assert!(LoopLimit::Unbounded.allows(0));
        assert!(LoopLimit::Unbounded.allows(u64::MAX));
    }

    #[test]
    fn frame_limit_is_exclusive() {
        let limit = LoopLimit::Frames(3);
        assert!(limit.allows(0));
        assert!(limit.allows(2));
        assert!(!limit.allows(3));
        assert!(!LoopLimit::Frames(0).allows(0));
    }

    #[test]
    fn plan_uses_canvas_outputs() {
        let canvas = CanvasConfig::default();
        let plan = ThreadPlan::for_canvas(&canvas, LoopLimit::Unbounded, GlErrorPolicy::Abort);
        assert_eq!(plan.looping_output, canvas.primary_output);
        assert_eq!(plan.oneshot_output, canvas.secondary_output);
        assert!(!plan.stop.is_stopped());
    }

    #[test]
    fn dropping_guard_reports_failure_once() {
        let ready = ReadySignal::new();
        drop(NotifyOnDrop(&ready));
        assert_eq!(ready.peek(), Some(Readiness::Failed));
    }

    #[test]
    fn guard_does_not_override_ready() {
        let ready = ReadySignal::new();
        {
            let _guard = NotifyOnDrop(&ready);
            ready.notify(Readiness::Ready);
        }
        assert_eq!(ready.peek(), Some(Readiness::Ready));
    }
}
