use anyhow::{Context, Result};
use khronos_egl as egl;

use super::error::egl_failure;
use super::pixel_format::{ConfigRequirements, ConfigSource, PixelConfig, select_config};

/// Run-time loaded EGL 1.4 entry points.
pub type Egl = egl::DynamicInstance<egl::EGL1_4>;

/// Connection to the default EGL display.
///
/// One instance per process, owned by the main thread and terminated last.
/// Worker threads only ever borrow it, so the borrow checker enforces that
/// every context created against it is gone before `terminate` runs.
#[derive(Debug)]
pub struct Display {
    egl: Egl,
    raw: egl::Display,
    terminated: bool,
}

// SAFETY: EGLDisplay handles are process-wide and EGL entry points may be
// called from any thread; all per-thread state (current context/surface) lives
// in `GpuContext`, which is not `Send`.
unsafe impl Send for Display {}
// SAFETY: see above; `Display` exposes no interior mutability.
unsafe impl Sync for Display {}

impl Display {
    /// Loads libEGL, opens `EGL_DEFAULT_DISPLAY` and initializes it.
    pub fn open() -> Result<Self> {
        // SAFETY: loading libEGL runs its initializers; nothing else in the
        // process is holding EGL state yet.
        let egl = unsafe { Egl::load_required() }
            .map_err(|err| anyhow::anyhow!("failed to load libEGL: {err}"))?;

        // SAFETY: EGL_DEFAULT_DISPLAY is always a valid native display id.
        let raw = unsafe { egl.get_display(egl::DEFAULT_DISPLAY) }
            .context("eglGetDisplay returned EGL_NO_DISPLAY")?;

        let (major, minor) = egl
            .initialize(raw)
            .map_err(egl_failure("eglInitialize"))?;

        log::info!("EGL {major}.{minor} initialized on display {raw:?}");

        Ok(Self {
            egl,
            raw,
            terminated: false,
        })
    }

    pub fn egl(&self) -> &Egl {
        &self.egl
    }

    pub fn raw(&self) -> egl::Display {
        self.raw
    }

    /// Picks the shared pixel-format config for this display.
    pub fn select_config(&self, requirements: &ConfigRequirements) -> Result<PixelConfig> {
        let raw = select_config(self, requirements)?;
        Ok(PixelConfig::new(raw))
    }

    /// Binds OpenGL ES as the client API for contexts created from now on.
    pub fn bind_gles_api(&self) -> Result<()> {
        self.egl
            .bind_api(egl::OPENGL_ES_API)
            .map_err(egl_failure("eglBindAPI"))
    }

    /// Terminates the display connection.
    ///
    /// Dropping a `Display` terminates it as well; calling this instead
    /// surfaces the error to the caller.
    pub fn terminate(mut self) -> Result<()> {
        self.terminated = true;
        self.egl
            .terminate(self.raw)
            .map_err(egl_failure("eglTerminate"))?;
        log::info!("display {:?} terminated", self.raw);
        Ok(())
    }
}

impl ConfigSource for Display {
    type Config = egl::Config;

    fn config_count(&self) -> Result<usize> {
        self.egl
            .get_config_count(self.raw)
            .map_err(egl_failure("eglGetConfigs"))
    }

    fn choose_configs(&self, attribs: &[egl::Int], capacity: usize) -> Result<Vec<egl::Config>> {
        let mut configs = Vec::with_capacity(capacity);
        self.egl
            .choose_config(self.raw, attribs, &mut configs)
            .map_err(egl_failure("eglChooseConfig"))?;
        Ok(configs)
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        if self.terminated {
            return;
        }
        if let Err(err) = self.egl.terminate(self.raw) {
            log::warn!("eglTerminate on drop failed: {err}");
        }
    }
}
