use std::marker::PhantomData;

use anyhow::Result;
use glow::HasContext;
use khronos_egl as egl;

use crate::config::CanvasConfig;
use crate::readback::pixel_data_size;

use super::display::Display;
use super::error::egl_failure;
use super::pixel_format::PixelConfig;

/// Color read format/type the implementation prefers for `glReadPixels`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReadFormat {
    pub format: u32,
    pub ty: u32,
}

impl ReadFormat {
    /// Whether the preferred format is the RGBA/UNSIGNED_BYTE pair readback uses.
    pub fn is_rgba8(&self) -> bool {
        self.format == glow::RGBA && self.ty == glow::UNSIGNED_BYTE
    }
}

/// A pbuffer surface + GLES context pair, current on the creating thread.
///
/// This is the per-thread rendering context:
/// - created from the shared `Display` + `PixelConfig`
/// - made current on construction and released on drop
/// - owns the `glow` function table every GL helper is handed explicitly
///
/// `GpuContext` is neither `Send` nor `Sync`: it is created, used and dropped
/// on one thread. The `'d` borrow keeps it from outliving the display.
pub struct GpuContext<'d> {
    display: &'d Display,
    surface: egl::Surface,
    context: egl::Context,
    gl: glow::Context,
    width: u32,
    height: u32,
    _thread_bound: PhantomData<*const ()>,
}

impl<'d> GpuContext<'d> {
    /// Creates a context and a `canvas`-sized pbuffer, then makes them current.
    pub fn new(display: &'d Display, config: &PixelConfig, canvas: &CanvasConfig) -> Result<Self> {
        let egl = display.egl();
        let raw_display = display.raw();

        let context_attribs = [egl::CONTEXT_CLIENT_VERSION, canvas.client_version, egl::NONE];
        let context = egl
            .create_context(raw_display, config.raw(), None, &context_attribs)
            .map_err(egl_failure("eglCreateContext"))?;

        let pbuffer_attribs = [
            egl::WIDTH,
            canvas.width as egl::Int,
            egl::HEIGHT,
            canvas.height as egl::Int,
            egl::NONE,
        ];
        let surface = match egl.create_pbuffer_surface(raw_display, config.raw(), &pbuffer_attribs) {
            Ok(surface) => surface,
            Err(err) => {
                release_context(display, context);
                return Err(egl_failure("eglCreatePbufferSurface")(err));
            }
        };

        if let Err(err) = egl.make_current(raw_display, Some(surface), Some(surface), Some(context)) {
            release_surface(display, surface);
            release_context(display, context);
            return Err(egl_failure("eglMakeCurrent")(err));
        }

        if let Err(err) = require_core_entry_points(|name| egl.get_proc_address(name).is_some()) {
            release_current(display);
            release_surface(display, surface);
            release_context(display, context);
            return Err(err);
        }

        // SAFETY: the context was just made current on this thread, so the
        // resolved entry points belong to it.
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                egl.get_proc_address(name)
                    .map_or(std::ptr::null(), |proc| proc as *const std::ffi::c_void)
            })
        };

        log::info!(
            "thread {:?} display {raw_display:?} context {context:?} surface {surface:?} ({}x{})",
            std::thread::current().id(),
            canvas.width,
            canvas.height,
        );

        Ok(Self {
            display,
            surface,
            context,
            gl,
            width: canvas.width,
            height: canvas.height,
            _thread_bound: PhantomData,
        })
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Queries `GL_IMPLEMENTATION_COLOR_READ_FORMAT` / `_TYPE`.
    ///
    /// GLES may hand back a surface format other than the one requested
    /// (5-6-5 and friends), so the demos log this once per context.
    pub fn read_format(&self) -> ReadFormat {
        // SAFETY: plain state queries on the current context.
        let (format, ty) = unsafe {
            (
                self.gl.get_parameter_i32(glow::IMPLEMENTATION_COLOR_READ_FORMAT),
                self.gl.get_parameter_i32(glow::IMPLEMENTATION_COLOR_READ_TYPE),
            )
        };
        let read = ReadFormat {
            format: format as u32,
            ty: ty as u32,
        };
        log::info!(
            "support color format {:#06x} type {:#06x} ({} bytes per frame)",
            read.format,
            read.ty,
            pixel_data_size(self.width as i32, self.height as i32, read.format, read.ty),
        );
        if !read.is_rgba8() {
            log::warn!("implementation prefers a read format other than RGBA/UNSIGNED_BYTE; readback converts");
        }
        read
    }

    /// Logs whatever EGL currently reports as current on this thread.
    pub fn log_current_bindings(&self) {
        let egl = self.display.egl();
        log::debug!(
            "thread {:?} display {:?} context {:?} surface {:?}",
            std::thread::current().id(),
            egl.get_current_display(),
            egl.get_current_context(),
            egl.get_current_surface(egl::READ),
        );
    }
}

impl Drop for GpuContext<'_> {
    fn drop(&mut self) {
        release_current(self.display);
        release_surface(self.display, self.surface);
        release_context(self.display, self.context);
        log::debug!("context {:?} torn down", self.context);
    }
}

/// Fails unless core GLES entry points resolve through `eglGetProcAddress`.
///
/// EGL only guarantees that from 1.5 on (or with
/// `EGL_KHR_get_all_proc_addresses`); without it every GL call would go
/// through a null pointer.
fn require_core_entry_points(resolves: impl Fn(&str) -> bool) -> Result<()> {
    const PROBED: [&str; 3] = ["glGetError", "glGetString", "glReadPixels"];

    if let Some(missing) = PROBED.into_iter().find(|name| !resolves(*name)) {
        anyhow::bail!(
            "eglGetProcAddress cannot resolve core entry point {missing}; \
             EGL 1.5 or EGL_KHR_get_all_proc_addresses is required"
        );
    }
    Ok(())
}

fn release_current(display: &Display) {
    if let Err(err) = display.egl().make_current(display.raw(), None, None, None) {
        log::warn!("failed to release current context: {err}");
    }
}

fn release_surface(display: &Display, surface: egl::Surface) {
    if let Err(err) = display.egl().destroy_surface(display.raw(), surface) {
        log::error!("eglDestroySurface failed: {err}");
    }
}

fn release_context(display: &Display, context: egl::Context) {
    if let Err(err) = display.egl().destroy_context(display.raw(), context) {
        log::error!("eglDestroyContext failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_unsigned_byte_is_the_readback_format() {
        let read = ReadFormat {
            format: glow::RGBA,
            ty: glow::UNSIGNED_BYTE,
        };
        assert!(read.is_rgba8());
        assert!(!ReadFormat { format: glow::RGB, ty: glow::UNSIGNED_SHORT_5_6_5 }.is_rgba8());
    }

    #[test]
    fn missing_core_entry_point_is_reported_by_name() {
        let err = require_core_entry_points(|name| name != "glGetError").unwrap_err();
        assert!(err.to_string().contains("glGetError"));
    }

    #[test]
    fn resolvable_entry_points_pass() {
        assert!(require_core_entry_points(|_| true).is_ok());
    }
}
