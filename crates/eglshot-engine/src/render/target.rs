use anyhow::{Result, anyhow};
use glow::HasContext;

use crate::device::{GlErrorPolicy, check_gl};

/// Offscreen render target: one framebuffer object with an RGB8 texture as
/// color attachment 0. No depth or stencil.
#[derive(Debug)]
pub struct Framebuffer {
    fbo: glow::NativeFramebuffer,
    color: glow::NativeTexture,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Allocates the framebuffer and its color texture.
    ///
    /// The texture uses nearest filtering and clamp-to-edge wrapping. Both the
    /// framebuffer and texture bindings are back at 0 when this returns.
    pub fn new(gl: &glow::Context, width: u32, height: u32, policy: GlErrorPolicy) -> Result<Self> {
        // SAFETY: object creation and parameter setup on the caller's current
        // context; the pixel pointer is null (storage only).
        unsafe {
            let fbo = gl
                .create_framebuffer()
                .map_err(|reason| anyhow!("glGenFramebuffers failed: {reason}"))?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            check_gl(gl, "glBindFramebuffer", policy);

            let color = match gl.create_texture() {
                Ok(color) => color,
                Err(reason) => {
                    gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                    gl.delete_framebuffer(fbo);
                    return Err(anyhow!("glGenTextures failed: {reason}"));
                }
            };
            gl.bind_texture(glow::TEXTURE_2D, Some(color));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB as i32,
                width as i32,
                height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                None,
            );
            check_gl(gl, "glTexImage2D", policy);

            for (parameter, value, label) in [
                (glow::TEXTURE_MIN_FILTER, glow::NEAREST, "glTexParameteri GL_TEXTURE_MIN_FILTER"),
                (glow::TEXTURE_MAG_FILTER, glow::NEAREST, "glTexParameteri GL_TEXTURE_MAG_FILTER"),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE, "glTexParameteri GL_TEXTURE_WRAP_S"),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE, "glTexParameteri GL_TEXTURE_WRAP_T"),
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_2D, parameter, value as i32);
                check_gl(gl, label, policy);
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
            check_gl(gl, "glBindTexture", policy);

            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );
            check_gl(gl, "glFramebufferTexture2D", policy);

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::warn!("framebuffer incomplete: status {status:#06x}");
            }

            gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            Ok(Self {
                fbo,
                color,
                width,
                height,
            })
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Makes this the draw + read framebuffer.
    pub fn bind(&self, gl: &glow::Context, policy: GlErrorPolicy) {
        // SAFETY: the framebuffer belongs to this context.
        unsafe { gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo)) };
        check_gl(gl, "glBindFramebuffer", policy);
    }

    /// Restores the default framebuffer binding.
    pub fn unbind(gl: &glow::Context) {
        // SAFETY: binding 0 is always valid.
        unsafe { gl.bind_framebuffer(glow::FRAMEBUFFER, None) };
    }

    pub fn destroy(self, gl: &glow::Context) {
        // SAFETY: both objects belong to this context and are consumed here.
        unsafe {
            gl.delete_framebuffer(self.fbo);
            gl.delete_texture(self.color);
        }
    }
}
