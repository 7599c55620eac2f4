use std::path::Path;

use anyhow::Result;

use crate::device::{GlErrorPolicy, GpuContext};
use crate::readback::{PixelBuffer, read_framebuffer, write_png};

use super::target::Framebuffer;
use super::triangle::TriangleRenderer;

/// One complete triangle pass on `ctx`: framebuffer setup, draw, readback,
/// PNG export, teardown.
///
/// Every GL object it creates is deleted before returning, also on error.
pub fn render_triangle_to_file(
    ctx: &GpuContext<'_>,
    output: &Path,
    policy: GlErrorPolicy,
) -> Result<PixelBuffer> {
    let gl = ctx.gl();
    let target = Framebuffer::new(gl, ctx.width(), ctx.height(), policy)?;

    let renderer = match TriangleRenderer::new(gl) {
        Ok(renderer) => renderer,
        Err(err) => {
            target.destroy(gl);
            return Err(err);
        }
    };
    renderer.draw(gl, &target, policy);
    renderer.destroy(gl);

    let pixels = read_framebuffer(gl, &target, policy);
    target.destroy(gl);

    write_png(output, &pixels)?;
    log::info!("finish saving {}", output.display());
    Ok(pixels)
}
