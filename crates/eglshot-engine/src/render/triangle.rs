use anyhow::{Context, Result};
use glow::HasContext;

use crate::device::{GlErrorPolicy, check_gl};

use super::common::{PositionVertex, TRIANGLE_VERTICES, upload_static_buffer};
use super::shader::Program;
use super::target::Framebuffer;

const VERTEX_SRC: &str = include_str!("shaders/triangle.vert");
const FRAGMENT_SRC: &str = include_str!("shaders/triangle.frag");

/// Attribute location fixed by `layout(location = 0)` in the vertex shader.
const POSITION_LOCATION: u32 = 0;

/// Flat red triangle in the middle of the canvas.
#[derive(Debug)]
pub struct TriangleRenderer {
    program: Program,
    vbo: glow::NativeBuffer,
}

impl TriangleRenderer {
    /// Builds the program and uploads the three vertices.
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let program = Program::build(gl, VERTEX_SRC, FRAGMENT_SRC).context("triangle program")?;

        let vbo = match upload_static_buffer(
            gl,
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&TRIANGLE_VERTICES),
        ) {
            Ok(vbo) => vbo,
            Err(err) => {
                program.destroy(gl);
                return Err(err);
            }
        };

        Ok(Self { program, vbo })
    }

    /// Clears `target` and draws the triangle into it.
    pub fn draw(&self, gl: &glow::Context, target: &Framebuffer, policy: GlErrorPolicy) {
        target.bind(gl, policy);

        // SAFETY: all objects belong to the current context; the attribute
        // pointer addresses the bound VBO.
        unsafe {
            gl.viewport(0, 0, target.width() as i32, target.height() as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.use_program(Some(self.program.raw()));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.vertex_attrib_pointer_f32(
                POSITION_LOCATION,
                3,
                glow::FLOAT,
                false,
                PositionVertex::STRIDE,
                0,
            );
            gl.enable_vertex_attrib_array(POSITION_LOCATION);

            gl.draw_arrays(glow::TRIANGLES, 0, TRIANGLE_VERTICES.len() as i32);
            check_gl(gl, "glDrawArrays", policy);

            gl.disable_vertex_attrib_array(POSITION_LOCATION);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.use_program(None);
        }

        Framebuffer::unbind(gl);
    }

    pub fn destroy(self, gl: &glow::Context) {
        // SAFETY: the buffer belongs to this context and is consumed here.
        unsafe { gl.delete_buffer(self.vbo) };
        self.program.destroy(gl);
    }
}
