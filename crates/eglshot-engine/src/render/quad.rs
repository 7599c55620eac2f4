use anyhow::{Context, Result};
use glow::HasContext;

use crate::device::{GlErrorPolicy, check_gl};

use super::common::{QUAD_INDICES, QUAD_VERTICES, TexturedVertex, upload_static_buffer};
use super::shader::Program;
use super::target::Framebuffer;
use super::texture::create_checker_texture;

const VERTEX_SRC: &str = include_str!("shaders/textured_quad.vert");
const FRAGMENT_SRC: &str = include_str!("shaders/textured_quad.frag");

/// Quad sampling the 2×2 checker texture.
///
/// Built once per context and redrawn as often as needed; attribute and
/// sampler locations are looked up by name at construction.
#[derive(Debug)]
pub struct TexturedQuadRenderer {
    program: Program,
    position_loc: u32,
    tex_coord_loc: u32,
    sampler_loc: Option<glow::NativeUniformLocation>,
    texture: glow::NativeTexture,
    vbo: glow::NativeBuffer,
    ibo: glow::NativeBuffer,
}

impl TexturedQuadRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let program = Program::build(gl, VERTEX_SRC, FRAGMENT_SRC).context("textured quad program")?;

        let locations = program
            .attrib_location(gl, "a_position")
            .zip(program.attrib_location(gl, "a_texCoord"));
        let Some((position_loc, tex_coord_loc)) = locations else {
            program.destroy(gl);
            anyhow::bail!("textured quad program lacks a_position/a_texCoord");
        };
        let sampler_loc = program.uniform_location(gl, "s_texture");
        if sampler_loc.is_none() {
            log::warn!("s_texture uniform not found; sampling unit 0 by default");
        }

        let texture = match create_checker_texture(gl) {
            Ok(texture) => texture,
            Err(err) => {
                program.destroy(gl);
                return Err(err);
            }
        };

        let buffers = upload_static_buffer(
            gl,
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&QUAD_VERTICES),
        )
        .and_then(|vbo| {
            upload_static_buffer(gl, glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(&QUAD_INDICES))
                .map(|ibo| (vbo, ibo))
                .inspect_err(|_| {
                    // SAFETY: `vbo` was created just above on this context.
                    unsafe { gl.delete_buffer(vbo) };
                })
        });
        let (vbo, ibo) = match buffers {
            Ok(buffers) => buffers,
            Err(err) => {
                // SAFETY: the texture was created above on this context.
                unsafe { gl.delete_texture(texture) };
                program.destroy(gl);
                return Err(err);
            }
        };

        Ok(Self {
            program,
            position_loc,
            tex_coord_loc,
            sampler_loc,
            texture,
            vbo,
            ibo,
        })
    }

    /// Clears `target` to transparent black and draws the textured quad.
    pub fn draw(&self, gl: &glow::Context, target: &Framebuffer, policy: GlErrorPolicy) {
        target.bind(gl, policy);

        // SAFETY: all objects belong to the current context; attribute
        // pointers and the index offset address the bound buffers.
        unsafe {
            gl.viewport(0, 0, target.width() as i32, target.height() as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.use_program(Some(self.program.raw()));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.vertex_attrib_pointer_f32(
                self.position_loc,
                3,
                glow::FLOAT,
                false,
                TexturedVertex::STRIDE,
                0,
            );
            gl.vertex_attrib_pointer_f32(
                self.tex_coord_loc,
                2,
                glow::FLOAT,
                false,
                TexturedVertex::STRIDE,
                TexturedVertex::TEX_COORD_OFFSET,
            );
            gl.enable_vertex_attrib_array(self.position_loc);
            gl.enable_vertex_attrib_array(self.tex_coord_loc);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.uniform_1_i32(self.sampler_loc.as_ref(), 0);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ibo));
            gl.draw_elements(glow::TRIANGLES, QUAD_INDICES.len() as i32, glow::UNSIGNED_SHORT, 0);
            check_gl(gl, "glDrawElements", policy);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.disable_vertex_attrib_array(self.position_loc);
            gl.disable_vertex_attrib_array(self.tex_coord_loc);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.use_program(None);
        }

        Framebuffer::unbind(gl);
    }

    pub fn destroy(self, gl: &glow::Context) {
        // SAFETY: every object belongs to this context and is consumed here.
        unsafe {
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ibo);
            gl.delete_texture(self.texture);
        }
        self.program.destroy(gl);
    }
}
