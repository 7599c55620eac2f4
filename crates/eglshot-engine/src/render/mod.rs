//! GLES rendering helpers.
//!
//! Every helper takes the `glow::Context` (and the objects it operates on)
//! explicitly and leaves the default framebuffer/texture/buffer bindings in
//! place when it returns, so callers never depend on ambient binding state.
//!
//! Renderers own their GL objects and must be torn down with `destroy` on the
//! thread whose context created them.

mod common;
mod pass;
mod quad;
mod shader;
mod target;
mod texture;
mod triangle;

pub use common::{PositionVertex, QUAD_INDICES, QUAD_VERTICES, TRIANGLE_VERTICES, TexturedVertex};
pub use pass::render_triangle_to_file;
pub use quad::TexturedQuadRenderer;
pub use shader::{Program, ShaderError, ShaderStage, compile_shader, link_program};
pub use target::Framebuffer;
pub use texture::{CHECKER_PIXELS, CHECKER_SIZE, checker_texture_pixels, create_checker_texture};
pub use triangle::TriangleRenderer;
