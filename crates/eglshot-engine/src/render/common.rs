//! Vertex layouts and fixed geometry shared by the renderers.

use anyhow::{Result, anyhow};
use bytemuck::{Pod, Zeroable};
use glow::HasContext;

// ── flat triangle ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3], // clip space
}

impl PositionVertex {
    pub(super) const STRIDE: i32 = std::mem::size_of::<PositionVertex>() as i32;
}

pub const TRIANGLE_VERTICES: [PositionVertex; 3] = [
    PositionVertex { position: [0.0, 0.5, 0.0] },
    PositionVertex { position: [-0.5, -0.5, 0.0] },
    PositionVertex { position: [0.5, -0.5, 0.0] },
];

// ── textured quad ─────────────────────────────────────────────────────────

/// Interleaved position + texture coordinate (5 floats).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl TexturedVertex {
    pub(super) const STRIDE: i32 = std::mem::size_of::<TexturedVertex>() as i32;
    pub(super) const TEX_COORD_OFFSET: i32 = std::mem::size_of::<[f32; 3]>() as i32;
}

pub const QUAD_VERTICES: [TexturedVertex; 4] = [
    TexturedVertex { position: [-0.5, 0.5, 0.0], tex_coord: [0.0, 0.0] },
    TexturedVertex { position: [-0.5, -0.5, 0.0], tex_coord: [0.0, 1.0] },
    TexturedVertex { position: [0.5, -0.5, 0.0], tex_coord: [1.0, 1.0] },
    TexturedVertex { position: [0.5, 0.5, 0.0], tex_coord: [1.0, 0.0] },
];

/// Two triangles covering the quad.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── buffers ───────────────────────────────────────────────────────────────

/// Creates a buffer object, fills it with `data` and unbinds `target` again.
pub(super) fn upload_static_buffer(
    gl: &glow::Context,
    target: u32,
    data: &[u8],
) -> Result<glow::NativeBuffer> {
    // SAFETY: buffer creation/upload on the caller's current context.
    unsafe {
        let buffer = gl
            .create_buffer()
            .map_err(|reason| anyhow!("glGenBuffers failed: {reason}"))?;
        gl.bind_buffer(target, Some(buffer));
        gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
        gl.bind_buffer(target, None);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textured_vertex_is_five_tightly_packed_floats() {
        assert_eq!(TexturedVertex::STRIDE, 5 * 4);
        assert_eq!(TexturedVertex::TEX_COORD_OFFSET, 3 * 4);
        assert_eq!(bytemuck::cast_slice::<_, f32>(&QUAD_VERTICES).len(), 20);
    }

    #[test]
    fn quad_indices_stay_in_range() {
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
        assert_eq!(QUAD_INDICES.len(), 6);
    }

    #[test]
    fn triangle_straddles_canvas_center() {
        let xs: Vec<f32> = TRIANGLE_VERTICES.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = TRIANGLE_VERTICES.iter().map(|v| v.position[1]).collect();
        assert!(xs.iter().any(|&x| x < 0.0) && xs.iter().any(|&x| x > 0.0));
        assert!(ys.iter().any(|&y| y < 0.0) && ys.iter().any(|&y| y > 0.0));
        assert_eq!(PositionVertex::STRIDE, 12);
    }
}
