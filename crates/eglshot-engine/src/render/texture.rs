use anyhow::{Result, anyhow};
use glow::HasContext;

/// Edge length of the procedural sample texture.
pub const CHECKER_SIZE: usize = 2;

/// Row-major RGB texels: red, green / blue, yellow.
pub const CHECKER_PIXELS: [[u8; 3]; CHECKER_SIZE * CHECKER_SIZE] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
];

/// Tightly packed bytes of [`CHECKER_PIXELS`], ready for `glTexImage2D`.
pub fn checker_texture_pixels() -> [u8; CHECKER_SIZE * CHECKER_SIZE * 3] {
    let mut bytes = [0; CHECKER_SIZE * CHECKER_SIZE * 3];
    for (dst, texel) in bytes.chunks_exact_mut(3).zip(CHECKER_PIXELS) {
        dst.copy_from_slice(&texel);
    }
    bytes
}

/// Uploads the 2×2 checker as an RGB texture with nearest filtering.
///
/// Sets `GL_UNPACK_ALIGNMENT` to 1 (rows are 6 bytes) and leaves texture unit
/// 0's binding at 0.
pub fn create_checker_texture(gl: &glow::Context) -> Result<glow::NativeTexture> {
    let pixels = checker_texture_pixels();

    // SAFETY: texture upload on the caller's current context; `pixels` holds
    // exactly width * height * 3 bytes at unpack alignment 1.
    unsafe {
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

        let texture = gl
            .create_texture()
            .map_err(|reason| anyhow!("glGenTextures failed: {reason}"))?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGB as i32,
            CHECKER_SIZE as i32,
            CHECKER_SIZE as i32,
            0,
            glow::RGB,
            glow::UNSIGNED_BYTE,
            Some(&pixels),
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);

        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_quadrants_in_row_major_order() {
        let bytes = checker_texture_pixels();
        let texels: Vec<&[u8]> = bytes.chunks_exact(3).collect();
        assert_eq!(texels, vec![
            &[255, 0, 0][..],
            &[0, 255, 0][..],
            &[0, 0, 255][..],
            &[255, 255, 0][..],
        ]);
    }

    #[test]
    fn checker_texels_are_distinct() {
        for (i, a) in CHECKER_PIXELS.iter().enumerate() {
            for b in &CHECKER_PIXELS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn checker_is_tightly_packed() {
        assert_eq!(checker_texture_pixels().len(), CHECKER_SIZE * CHECKER_SIZE * 3);
    }
}
