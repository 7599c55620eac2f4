/// Channels per pixel of every readback (RGBA).
pub const RGBA_CHANNELS: usize = 4;

/// Row alignment of readback buffers; matches the default `GL_PACK_ALIGNMENT`.
pub const ROW_ALIGNMENT: usize = 4;

// GLES 1/2 enums glow does not carry.
const GL_ALPHA: u32 = 0x1906;
const GL_LUMINANCE: u32 = 0x1909;
const GL_LUMINANCE_ALPHA: u32 = 0x190A;
const GL_FIXED: u32 = 0x140C;
const GL_RGB565_OES: u32 = 0x8D62;
const GL_RGB5_A1_OES: u32 = 0x8057;
const GL_RGBA4_OES: u32 = 0x8056;

/// Bytes in one row of `width` pixels with `channels` bytes each, rounded up
/// to the next multiple of [`ROW_ALIGNMENT`].
pub fn aligned_stride(width: usize, channels: usize) -> usize {
    (width * channels).div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

/// Size in bits of one pixel of `format` / `ty`.
///
/// Packed and 16/32-bit types are sized by type alone; byte types multiply by
/// the channel count of `format`. Unknown combinations log and yield 0.
pub fn pixel_bit_size(format: u32, ty: u32) -> usize {
    let component_bits = match ty {
        glow::BYTE | glow::UNSIGNED_BYTE => 8,
        glow::SHORT
        | glow::UNSIGNED_SHORT
        | glow::UNSIGNED_SHORT_5_6_5
        | glow::UNSIGNED_SHORT_4_4_4_4
        | glow::UNSIGNED_SHORT_5_5_5_1
        | GL_RGB565_OES
        | GL_RGB5_A1_OES
        | GL_RGBA4_OES => return 16,
        glow::INT
        | glow::UNSIGNED_INT
        | glow::FLOAT
        | GL_FIXED
        | glow::UNSIGNED_INT_24_8 => return 32,
        _ => {
            log::warn!("unknown pixel type {ty:#06x}; assuming 0-bit pixels");
            0
        }
    };

    let components = match format {
        GL_ALPHA | GL_LUMINANCE | glow::DEPTH_COMPONENT | glow::DEPTH_STENCIL => 1,
        GL_LUMINANCE_ALPHA => 2,
        glow::RGB => 3,
        glow::RGBA | glow::BGRA => 4,
        _ => {
            log::warn!("unknown pixel format {format:#06x}");
            0
        }
    };

    components * component_bits
}

/// Bytes needed to read back a `width` × `height` rectangle of
/// `format` / `ty` with 4-byte row alignment. Zero for empty rectangles.
pub fn pixel_data_size(width: i32, height: i32, format: u32, ty: u32) -> usize {
    if width <= 0 || height <= 0 {
        return 0;
    }
    let pixel_bytes = pixel_bit_size(format, ty) >> 3;
    if pixel_bytes == 0 {
        log::warn!(
            "unknown pixel size: width {width} height {height} format {format:#06x} type {ty:#06x}"
        );
    }
    aligned_stride(width as usize, pixel_bytes) * height as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_stride_is_always_aligned() {
        for width in 1..=1024 {
            let stride = aligned_stride(width, RGBA_CHANNELS);
            assert_eq!(stride % ROW_ALIGNMENT, 0);
            assert_eq!(stride, width * 4);
        }
    }

    #[test]
    fn rgb_stride_rounds_up() {
        assert_eq!(aligned_stride(1, 3), 4);
        assert_eq!(aligned_stride(2, 3), 8);
        assert_eq!(aligned_stride(3, 3), 12);
        assert_eq!(aligned_stride(5, 3), 16);
    }

    #[test]
    fn canvas_buffer_size() {
        assert_eq!(aligned_stride(512, RGBA_CHANNELS) * 512, 1_048_576);
        assert_eq!(pixel_data_size(512, 512, glow::RGBA, glow::UNSIGNED_BYTE), 1_048_576);
    }

    #[test]
    fn pixel_sizes_by_format_and_type() {
        assert_eq!(pixel_bit_size(glow::RGBA, glow::UNSIGNED_BYTE), 32);
        assert_eq!(pixel_bit_size(glow::RGB, glow::UNSIGNED_BYTE), 24);
        assert_eq!(pixel_bit_size(GL_LUMINANCE_ALPHA, glow::UNSIGNED_BYTE), 16);
        assert_eq!(pixel_bit_size(GL_ALPHA, glow::UNSIGNED_BYTE), 8);
        assert_eq!(pixel_bit_size(glow::RGB, glow::UNSIGNED_SHORT_5_6_5), 16);
        assert_eq!(pixel_bit_size(glow::RGBA, glow::FLOAT), 32);
    }

    #[test]
    fn unknown_type_is_zero_sized() {
        assert_eq!(pixel_bit_size(glow::RGBA, 0xffff), 0);
        assert_eq!(pixel_bit_size(0xffff, glow::UNSIGNED_BYTE), 0);
    }

    #[test]
    fn empty_rectangles_need_no_bytes() {
        assert_eq!(pixel_data_size(0, 512, glow::RGBA, glow::UNSIGNED_BYTE), 0);
        assert_eq!(pixel_data_size(512, -1, glow::RGBA, glow::UNSIGNED_BYTE), 0);
    }

    #[test]
    fn rgb_rows_are_padded() {
        // 3 px * 3 bytes = 9 -> 12 per row.
        assert_eq!(pixel_data_size(3, 2, glow::RGB, glow::UNSIGNED_BYTE), 24);
    }
}
