use std::borrow::Cow;

use glow::HasContext;

use crate::device::{GlErrorPolicy, check_gl};
use crate::render::Framebuffer;

use super::stride::{RGBA_CHANNELS, ROW_ALIGNMENT, aligned_stride};

/// Host copy of an RGBA8 framebuffer.
///
/// Rows are `stride` bytes apart (row width rounded up to 4 bytes) and come
/// in GL order: the first row is the bottom of the framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl PixelBuffer {
    /// Zero-filled buffer of `aligned_stride(width) * height` bytes.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = aligned_stride(width as usize, RGBA_CHANNELS);
        Self {
            data: vec![0; stride * height as usize],
            width,
            height,
            stride,
        }
    }

    /// Wraps existing bytes; `None` if `data` is too short for the layout.
    pub fn from_raw(width: u32, height: u32, stride: usize, data: Vec<u8>) -> Option<Self> {
        let row_bytes = width as usize * RGBA_CHANNELS;
        let fits = stride >= row_bytes && data.len() >= stride * height as usize;
        fits.then_some(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of the pixel at `(x, y)` in buffer row order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.stride + x as usize * RGBA_CHANNELS;
        let bytes = self.data.get(start..start + RGBA_CHANNELS)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Pixel rows without stride padding.
    ///
    /// Borrows when rows are already tightly packed.
    pub fn packed_rows(&self) -> Cow<'_, [u8]> {
        let row_bytes = self.width as usize * RGBA_CHANNELS;
        let packed_len = row_bytes * self.height as usize;
        if self.stride == row_bytes {
            return Cow::Borrowed(&self.data[..packed_len]);
        }

        let mut packed = Vec::with_capacity(packed_len);
        for row in self.data.chunks(self.stride).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Cow::Owned(packed)
    }
}

/// Reads `source`'s color attachment into a fresh buffer.
pub fn read_framebuffer(gl: &glow::Context, source: &Framebuffer, policy: GlErrorPolicy) -> PixelBuffer {
    let mut pixels = PixelBuffer::new(source.width(), source.height());
    read_framebuffer_into(gl, source, &mut pixels, policy);
    pixels
}

/// Reads `source`'s color attachment into `pixels`, reusing its storage.
///
/// A failed read is reported through `policy`; the buffer then keeps whatever
/// it held before.
pub fn read_framebuffer_into(
    gl: &glow::Context,
    source: &Framebuffer,
    pixels: &mut PixelBuffer,
    policy: GlErrorPolicy,
) {
    if pixels.width != source.width() || pixels.height != source.height() {
        *pixels = PixelBuffer::new(source.width(), source.height());
    }

    source.bind(gl, policy);

    // SAFETY: `pixels` holds `stride * height` bytes and the pack alignment
    // matches `stride`, so the read stays in bounds.
    unsafe {
        gl.pixel_store_i32(glow::PACK_ALIGNMENT, ROW_ALIGNMENT as i32);
        check_gl(gl, "glPixelStorei", policy);
        gl.read_pixels(
            0,
            0,
            source.width() as i32,
            source.height() as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelPackData::Slice(&mut pixels.data),
        );
    }
    check_gl(gl, "glReadPixels", policy);

    Framebuffer::unbind(gl);
}
