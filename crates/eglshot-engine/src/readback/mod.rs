//! Framebuffer readback and PNG export.
//!
//! Pixels are read as RGBA / `GL_UNSIGNED_BYTE` into a host buffer whose rows
//! are padded to a 4-byte boundary, then encoded in one shot.

mod encode;
mod pixels;
mod stride;

pub use encode::{encode_png, write_png};
pub use pixels::{PixelBuffer, read_framebuffer, read_framebuffer_into};
pub use stride::{RGBA_CHANNELS, ROW_ALIGNMENT, aligned_stride, pixel_bit_size, pixel_data_size};
