//! EGL display + per-thread GLES context management.
//!
//! This module is responsible for:
//! - loading libEGL and opening/initializing the default display
//! - selecting the single pixel-format config shared by every context
//! - creating pbuffer surface + context pairs and making them current
//! - turning GL/EGL error codes into log records (and, if asked, an exit)

mod context;
mod display;
mod error;
mod pixel_format;

pub use context::{GpuContext, ReadFormat};
pub use display::{Display, Egl};
pub use error::{GL_ERROR_EXIT_CODE, GlErrorPolicy, check_gl, describe_gl_error, egl_failure};
pub use pixel_format::{ConfigRequirements, ConfigSource, PixelConfig, select_config, validate_match_count};
