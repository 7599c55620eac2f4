//! Single-context offscreen demo.
//!
//! Opens the default EGL display, renders a red triangle into a 512×512
//! framebuffer on the main thread and saves it as `img.png`.

use anyhow::Result;

use eglshot_engine::config::CanvasConfig;
use eglshot_engine::device::{ConfigRequirements, Display, GlErrorPolicy, GpuContext};
use eglshot_engine::logging::{LoggingConfig, init_logging};
use eglshot_engine::render::render_triangle_to_file;

fn main() {
    init_logging(LoggingConfig::default());

    // Bootstrap failures are reported but, like a clean run, exit with 0.
    if let Err(err) = run(&CanvasConfig::default()) {
        log::error!("{err:#}");
    }
}

fn run(canvas: &CanvasConfig) -> Result<()> {
    let display = Display::open()?;
    let config = display.select_config(&ConfigRequirements::default())?;
    display.bind_gles_api()?;

    {
        let ctx = GpuContext::new(&display, &config, canvas)?;
        ctx.read_format();
        render_triangle_to_file(&ctx, &canvas.primary_output, GlErrorPolicy::Log)?;
    }

    display.terminate()
}
