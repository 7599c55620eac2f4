//! GPU-backed tests. Each one returns early when no EGL display with an
//! ES3 pbuffer config is available on the machine running the suite.

use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use eglshot_engine::config::CanvasConfig;
use eglshot_engine::device::{ConfigRequirements, Display, GlErrorPolicy, GpuContext, PixelConfig};
use eglshot_engine::logging::{LoggingConfig, init_logging};
use eglshot_engine::readback::read_framebuffer;
use eglshot_engine::render::{
    Framebuffer, Program, ShaderError, ShaderStage, TexturedQuadRenderer, compile_shader,
    link_program, render_triangle_to_file,
};

// eglTerminate is not reference counted; one display user at a time.
static GPU: Mutex<()> = Mutex::new(());

struct Gpu {
    display: Display,
    config: PixelConfig,
    _lock: MutexGuard<'static, ()>,
}

fn gpu() -> Option<Gpu> {
    init_logging(LoggingConfig::default());
    let lock = GPU.lock().unwrap_or_else(PoisonError::into_inner);

    let display = match Display::open() {
        Ok(display) => display,
        Err(err) => {
            log::warn!("skipping: {err:#}");
            return None;
        }
    };
    let config = match display.select_config(&ConfigRequirements::default()) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("skipping: {err:#}");
            return None;
        }
    };
    display.bind_gles_api().ok()?;

    Some(Gpu { display, config, _lock: lock })
}

fn small_canvas(size: u32) -> CanvasConfig {
    CanvasConfig {
        width: size,
        height: size,
        ..CanvasConfig::default()
    }
}

#[test]
fn invalid_shader_returns_compile_error_with_log() {
    let Some(gpu) = gpu() else { return };
    let canvas = small_canvas(16);
    let ctx = GpuContext::new(&gpu.display, &gpu.config, &canvas).unwrap();

    let err = compile_shader(ctx.gl(), ShaderStage::Fragment, "this is not glsl").unwrap_err();
    match &err {
        ShaderError::Compile { stage, log } => {
            assert_eq!(*stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }

    let built = Program::build(ctx.gl(), "void main() { gl_Position = vec4(0.0); }", "nope");
    assert!(matches!(built, Err(ShaderError::Compile { stage: ShaderStage::Fragment, .. })));
}

const UNLINKABLE_VERTEX: &str = "attribute vec4 a_position;
void main() { gl_Position = a_position; }";

// Reads a varying the vertex stage never declares.
const UNLINKABLE_FRAGMENT: &str = "precision mediump float;
varying vec4 v_color;
void main() { gl_FragColor = v_color; }";

#[test]
fn mismatched_varyings_fail_to_link_without_leaking_a_program() {
    use glow::HasContext;

    let Some(gpu) = gpu() else { return };
    let canvas = small_canvas(16);
    let ctx = GpuContext::new(&gpu.display, &gpu.config, &canvas).unwrap();
    let gl = ctx.gl();

    let vertex = compile_shader(gl, ShaderStage::Vertex, UNLINKABLE_VERTEX).unwrap();
    let fragment = compile_shader(gl, ShaderStage::Fragment, UNLINKABLE_FRAGMENT).unwrap();
    let linked = link_program(gl, vertex, fragment);
    assert!(matches!(linked, Err(ShaderError::Link { .. })));

    // SAFETY: both shaders were created above on the current context.
    unsafe {
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
    }

    let built = Program::build(gl, UNLINKABLE_VERTEX, UNLINKABLE_FRAGMENT);
    assert!(matches!(built, Err(ShaderError::Link { .. })));

    // The context is fresh, so any live program name would come from the
    // failed links above.
    let leaked = (1..=64)
        .filter_map(NonZeroU32::new)
        .map(glow::NativeProgram)
        // SAFETY: glIsProgram accepts any name.
        .filter(|&program| unsafe { gl.is_program(program) })
        .count();
    assert_eq!(leaked, 0);
    assert!(eglshot_engine::device::check_gl(gl, "link failure cleanup", GlErrorPolicy::Log));
}

#[test]
fn triangle_demo_writes_512_png_with_red_center() {
    let Some(gpu) = gpu() else { return };
    let dir = tempfile::tempdir().unwrap();
    let canvas = CanvasConfig::default().with_output_dir(dir.path());

    let ctx = GpuContext::new(&gpu.display, &gpu.config, &canvas).unwrap();
    let pixels = render_triangle_to_file(&ctx, &canvas.primary_output, GlErrorPolicy::Log).unwrap();
    drop(ctx);

    assert_eq!(pixels.data().len(), 1_048_576);

    let image = image::open(&canvas.primary_output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (512, 512));

    let center = image.get_pixel(256, 256).0;
    assert_eq!(&center[..3], &[255, 0, 0]);
    let corner = image.get_pixel(2, 2).0;
    assert_eq!(&corner[..3], &[0, 0, 0]);
}

#[test]
fn textured_quad_samples_all_four_quadrants() {
    let Some(gpu) = gpu() else { return };
    let canvas = small_canvas(64);
    let ctx = GpuContext::new(&gpu.display, &gpu.config, &canvas).unwrap();
    let gl = ctx.gl();

    let target = Framebuffer::new(gl, 64, 64, GlErrorPolicy::Log).unwrap();
    let renderer = TexturedQuadRenderer::new(gl).unwrap();
    renderer.draw(gl, &target, GlErrorPolicy::Log);
    let pixels = read_framebuffer(gl, &target, GlErrorPolicy::Log);
    renderer.destroy(gl);
    target.destroy(gl);

    // Buffer rows start at the bottom; the quad covers [16, 48) both ways.
    let rgb = |x, y| pixels.pixel(x, y).map(|p| [p[0], p[1], p[2]]);
    assert_eq!(rgb(24, 40), Some([255, 0, 0]));
    assert_eq!(rgb(40, 40), Some([0, 255, 0]));
    assert_eq!(rgb(24, 24), Some([0, 0, 255]));
    assert_eq!(rgb(40, 24), Some([255, 255, 0]));
    assert_eq!(rgb(4, 4), Some([0, 0, 0]));
}

#[test]
fn framebuffer_setup_restores_default_binding() {
    let Some(gpu) = gpu() else { return };
    let canvas = small_canvas(8);
    let ctx = GpuContext::new(&gpu.display, &gpu.config, &canvas).unwrap();
    let gl = ctx.gl();

    let target = Framebuffer::new(gl, 8, 8, GlErrorPolicy::Log).unwrap();
    assert!(eglshot_engine::device::check_gl(gl, "framebuffer setup", GlErrorPolicy::Log));

    use glow::HasContext;
    // SAFETY: state query on the current context.
    let bound = unsafe { gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING) };
    assert_eq!(bound, 0);
    target.destroy(gl);
}
