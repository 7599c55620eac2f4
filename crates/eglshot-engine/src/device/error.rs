use glow::HasContext;
use khronos_egl as egl;

/// Process exit code used when a GL error aborts the run.
///
/// Matches what `exit(-1)` reports on POSIX systems.
pub const GL_ERROR_EXIT_CODE: i32 = 255;

/// What to do after a GL call reported an error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GlErrorPolicy {
    /// Log and keep going; the output image may be garbage.
    Log,
    /// Log and terminate the whole process with [`GL_ERROR_EXIT_CODE`].
    Abort,
}

/// Drains one error from the GL error queue and applies `policy` to it.
///
/// Returns `true` when no error was pending. `label` names the GL call being
/// checked and only appears in the log record.
pub fn check_gl(gl: &glow::Context, label: &str, policy: GlErrorPolicy) -> bool {
    // SAFETY: glGetError has no preconditions beyond a current context, which
    // every caller owns.
    let error = unsafe { gl.get_error() };
    if error == glow::NO_ERROR {
        return true;
    }

    log::error!(
        "OpenGL error {error:#06x} ({}) at {label}",
        describe_gl_error(error)
    );

    if policy == GlErrorPolicy::Abort {
        log::logger().flush();
        std::process::exit(GL_ERROR_EXIT_CODE);
    }
    false
}

/// Human-readable name of a `glGetError` code.
pub fn describe_gl_error(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

/// Adapter for `map_err` on khronos-egl results: logs the EGL error code with
/// the failing call and converts it into an `anyhow::Error`.
pub fn egl_failure(call: &'static str) -> impl FnOnce(egl::Error) -> anyhow::Error {
    move |err| {
        let code = egl::Int::from(err);
        log::error!("EGL error {code:#06x} at {call}");
        anyhow::anyhow!("{call} failed: {err}")
    }
}
