use std::fmt;

use glow::HasContext;

/// Programmable pipeline stage of a shader object.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failure to build a shader or program object.
///
/// `log` carries the driver's info log verbatim; it may be empty when the
/// driver reports nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// `glCreateShader` / `glCreateProgram` did not hand out an object.
    Create { object: &'static str, reason: String },
    Compile { stage: ShaderStage, log: String },
    Link { log: String },
}

impl ShaderError {
    /// Driver diagnostic text, if this error carries one.
    pub fn log(&self) -> &str {
        match self {
            Self::Create { reason, .. } => reason,
            Self::Compile { log, .. } | Self::Link { log } => log,
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { object, reason } => write!(f, "failed to create {object}: {reason}"),
            Self::Compile { stage, log } => write!(f, "error compiling {stage} shader: {log}"),
            Self::Link { log } => write!(f, "error linking program: {log}"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// Compiles one shader stage from source.
///
/// On failure the shader object is deleted and the compiler log is returned
/// inside the error (and logged, when non-empty). Nothing is cached: every
/// call compiles `source` again.
pub fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::NativeShader, ShaderError> {
    // SAFETY: shader object calls on the caller's current context; the shader
    // handle never escapes on the error path.
    unsafe {
        let shader = gl
            .create_shader(stage.gl_enum())
            .map_err(|reason| ShaderError::Create { object: "shader", reason })?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if gl.get_shader_compile_status(shader) {
            return Ok(shader);
        }

        let log = gl.get_shader_info_log(shader).trim_end().to_owned();
        if !log.is_empty() {
            log::error!("Error compiling {stage} shader:\n{log}");
        }
        gl.delete_shader(shader);
        Err(ShaderError::Compile { stage, log })
    }
}

/// Attaches both stages to a new program and links it.
///
/// A program that fails to link is deleted before the error is returned.
pub fn link_program(
    gl: &glow::Context,
    vertex: glow::NativeShader,
    fragment: glow::NativeShader,
) -> Result<glow::NativeProgram, ShaderError> {
    // SAFETY: program object calls on the caller's current context.
    unsafe {
        let program = gl
            .create_program()
            .map_err(|reason| ShaderError::Create { object: "program", reason })?;

        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);

        if gl.get_program_link_status(program) {
            return Ok(program);
        }

        let log = gl.get_program_info_log(program).trim_end().to_owned();
        if !log.is_empty() {
            log::error!("Error linking program:\n{log}");
        }
        gl.delete_program(program);
        Err(ShaderError::Link { log })
    }
}

/// A linked vertex + fragment program.
#[derive(Debug)]
pub struct Program {
    raw: glow::NativeProgram,
}

impl Program {
    /// Compiles both stages and links them.
    ///
    /// The intermediate shader objects are flagged for deletion once the
    /// program holds them (or right away on failure).
    pub fn build(gl: &glow::Context, vertex_src: &str, fragment_src: &str) -> Result<Self, ShaderError> {
        let vertex = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
        let fragment = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
            Ok(fragment) => fragment,
            Err(err) => {
                // SAFETY: `vertex` was created above on this context.
                unsafe { gl.delete_shader(vertex) };
                return Err(err);
            }
        };

        let linked = link_program(gl, vertex, fragment);

        // SAFETY: both shaders were created above on this context; deleting
        // an attached shader only flags it.
        unsafe {
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
        }

        linked.map(|raw| Self { raw })
    }

    pub fn raw(&self) -> glow::NativeProgram {
        self.raw
    }

    pub fn attrib_location(&self, gl: &glow::Context, name: &str) -> Option<u32> {
        // SAFETY: query on a linked program owned by this context.
        unsafe { gl.get_attrib_location(self.raw, name) }
    }

    pub fn uniform_location(&self, gl: &glow::Context, name: &str) -> Option<glow::NativeUniformLocation> {
        // SAFETY: query on a linked program owned by this context.
        unsafe { gl.get_uniform_location(self.raw, name) }
    }

    pub fn destroy(self, gl: &glow::Context) {
        // SAFETY: the program belongs to this context and is consumed here.
        unsafe { gl.delete_program(self.raw) };
    }
}
