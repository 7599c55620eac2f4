use std::path::PathBuf;

/// Fixed canvas + output parameters shared by both demos.
///
/// Nothing here is read from the environment or the command line; the demos
/// always run with `CanvasConfig::default()`. Tests build smaller canvases and
/// point the outputs at scratch directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Canvas width in pixels (pbuffer surface and color attachment).
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// `EGL_CONTEXT_CLIENT_VERSION` requested for every render context.
    pub client_version: i32,

    /// Output of the single-context demo and of the looping worker.
    pub primary_output: PathBuf,

    /// Output of the one-shot worker.
    pub secondary_output: PathBuf,
}

impl CanvasConfig {
    pub const DEFAULT_WIDTH: u32 = 512;
    pub const DEFAULT_HEIGHT: u32 = 512;

    /// Same canvas, outputs redirected into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.primary_output = dir.join("img.png");
        self.secondary_output = dir.join("img2.png");
        self
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            client_version: 3,
            primary_output: PathBuf::from("img.png"),
            secondary_output: PathBuf::from("img2.png"),
        }
    }
}
