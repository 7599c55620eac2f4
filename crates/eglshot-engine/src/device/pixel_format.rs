use anyhow::Result;
use khronos_egl as egl;

/// `EGL_OPENGL_ES3_BIT` (EGL 1.5, `EGL_KHR_create_context`).
pub const OPENGL_ES3_BIT: egl::Int = 0x0040;

/// Attributes a config must satisfy to back the offscreen canvas.
///
/// The defaults describe the only config the demos ever ask for: a
/// pbuffer-capable RGB888 format renderable by OpenGL ES 3.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConfigRequirements {
    pub surface_type: egl::Int,
    pub red_size: egl::Int,
    pub green_size: egl::Int,
    pub blue_size: egl::Int,
    pub renderable_type: egl::Int,
}

impl Default for ConfigRequirements {
    fn default() -> Self {
        Self {
            surface_type: egl::PBUFFER_BIT,
            red_size: 8,
            green_size: 8,
            blue_size: 8,
            renderable_type: OPENGL_ES3_BIT,
        }
    }
}

impl ConfigRequirements {
    /// `EGL_NONE`-terminated attribute list for `eglChooseConfig`.
    pub fn attrib_list(&self) -> [egl::Int; 11] {
        [
            egl::SURFACE_TYPE,
            self.surface_type,
            egl::RED_SIZE,
            self.red_size,
            egl::GREEN_SIZE,
            self.green_size,
            egl::BLUE_SIZE,
            self.blue_size,
            egl::RENDERABLE_TYPE,
            self.renderable_type,
            egl::NONE,
        ]
    }
}

/// Anything that can enumerate and filter pixel-format configs.
///
/// `Display` is the real implementation; the seam exists so selection can be
/// exercised without a GPU.
pub trait ConfigSource {
    type Config: Copy;

    /// Total number of configs the display exposes.
    fn config_count(&self) -> Result<usize>;

    /// Configs matching `attribs`, at most `capacity` of them.
    fn choose_configs(&self, attribs: &[egl::Int], capacity: usize) -> Result<Vec<Self::Config>>;
}

/// Rejects an empty display, an empty match set, and a driver reporting more
/// matches than configs it has.
pub fn validate_match_count(matched: usize, available: usize) -> Result<()> {
    anyhow::ensure!(available > 0, "display exposes no configs");
    anyhow::ensure!(matched > 0, "no config matches the requested attributes");
    anyhow::ensure!(
        matched <= available,
        "driver reported {matched} matching configs out of {available}"
    );
    Ok(())
}

/// Selects the config every render context will be created from.
///
/// First sizes a query to the display's full config list and validates the
/// match count, then asks for the single best match. Returns early, before
/// any filtering, when the display has no configs at all.
pub fn select_config<S: ConfigSource>(
    source: &S,
    requirements: &ConfigRequirements,
) -> Result<S::Config> {
    let available = source.config_count()?;
    if available == 0 {
        validate_match_count(0, available)?;
    }

    let attribs = requirements.attrib_list();
    let matching = source.choose_configs(&attribs, available)?;
    validate_match_count(matching.len(), available)?;
    log::debug!("{} of {available} configs match {requirements:?}", matching.len());

    let best = source.choose_configs(&attribs, 1)?;
    best.first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("eglChooseConfig returned no config on the second pass"))
}

/// The selected pixel-format config.
///
/// Immutable after selection and shared read-only with every render thread.
#[derive(Debug, Copy, Clone)]
pub struct PixelConfig {
    raw: egl::Config,
}

// SAFETY: an EGLConfig is an immutable handle owned by its display; EGL allows
// it to be used from any thread.
unsafe impl Send for PixelConfig {}
// SAFETY: see above.
unsafe impl Sync for PixelConfig {}

impl PixelConfig {
    pub(crate) fn new(raw: egl::Config) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> egl::Config {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct FakeSource {
        configs: Vec<u32>,
        matching: Vec<u32>,
        choose_calls: Cell<usize>,
    }

    impl FakeSource {
        fn new(configs: Vec<u32>, matching: Vec<u32>) -> Self {
            Self { configs, matching, choose_calls: Cell::new(0) }
        }
    }

    impl ConfigSource for FakeSource {
        type Config = u32;

        fn config_count(&self) -> Result<usize> {
            Ok(self.configs.len())
        }

        fn choose_configs(&self, attribs: &[egl::Int], capacity: usize) -> Result<Vec<u32>> {
            assert_eq!(attribs.last(), Some(&egl::NONE));
            self.choose_calls.set(self.choose_calls.get() + 1);
            Ok(self.matching.iter().copied().take(capacity).collect())
        }
    }

    #[test]
    fn default_requirements_attrib_list() {
        let attribs = ConfigRequirements::default().attrib_list();
        assert_eq!(attribs[0], egl::SURFACE_TYPE);
        assert_eq!(attribs[1], egl::PBUFFER_BIT);
        assert_eq!(&attribs[2..8], &[egl::RED_SIZE, 8, egl::GREEN_SIZE, 8, egl::BLUE_SIZE, 8]);
        assert_eq!(attribs[8], egl::RENDERABLE_TYPE);
        assert_eq!(attribs[9], OPENGL_ES3_BIT);
        assert_eq!(attribs[10], egl::NONE);
    }

    #[test]
    fn match_count_bounds() {
        assert!(validate_match_count(1, 4).is_ok());
        assert!(validate_match_count(4, 4).is_ok());
        assert!(validate_match_count(0, 4).is_err());
        assert!(validate_match_count(5, 4).is_err());
        assert!(validate_match_count(0, 0).is_err());
    }

    #[test]
    fn empty_display_returns_before_choosing() {
        let source = FakeSource::new(vec![], vec![]);
        let err = select_config(&source, &ConfigRequirements::default()).unwrap_err();
        assert!(err.to_string().contains("no configs"));
        assert_eq!(source.choose_calls.get(), 0);
    }

    #[test]
    fn no_match_is_an_error() {
        let source = FakeSource::new(vec![1, 2, 3], vec![]);
        assert!(select_config(&source, &ConfigRequirements::default()).is_err());
        assert_eq!(source.choose_calls.get(), 1);
    }

    #[test]
    fn picks_first_match() {
        let source = FakeSource::new(vec![1, 2, 3, 4], vec![3, 1]);
        let picked = select_config(&source, &ConfigRequirements::default()).unwrap();
        assert_eq!(picked, 3);
        assert_eq!(source.choose_calls.get(), 2);
    }
}
