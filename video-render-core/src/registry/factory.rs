use std::fmt;
use std::sync::Arc;

use crate::models::error::RenderError;
use crate::models::render_mode::RenderMode;
use crate::traits::renderer::Renderer;

/// Builds a fresh, unbound renderer.
pub type RendererConstructor = Arc<dyn Fn() -> Box<dyn Renderer> + Send + Sync + 'static>;

/// Render-mode keyed renderer factory.
///
/// A GPU request falls back to the software renderer when no GPU
/// constructor is installed (e.g. no GPU context on this host).
#[derive(Clone, Default)]
pub struct RendererFactory {
    gpu: Option<RendererConstructor>,
    software: Option<RendererConstructor>,
    custom: Option<RendererConstructor>,
}

impl RendererFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gpu(mut self, constructor: RendererConstructor) -> Self {
        self.gpu = Some(constructor);
        self
    }

    pub fn with_software(mut self, constructor: RendererConstructor) -> Self {
        self.software = Some(constructor);
        self
    }

    pub fn with_custom(mut self, constructor: RendererConstructor) -> Self {
        self.custom = Some(constructor);
        self
    }

    pub fn supports(&self, mode: RenderMode) -> bool {
        self.constructor(mode).is_some()
    }

    /// Builds a renderer for `mode`, returning it with the mode actually used.
    pub fn create(&self, mode: RenderMode) -> Result<(RenderMode, Box<dyn Renderer>), RenderError> {
        if let Some(constructor) = self.constructor(mode) {
            return Ok((mode, constructor()));
        }

        match (mode, &self.software) {
            (RenderMode::Gpu, Some(software)) => {
                log::warn!("GPU renderer unavailable, falling back to software rendering");
                Ok((RenderMode::Software, software()))
            }
            _ => Err(RenderError::RendererUnavailable(mode)),
        }
    }

    fn constructor(&self, mode: RenderMode) -> Option<&RendererConstructor> {
        match mode {
            RenderMode::Gpu => self.gpu.as_ref(),
            RenderMode::Software => self.software.as_ref(),
            RenderMode::Custom => self.custom.as_ref(),
        }
    }
}

impl fmt::Debug for RendererFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererFactory")
            .field("gpu", &self.gpu.is_some())
            .field("software", &self.software.is_some())
            .field("custom", &self.custom.is_some())
            .finish()
    }
}
