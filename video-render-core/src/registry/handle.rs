use std::fmt;

use uuid::Uuid;

use crate::models::error::RenderError;
use crate::models::frame::VideoFrame;
use crate::models::render_mode::{ContentMode, RenderMode};
use crate::models::surface::Surface;
use crate::traits::renderer::Renderer;

/// A renderer bound to exactly one presentation surface.
///
/// The only way to obtain a handle is [`RendererHandle::bind`], so every
/// handle in the registry is bound. `unbind` is terminal: the caller drops
/// the handle afterwards (or quarantines it if unbinding failed).
pub struct RendererHandle {
    id: Uuid,
    mode: RenderMode,
    surface: Surface,
    renderer: Box<dyn Renderer>,
}

impl RendererHandle {
    /// Binds `renderer` to `surface` and wraps it.
    pub fn bind(
        mode: RenderMode,
        mut renderer: Box<dyn Renderer>,
        surface: Surface,
    ) -> Result<Self, RenderError> {
        renderer.bind(&surface)?;
        Ok(Self {
            id: Uuid::new_v4(),
            mode,
            surface,
            renderer,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The surface this handle was bound to.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn equals_surface(&self, surface: &Surface) -> bool {
        self.renderer.equals_surface(surface)
    }

    pub fn draw_frame(&mut self, frame: &VideoFrame<'_>) -> Result<(), RenderError> {
        self.renderer.draw_frame(frame)
    }

    pub fn refresh_canvas(&mut self) {
        self.renderer.refresh_canvas();
    }

    pub fn set_content_mode(&mut self, mode: ContentMode) {
        self.renderer.set_content_mode(mode);
    }

    pub fn unbind(&mut self) -> Result<(), RenderError> {
        self.renderer.unbind()
    }
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererHandle")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("surface", &self.surface.id)
            .finish()
    }
}
