use crate::models::error::RenderError;
use crate::models::frame::VideoFrame;
use crate::models::render_mode::ContentMode;
use crate::models::surface::Surface;

/// Capability every presentation backend implements.
///
/// Implemented outside this crate by:
/// - GPU renderers (texture upload + draw)
/// - Software renderers (CPU blit)
/// - Application-supplied custom renderers
///
/// All calls arrive on the thread that currently owns the render session,
/// one at a time. `draw_frame` runs on the delivery path: do the minimum,
/// schedule any heavy paint work elsewhere, and never call back into the
/// engine from it.
pub trait Renderer: Send {
    /// Attach to `surface`. A renderer is bound to at most one surface for
    /// its whole life.
    fn bind(&mut self, surface: &Surface) -> Result<(), RenderError>;

    /// Detach from the surface and release everything the renderer holds.
    fn unbind(&mut self) -> Result<(), RenderError>;

    /// Present one frame.
    fn draw_frame(&mut self, frame: &VideoFrame<'_>) -> Result<(), RenderError>;

    /// Re-read the surface size and redraw at the new size.
    fn refresh_canvas(&mut self);

    fn set_content_mode(&mut self, mode: ContentMode);

    /// Whether this renderer is bound to `surface`.
    fn equals_surface(&self, surface: &Surface) -> bool;
}
