//! Renderer that presents nothing but keeps score.
//!
//! Every renderer built from a [`HeadlessBoard`] reports into it, so a host
//! (or a test) can see what each surface would have shown.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use video_render_core::{
    ContentMode, RenderError, Renderer, RendererConstructor, Surface, SurfaceId, VideoFrame,
    ViewRect,
};

/// What one surface has been shown so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurfaceStats {
    pub surface: u64,
    pub bound: bool,
    pub frames_drawn: u64,
    pub refreshes: u64,
    pub content_mode: Option<ContentMode>,
    pub surface_size: (u32, u32),
    pub last_frame_size: (u16, u16),
    pub last_timestamp: u32,
    pub last_uid: u32,
    pub view: ViewRect,
}

#[derive(Default)]
struct BoardState {
    stats: BTreeMap<SurfaceId, SurfaceStats>,
    resized: HashMap<SurfaceId, (u32, u32)>,
}

/// Shared scoreboard for headless renderers.
#[derive(Clone, Default)]
pub struct HeadlessBoard {
    state: Arc<Mutex<BoardState>>,
}

impl HeadlessBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructor to install in a `RendererFactory`.
    pub fn constructor(&self) -> RendererConstructor {
        let board = self.clone();
        Arc::new(move || Box::new(HeadlessRenderer::new(board.clone())) as Box<dyn Renderer>)
    }

    /// Simulates the host resizing a surface; renderers pick it up on `refresh_canvas`.
    pub fn set_surface_size(&self, id: SurfaceId, width: u32, height: u32) {
        self.state.lock().resized.insert(id, (width, height));
    }

    pub fn stats(&self, id: SurfaceId) -> Option<SurfaceStats> {
        self.state.lock().stats.get(&id).cloned()
    }

    pub fn snapshot(&self) -> Vec<SurfaceStats> {
        self.state.lock().stats.values().cloned().collect()
    }

    fn update(&self, id: SurfaceId, f: impl FnOnce(&mut SurfaceStats)) {
        let mut state = self.state.lock();
        let entry = state.stats.entry(id).or_insert_with(|| SurfaceStats {
            surface: id.0,
            ..Default::default()
        });
        f(entry);
    }

    fn take_resize(&self, id: SurfaceId) -> Option<(u32, u32)> {
        self.state.lock().resized.remove(&id)
    }
}

/// Renderer that computes placement and counts frames.
pub struct HeadlessRenderer {
    board: HeadlessBoard,
    surface: Option<Surface>,
    content_mode: ContentMode,
    last_frame_size: (u16, u16),
}

impl HeadlessRenderer {
    pub fn new(board: HeadlessBoard) -> Self {
        Self {
            board,
            surface: None,
            content_mode: ContentMode::default(),
            last_frame_size: (0, 0),
        }
    }

    fn view(&self) -> ViewRect {
        match &self.surface {
            Some(surface) => self.content_mode.layout(
                self.last_frame_size.0 as u32,
                self.last_frame_size.1 as u32,
                surface.width,
                surface.height,
            ),
            None => ViewRect::default(),
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn bind(&mut self, surface: &Surface) -> Result<(), RenderError> {
        if let Some(bound) = &self.surface {
            return Err(RenderError::BindFailed(format!(
                "renderer already bound to {}",
                bound.id
            )));
        }
        self.surface = Some(surface.clone());
        self.board.update(surface.id, |stats| {
            stats.bound = true;
            stats.surface_size = (surface.width, surface.height);
        });
        Ok(())
    }

    fn unbind(&mut self) -> Result<(), RenderError> {
        let surface = self
            .surface
            .take()
            .ok_or_else(|| RenderError::UnbindFailed("renderer is not bound".into()))?;
        self.board.update(surface.id, |stats| stats.bound = false);
        Ok(())
    }

    fn draw_frame(&mut self, frame: &VideoFrame<'_>) -> Result<(), RenderError> {
        let Some(id) = self.surface.as_ref().map(|s| s.id) else {
            return Err(RenderError::DrawFailed("renderer is not bound".into()));
        };
        self.last_frame_size = (frame.header.width, frame.header.height);
        let view = self.view();
        self.board.update(id, |stats| {
            stats.frames_drawn += 1;
            stats.last_frame_size = (frame.header.width, frame.header.height);
            stats.last_timestamp = frame.header.timestamp;
            stats.last_uid = frame.uid;
            stats.view = view;
        });
        Ok(())
    }

    fn refresh_canvas(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let id = surface.id;
        if let Some((width, height)) = self.board.take_resize(id) {
            surface.width = width;
            surface.height = height;
        }
        let size = (surface.width, surface.height);
        let view = self.view();
        self.board.update(id, |stats| {
            stats.refreshes += 1;
            stats.surface_size = size;
            stats.view = view;
        });
    }

    fn set_content_mode(&mut self, mode: ContentMode) {
        self.content_mode = mode;
        if let Some(id) = self.surface.as_ref().map(|s| s.id) {
            let view = self.view();
            self.board.update(id, |stats| {
                stats.content_mode = Some(mode);
                stats.view = view;
            });
        }
    }

    fn equals_surface(&self, surface: &Surface) -> bool {
        self.surface.as_ref().is_some_and(|s| s.same_as(surface))
    }
}
