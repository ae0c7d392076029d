//! Recording renderer shared by the unit tests.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::RenderError;
use crate::models::frame::VideoFrame;
use crate::models::render_mode::ContentMode;
use crate::models::surface::{Surface, SurfaceId};
use crate::registry::factory::RendererFactory;
use crate::traits::renderer::Renderer;

/// One capability call, tagged with the surface the renderer was bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Bind(SurfaceId),
    Unbind(SurfaceId),
    Draw(SurfaceId, u32),
    Refresh(SurfaceId),
    ContentMode(SurfaceId, ContentMode),
}

#[derive(Default)]
struct Faults {
    bind: HashSet<SurfaceId>,
    unbind: HashSet<SurfaceId>,
    draw: HashSet<SurfaceId>,
}

#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    faults: Arc<Mutex<Faults>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renderer(&self) -> Box<dyn Renderer> {
        Box::new(RecordingRenderer {
            recorder: self.clone(),
            surface: None,
        })
    }

    pub fn factory(&self) -> RendererFactory {
        let recorder = self.clone();
        RendererFactory::new().with_software(Arc::new(move || recorder.renderer()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn draws(&self) -> Vec<SurfaceId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Draw(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn fail_bind(&self, id: u64) {
        self.faults.lock().bind.insert(SurfaceId(id));
    }

    pub fn fail_unbind(&self, id: u64) {
        self.faults.lock().unbind.insert(SurfaceId(id));
    }

    pub fn heal_unbind(&self, id: u64) {
        self.faults.lock().unbind.remove(&SurfaceId(id));
    }

    pub fn fail_draw(&self, id: u64) {
        self.faults.lock().draw.insert(SurfaceId(id));
    }
}

struct RecordingRenderer {
    recorder: Recorder,
    surface: Option<Surface>,
}

impl RecordingRenderer {
    fn id(&self) -> SurfaceId {
        self.surface.as_ref().map(|s| s.id).unwrap_or(SurfaceId(u64::MAX))
    }

    fn record(&self, call: Call) {
        self.recorder.calls.lock().push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn bind(&mut self, surface: &Surface) -> Result<(), RenderError> {
        if self.recorder.faults.lock().bind.contains(&surface.id) {
            return Err(RenderError::BindFailed(format!("cannot bind {}", surface.id)));
        }
        self.surface = Some(surface.clone());
        self.record(Call::Bind(surface.id));
        Ok(())
    }

    fn unbind(&mut self) -> Result<(), RenderError> {
        let id = self.id();
        self.record(Call::Unbind(id));
        if self.recorder.faults.lock().unbind.contains(&id) {
            return Err(RenderError::UnbindFailed(format!("{} is stuck", id)));
        }
        Ok(())
    }

    fn draw_frame(&mut self, frame: &VideoFrame<'_>) -> Result<(), RenderError> {
        let id = self.id();
        self.record(Call::Draw(id, frame.uid));
        if self.recorder.faults.lock().draw.contains(&id) {
            return Err(RenderError::DrawFailed(format!("{} lost its context", id)));
        }
        Ok(())
    }

    fn refresh_canvas(&mut self) {
        self.record(Call::Refresh(self.id()));
    }

    fn set_content_mode(&mut self, mode: ContentMode) {
        self.record(Call::ContentMode(self.id(), mode));
    }

    fn equals_surface(&self, surface: &Surface) -> bool {
        self.surface.as_ref().is_some_and(|s| s.same_as(surface))
    }
}

/// A well-formed 20x20 I420 frame: header, Y, U, V.
pub(crate) fn frame_buffers() -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    let header = crate::models::frame::FrameHeader {
        width: 20,
        height: 20,
        ..Default::default()
    }
    .encode()
    .to_vec();
    (header, vec![16; 400], vec![128; 100], vec![128; 100])
}
