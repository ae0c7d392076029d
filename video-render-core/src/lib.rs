//! # video-render-core
//!
//! Platform-agnostic video frame delivery for a native real-time
//! communication engine.
//!
//! Receives decoded I420 frames from the engine at whatever rate it produces
//! them and routes each one, without blocking or queueing, to zero or more
//! renderers, while renderers are attached, replaced and detached at will.
//! Concrete renderers (GPU, software, custom) implement the `Renderer` trait;
//! engine bindings implement `FrameSource` and plug into `VideoEngine`.
//!
//! ## Architecture
//!
//! ```text
//! video-render-core (this crate)
//! ├── traits/       ← Renderer, FrameSource, FrameBatchCallback
//! ├── models/       ← RenderError, FrameDescriptor, SlotKey, Surface, RenderConfiguration, etc.
//! ├── processing/   ← FrameValidator
//! ├── registry/     ← RendererRegistry, RendererHandle, RendererFactory
//! └── session/      ← FrameDeliveryGateway, RenderSession (lifecycle), VideoEngine
//! ```

pub mod models;
pub mod processing;
pub mod registry;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{GeometryCheck, RenderConfiguration};
pub use models::diagnostics::DeliveryDiagnostics;
pub use models::error::{FrameRejection, RenderError};
pub use models::frame::{FrameDescriptor, FrameHeader, VideoFrame, FRAME_HEADER_LEN};
pub use models::render_mode::{ContentMode, RenderMode, ViewRect};
pub use models::slot::{SlotKey, StreamType};
pub use models::surface::{Surface, SurfaceId};
pub use processing::frame_validator::FrameValidator;
pub use registry::factory::{RendererConstructor, RendererFactory};
pub use registry::handle::RendererHandle;
pub use registry::renderer_registry::{RendererRegistry, SlotMap};
pub use session::engine::{VideoEngine, DEFAULT_CHANNEL};
pub use session::gateway::FrameDeliveryGateway;
pub use session::render_session::{InitOptions, QuarantinedRenderer, RenderSession};
pub use traits::frame_source::{frame_batch_callback, FrameBatchCallback, FrameSource};
pub use traits::renderer::Renderer;
