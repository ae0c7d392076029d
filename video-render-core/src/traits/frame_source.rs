use std::sync::Arc;

use crate::models::error::RenderError;
use crate::models::frame::FrameDescriptor;

/// Callback invoked by the native engine with a batch of decoded frames.
///
/// Buffers inside the descriptors are only valid for the duration of the call.
pub type FrameBatchCallback = Arc<dyn Fn(&[FrameDescriptor<'_>]) + Send + Sync + 'static>;

/// The native real-time engine, as far as video presentation is concerned.
///
/// Implemented by:
/// - `SyntheticFrameSource` (video-render-sim)
/// - Bindings to a real RTC SDK
pub trait FrameSource: Send {
    /// Start delivering frame batches via `callback`.
    ///
    /// The callback may fire on an engine-owned thread, many times per
    /// rendered tick, once per active (channel, stream) pair.
    fn start(&mut self, callback: FrameBatchCallback) -> Result<(), RenderError>;

    /// Stop delivering. No callback fires after this returns.
    fn stop(&mut self) -> Result<(), RenderError>;

    /// Ask the engine to start decoding video from a remote user.
    fn subscribe(&mut self, uid: u32, channel_id: &str) -> Result<(), RenderError>;

    fn unsubscribe(&mut self, uid: u32, channel_id: &str) -> Result<(), RenderError>;
}

/// Wraps a closure as a [`FrameBatchCallback`], pinning its signature to
/// accept descriptors of any lifetime.
pub fn frame_batch_callback<F>(f: F) -> FrameBatchCallback
where
    F: Fn(&[FrameDescriptor<'_>]) + Send + Sync + 'static,
{
    Arc::new(f)
}
