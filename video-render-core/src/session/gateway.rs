use crate::models::diagnostics::DeliveryDiagnostics;
use crate::models::error::RenderError;
use crate::models::frame::{FrameDescriptor, VideoFrame};
use crate::processing::frame_validator::FrameValidator;
use crate::registry::renderer_registry::RendererRegistry;

/// Hot path between the native engine and the renderers.
///
/// ```text
/// [FrameDescriptor] → resolve slot → registry lookup → validate → draw on every handle
/// ```
///
/// Frames that cannot be presented are dropped on the spot: there is no
/// queue, no retry and no backpressure, so renderer readiness never gates
/// decode cadence. Planes are never copied; every handle of a slot draws
/// from the same borrowed buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDeliveryGateway {
    validator: FrameValidator,
}

impl FrameDeliveryGateway {
    pub fn new(validator: FrameValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &FrameValidator {
        &self.validator
    }

    /// Delivers a batch in order.
    ///
    /// A `draw_frame` failure stops the fan-out of that frame only: later
    /// handles of the same slot are skipped, later descriptors are still
    /// delivered. The first failure is returned once the batch is done.
    /// Registry state is never touched.
    pub fn on_frame_batch(
        &self,
        registry: &mut RendererRegistry,
        batch: &[FrameDescriptor<'_>],
        diagnostics: &mut DeliveryDiagnostics,
    ) -> Result<(), RenderError> {
        diagnostics.batches += 1;
        let mut first_error = None;
        for descriptor in batch {
            diagnostics.frames_received += 1;
            if let Err(e) = self.deliver(registry, descriptor, diagnostics) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn deliver(
        &self,
        registry: &mut RendererRegistry,
        descriptor: &FrameDescriptor<'_>,
        diagnostics: &mut DeliveryDiagnostics,
    ) -> Result<(), RenderError> {
        let (Some(header), Some(y_plane), Some(u_plane), Some(v_plane)) = (
            descriptor.header,
            descriptor.y_plane,
            descriptor.u_plane,
            descriptor.v_plane,
        ) else {
            log::debug!(
                "Frame for uid {} in channel {:?} is missing a buffer",
                descriptor.uid,
                descriptor.channel_id
            );
            diagnostics.dropped_missing_buffer += 1;
            return Ok(());
        };

        let Some(slot) = RendererRegistry::resolve_slot_key(descriptor.stream_type, descriptor.uid)
        else {
            log::debug!(
                "No slot for stream type {} (uid {}); device-test and unknown streams are not rendered",
                descriptor.stream_type,
                descriptor.uid
            );
            diagnostics.dropped_unresolved_slot += 1;
            return Ok(());
        };

        let Some(handles) = registry
            .lookup_mut(descriptor.channel_id, slot)
            .filter(|handles| !handles.is_empty())
        else {
            log::warn!(
                "No renderer for uid {} in channel {:?}",
                descriptor.uid,
                descriptor.channel_id
            );
            diagnostics.dropped_no_renderer += 1;
            return Ok(());
        };

        let header = match self.validator.check(header, y_plane, u_plane, v_plane) {
            Ok(header) => header,
            Err(rejection) => {
                log::warn!(
                    "Dropping frame for slot {} in channel {:?}: {}",
                    slot,
                    descriptor.channel_id,
                    rejection
                );
                diagnostics.dropped_malformed += 1;
                return Ok(());
            }
        };

        let frame = VideoFrame {
            slot,
            uid: descriptor.uid,
            channel_id: descriptor.channel_id,
            header,
            y_plane,
            u_plane,
            v_plane,
        };

        for handle in handles.iter_mut() {
            diagnostics.draw_calls += 1;
            if let Err(e) = handle.draw_frame(&frame) {
                log::error!(
                    "Renderer {} failed to draw slot {} in channel {:?}: {}",
                    handle.id(),
                    slot,
                    descriptor.channel_id,
                    e
                );
                diagnostics.draw_failures += 1;
                return Err(e);
            }
        }
        diagnostics.frames_delivered += 1;
        log::trace!("Delivered frame for slot {} to {} renderer(s)", slot, handles.len());
        Ok(())
    }
}
