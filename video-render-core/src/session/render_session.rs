use chrono::{DateTime, Utc};

use crate::models::config::RenderConfiguration;
use crate::models::diagnostics::DeliveryDiagnostics;
use crate::models::error::RenderError;
use crate::models::frame::FrameDescriptor;
use crate::models::render_mode::ContentMode;
use crate::models::slot::SlotKey;
use crate::models::surface::Surface;
use crate::processing::frame_validator::FrameValidator;
use crate::registry::factory::RendererFactory;
use crate::registry::handle::RendererHandle;
use crate::registry::renderer_registry::RendererRegistry;
use crate::session::gateway::FrameDeliveryGateway;

/// Options for [`RenderSession::init_render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Add a renderer next to the existing ones instead of replacing them.
    pub append: bool,
}

impl InitOptions {
    pub fn append() -> Self {
        Self { append: true }
    }
}

/// A removed handle whose `unbind` failed.
///
/// It is no longer reachable by frames, but whatever it holds (a GPU
/// context, a native view) may still be alive until a retry succeeds.
#[derive(Debug)]
pub struct QuarantinedRenderer {
    pub handle: RendererHandle,
    pub channel_id: String,
    pub slot: SlotKey,
    pub error: RenderError,
    pub failed_at: DateTime<Utc>,
}

/// Renderer lifecycle plus frame delivery for one engine instance.
///
/// Owns the registry and lends it to the gateway for each batch. All methods
/// take `&mut self`, so lifecycle calls and batch deliveries are serialized
/// by construction: a teardown issued between two batches takes effect
/// before the next one, never in the middle of one.
#[derive(Debug)]
pub struct RenderSession {
    config: RenderConfiguration,
    factory: RendererFactory,
    registry: RendererRegistry,
    gateway: FrameDeliveryGateway,
    diagnostics: DeliveryDiagnostics,
    quarantine: Vec<QuarantinedRenderer>,
}

impl RenderSession {
    pub fn new(factory: RendererFactory, config: RenderConfiguration) -> Self {
        let gateway = FrameDeliveryGateway::new(FrameValidator::new(config.geometry_check));
        Self {
            config,
            factory,
            registry: RendererRegistry::new(),
            gateway,
            diagnostics: DeliveryDiagnostics::default(),
            quarantine: Vec::new(),
        }
    }

    pub fn config(&self) -> &RenderConfiguration {
        &self.config
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> DeliveryDiagnostics {
        self.diagnostics.clone()
    }

    pub fn quarantined(&self) -> &[QuarantinedRenderer] {
        &self.quarantine
    }

    /// Attaches a renderer for `slot` to `surface`.
    ///
    /// Replace mode (default): existing handles of the slot are unbound first
    /// (failures are logged and quarantined, not returned), then a new handle
    /// is built, bound and installed as the only one. If building or binding
    /// fails the slot is left empty.
    ///
    /// Append mode: a no-op if a handle of the slot already targets `surface`,
    /// otherwise the new handle is added after the existing ones.
    pub fn init_render(
        &mut self,
        slot: SlotKey,
        surface: Surface,
        channel_id: &str,
        options: InitOptions,
    ) -> Result<(), RenderError> {
        if options.append {
            if self.registry.contains_surface(channel_id, slot, &surface) {
                log::debug!(
                    "{} already renders slot {} in channel {:?}",
                    surface.id,
                    slot,
                    channel_id
                );
                return Ok(());
            }

            let handle = self.create_handle(surface)?;
            log::info!("Appending renderer {} to slot {} in channel {:?}", handle.id(), slot, channel_id);
            if let Err(rejected) = self.registry.append(channel_id, slot, handle) {
                let _ = self.release_handles(channel_id, slot, vec![rejected]);
            }
            return Ok(());
        }

        let displaced = self.registry.remove_all(channel_id, slot);
        if !displaced.is_empty() {
            log::info!(
                "Replacing {} renderer(s) on slot {} in channel {:?}",
                displaced.len(),
                slot,
                channel_id
            );
            let _ = self.release_handles(channel_id, slot, displaced);
        }

        let handle = self.create_handle(surface)?;
        log::info!("Attached renderer {} to slot {} in channel {:?}", handle.id(), slot, channel_id);
        let leftover = self.registry.replace(channel_id, slot, handle);
        debug_assert!(leftover.is_empty());
        Ok(())
    }

    /// Detaches every renderer of `slot`.
    ///
    /// The slot (and the channel, if it empties) is removed even when an
    /// unbind fails. All handles are unbound; the first failure is returned.
    pub fn destroy_render(&mut self, slot: SlotKey, channel_id: &str) -> Result<(), RenderError> {
        let removed = self.registry.remove_all(channel_id, slot);
        if removed.is_empty() {
            log::debug!("No renderer to destroy for slot {} in channel {:?}", slot, channel_id);
            return Ok(());
        }
        log::info!(
            "Destroying {} renderer(s) for slot {} in channel {:?}",
            removed.len(),
            slot,
            channel_id
        );
        self.release_handles(channel_id, slot, removed)
    }

    /// Detaches only the renderer of `slot` bound to `surface`.
    pub fn destroy_render_view(
        &mut self,
        slot: SlotKey,
        channel_id: &str,
        surface: &Surface,
    ) -> Result<(), RenderError> {
        match self.registry.remove_matching(channel_id, slot, surface) {
            Some(handle) => {
                log::info!(
                    "Destroying renderer {} ({}) for slot {} in channel {:?}",
                    handle.id(),
                    surface.id,
                    slot,
                    channel_id
                );
                self.release_handles(channel_id, slot, vec![handle])
            }
            None => {
                log::debug!("{} is not attached to slot {} in channel {:?}", surface.id, slot, channel_id);
                Ok(())
            }
        }
    }

    /// Asks every renderer of `slot` to re-read its surface size. No-op if the slot is absent.
    pub fn resize_render(&mut self, slot: SlotKey, channel_id: &str) {
        if let Some(handles) = self.registry.lookup_mut(channel_id, slot) {
            for handle in handles.iter_mut() {
                handle.refresh_canvas();
            }
        }
    }

    /// Sets the content mode of every renderer of `slot`.
    ///
    /// Fails with [`RenderError::SlotNotFound`] (code `-1`) if the slot is absent.
    pub fn setup_view_content_mode(
        &mut self,
        slot: SlotKey,
        mode: ContentMode,
        channel_id: &str,
    ) -> Result<(), RenderError> {
        let handles = self
            .registry
            .lookup_mut(channel_id, slot)
            .ok_or_else(|| RenderError::SlotNotFound {
                channel_id: channel_id.to_string(),
                slot,
            })?;
        for handle in handles.iter_mut() {
            handle.set_content_mode(mode);
        }
        Ok(())
    }

    /// Entry point for the native engine's frame batches.
    pub fn on_frame_batch(&mut self, batch: &[FrameDescriptor<'_>]) -> Result<(), RenderError> {
        self.gateway
            .on_frame_batch(&mut self.registry, batch, &mut self.diagnostics)
    }

    /// Unbinds every renderer of every channel and empties the registry.
    pub fn release(&mut self) -> Result<(), RenderError> {
        let drained = self.registry.drain();
        if !drained.is_empty() {
            log::info!("Releasing {} renderer(s)", drained.len());
        }

        let mut first_error = None;
        for (channel_id, slot, handle) in drained {
            if let Err(e) = self.release_handles(&channel_id, slot, vec![handle]) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Retries `unbind` on quarantined handles. Returns how many were released.
    pub fn retry_quarantined(&mut self) -> usize {
        let mut released = 0;
        for mut entry in std::mem::take(&mut self.quarantine) {
            match entry.handle.unbind() {
                Ok(()) => {
                    log::info!("Quarantined renderer {} released", entry.handle.id());
                    released += 1;
                }
                Err(e) => {
                    log::warn!("Quarantined renderer {} still failing: {}", entry.handle.id(), e);
                    entry.error = e;
                    entry.failed_at = Utc::now();
                    self.quarantine.push(entry);
                }
            }
        }
        released
    }

    fn create_handle(&self, surface: Surface) -> Result<RendererHandle, RenderError> {
        let (mode, renderer) = self.factory.create(self.config.render_mode)?;
        let mut handle = RendererHandle::bind(mode, renderer, surface)?;
        handle.set_content_mode(self.config.content_mode);
        Ok(handle)
    }

    /// Unbinds handles already removed from the registry.
    ///
    /// Failures are logged, counted and quarantined; the first one is returned.
    fn release_handles(
        &mut self,
        channel_id: &str,
        slot: SlotKey,
        handles: Vec<RendererHandle>,
    ) -> Result<(), RenderError> {
        let mut first_error = None;
        for mut handle in handles {
            if let Err(e) = handle.unbind() {
                log::error!(
                    "Failed to unbind renderer {} for slot {} in channel {:?}: {}",
                    handle.id(),
                    slot,
                    channel_id,
                    e
                );
                self.diagnostics.unbind_failures += 1;
                if first_error.is_none() {
                    first_error = Some(e.clone());
                }
                self.quarantine.push(QuarantinedRenderer {
                    handle,
                    channel_id: channel_id.to_string(),
                    slot,
                    error: e,
                    failed_at: Utc::now(),
                });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
