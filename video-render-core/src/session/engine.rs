use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::RenderConfiguration;
use crate::models::diagnostics::DeliveryDiagnostics;
use crate::models::error::RenderError;
use crate::models::frame::FrameDescriptor;
use crate::models::render_mode::ContentMode;
use crate::models::slot::SlotKey;
use crate::models::surface::Surface;
use crate::registry::factory::RendererFactory;
use crate::session::render_session::{InitOptions, RenderSession};
use crate::traits::frame_source::{frame_batch_callback, FrameSource};

/// Default channel used by local previews.
pub const DEFAULT_CHANNEL: &str = "";

/// Video presentation for one native engine instance.
///
/// Generic over the engine via the `FrameSource` trait. The session sits
/// behind a `parking_lot::Mutex` because the engine may deliver batches from
/// its own thread; the lock is taken once per batch and once per lifecycle
/// call, so the two never interleave.
///
/// ```text
/// [FrameSource thread] → callback → lock → RenderSession::on_frame_batch → renderers
/// [application]        → init_render / destroy_render / ... → lock → RenderSession
/// ```
pub struct VideoEngine<S: FrameSource> {
    source: S,
    session: Arc<Mutex<RenderSession>>,
    running: bool,
}

impl<S: FrameSource> VideoEngine<S> {
    pub fn new(source: S, factory: RendererFactory, config: RenderConfiguration) -> Self {
        Self {
            source,
            session: Arc::new(Mutex::new(RenderSession::new(factory, config))),
            running: false,
        }
    }

    /// Shared handle to the session, for hosts that inspect it directly.
    pub fn session(&self) -> Arc<Mutex<RenderSession>> {
        Arc::clone(&self.session)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn diagnostics(&self) -> DeliveryDiagnostics {
        self.session.lock().diagnostics()
    }

    /// Registers the batch callback with the frame source and starts it.
    pub fn start(&mut self) -> Result<(), RenderError> {
        if self.running {
            return Err(RenderError::SourceFailed("engine already started".into()));
        }

        let session = Arc::clone(&self.session);
        let callback = frame_batch_callback(move |batch: &[FrameDescriptor<'_>]| {
            // Nothing above this frame can handle a renderer failure.
            if let Err(e) = session.lock().on_frame_batch(batch) {
                log::debug!("Batch delivered with renderer failures, first: {}", e);
            }
        });

        self.source.start(callback)?;
        self.running = true;
        log::info!("Video engine started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), RenderError> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.source.stop()?;
        log::info!("Video engine stopped");
        Ok(())
    }

    pub fn init_render(
        &self,
        slot: SlotKey,
        surface: Surface,
        channel_id: &str,
        options: InitOptions,
    ) -> Result<(), RenderError> {
        self.session
            .lock()
            .init_render(slot, surface, channel_id, options)
    }

    pub fn destroy_render(&self, slot: SlotKey, channel_id: &str) -> Result<(), RenderError> {
        self.session.lock().destroy_render(slot, channel_id)
    }

    pub fn destroy_render_view(
        &self,
        slot: SlotKey,
        channel_id: &str,
        surface: &Surface,
    ) -> Result<(), RenderError> {
        self.session
            .lock()
            .destroy_render_view(slot, channel_id, surface)
    }

    pub fn resize_render(&self, slot: SlotKey, channel_id: &str) {
        self.session.lock().resize_render(slot, channel_id);
    }

    pub fn setup_view_content_mode(
        &self,
        slot: SlotKey,
        mode: ContentMode,
        channel_id: &str,
    ) -> Result<(), RenderError> {
        self.session
            .lock()
            .setup_view_content_mode(slot, mode, channel_id)
    }

    /// Shows (or, with `None`, stops showing) the local camera preview.
    pub fn setup_local_video(&self, surface: Option<Surface>) -> Result<(), RenderError> {
        self.setup_fixed_slot(SlotKey::Local, surface)
    }

    /// Shows (or, with `None`, stops showing) the secondary local video source.
    pub fn setup_local_video_source(&self, surface: Option<Surface>) -> Result<(), RenderError> {
        self.setup_fixed_slot(SlotKey::VideoSource, surface)
    }

    /// Renders remote user `uid` on `surface` and asks the engine for their video.
    pub fn subscribe(&mut self, uid: u32, surface: Surface, channel_id: &str) -> Result<(), RenderError> {
        self.attach_remote(uid, surface, channel_id, InitOptions::default())
    }

    /// With a surface: attach it and subscribe. Without: destroy every view of
    /// `uid` and unsubscribe.
    ///
    /// Teardown always unsubscribes, even if a renderer failed to unbind; the
    /// unbind failure is returned afterwards.
    pub fn setup_remote_video(
        &mut self,
        uid: u32,
        surface: Option<Surface>,
        channel_id: &str,
        options: InitOptions,
    ) -> Result<(), RenderError> {
        let slot = SlotKey::remote(uid).ok_or(RenderError::InvalidUid(uid))?;
        match surface {
            Some(surface) => self.attach_remote(uid, surface, channel_id, options),
            None => {
                let destroyed = self.destroy_render(slot, channel_id);
                self.source.unsubscribe(uid, channel_id)?;
                destroyed
            }
        }
    }

    /// Stops the source and unbinds every renderer.
    pub fn release(&mut self) -> Result<(), RenderError> {
        let stopped = self.stop();
        let released = self.session.lock().release();
        stopped.and(released)
    }

    /// Attaches a renderer for `uid`, then subscribes. A failed subscribe
    /// takes back the renderer this call attached.
    fn attach_remote(
        &mut self,
        uid: u32,
        surface: Surface,
        channel_id: &str,
        options: InitOptions,
    ) -> Result<(), RenderError> {
        let slot = SlotKey::remote(uid).ok_or(RenderError::InvalidUid(uid))?;
        let already_attached = self
            .session
            .lock()
            .registry()
            .contains_surface(channel_id, slot, &surface);
        self.init_render(slot, surface.clone(), channel_id, options)?;

        if let Err(e) = self.source.subscribe(uid, channel_id) {
            log::warn!("Subscribe to uid {} in channel {:?} failed: {}", uid, channel_id, e);
            let rollback = match (options.append, already_attached) {
                (true, true) => Ok(()),
                (true, false) => self.destroy_render_view(slot, channel_id, &surface),
                (false, _) => self.destroy_render(slot, channel_id),
            };
            if let Err(rollback) = rollback {
                log::warn!("Rolling back renderer for uid {} failed: {}", uid, rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    fn setup_fixed_slot(&self, slot: SlotKey, surface: Option<Surface>) -> Result<(), RenderError> {
        match surface {
            Some(surface) => self.init_render(slot, surface, DEFAULT_CHANNEL, InitOptions::default()),
            None => self.destroy_render(slot, DEFAULT_CHANNEL),
        }
    }
}

impl<S: FrameSource> Drop for VideoEngine<S> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Error releasing video engine: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::surface::SurfaceId;
    use crate::testing::{frame_buffers, Call, Recorder};
    use crate::traits::frame_source::FrameBatchCallback;

    /// Frame source driven by the test: `emit` plays the native engine.
    #[derive(Clone, Default)]
    struct ManualSource {
        callback: Arc<Mutex<Option<FrameBatchCallback>>>,
        commands: Arc<Mutex<Vec<String>>>,
        refuse_subscribe: Arc<Mutex<bool>>,
    }

    impl ManualSource {
        fn emit(&self, batch: &[FrameDescriptor<'_>]) {
            let callback = self.callback.lock().clone();
            if let Some(callback) = callback {
                callback(batch);
            }
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().clone()
        }

        fn refuse_subscribe(&self) {
            *self.refuse_subscribe.lock() = true;
        }
    }

    impl FrameSource for ManualSource {
        fn start(&mut self, callback: FrameBatchCallback) -> Result<(), RenderError> {
            *self.callback.lock() = Some(callback);
            self.commands.lock().push("start".into());
            Ok(())
        }

        fn stop(&mut self) -> Result<(), RenderError> {
            *self.callback.lock() = None;
            self.commands.lock().push("stop".into());
            Ok(())
        }

        fn subscribe(&mut self, uid: u32, channel_id: &str) -> Result<(), RenderError> {
            if *self.refuse_subscribe.lock() {
                return Err(RenderError::SourceFailed(format!("{uid} is not in {channel_id}")));
            }
            self.commands.lock().push(format!("subscribe {uid}@{channel_id}"));
            Ok(())
        }

        fn unsubscribe(&mut self, uid: u32, channel_id: &str) -> Result<(), RenderError> {
            self.commands.lock().push(format!("unsubscribe {uid}@{channel_id}"));
            Ok(())
        }
    }

    fn engine(recorder: &Recorder, source: &ManualSource) -> VideoEngine<ManualSource> {
        VideoEngine::new(source.clone(), recorder.factory(), RenderConfiguration::default())
    }

    #[test]
    fn start_routes_batches_to_renderers() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);
        engine.setup_local_video(Some(Surface::new(1, 640, 360))).unwrap();
        engine.start().unwrap();

        let (h, y, u, v) = frame_buffers();
        source.emit(&[FrameDescriptor::new(0, 0, "", &h, &y, &u, &v)]);

        assert_eq!(recorder.draws(), vec![SurfaceId(1)]);
        assert_eq!(engine.diagnostics().batches, 1);
        assert!(engine.start().is_err());
    }

    #[test]
    fn subscribe_attaches_then_asks_engine() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);

        engine.subscribe(42, Surface::new(1, 640, 360), "room").unwrap();

        assert_eq!(source.commands(), vec!["subscribe 42@room"]);
        assert!(engine
            .session()
            .lock()
            .registry()
            .lookup("room", SlotKey::Remote(42))
            .is_some());
    }

    #[test]
    fn failed_subscribe_leaves_no_renderer_behind() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);
        source.refuse_subscribe();

        let result = engine.subscribe(42, Surface::new(1, 640, 360), "room");

        assert!(matches!(result, Err(RenderError::SourceFailed(_))));
        assert!(engine.session().lock().registry().is_empty());
        assert_eq!(recorder.count(&Call::Bind(SurfaceId(1))), 1);
        assert_eq!(recorder.count(&Call::Unbind(SurfaceId(1))), 1);
    }

    #[test]
    fn failed_append_subscribe_keeps_earlier_views() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);
        engine
            .setup_remote_video(7, Some(Surface::new(1, 640, 360)), "room", InitOptions::append())
            .unwrap();
        source.refuse_subscribe();

        let result =
            engine.setup_remote_video(7, Some(Surface::new(2, 320, 180)), "room", InitOptions::append());

        assert!(result.is_err());
        let session = engine.session();
        let session = session.lock();
        let handles = session.registry().lookup("room", SlotKey::Remote(7)).unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].surface().id, SurfaceId(1));
    }

    #[test]
    fn uid_zero_is_not_a_remote_user() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);

        assert_eq!(
            engine.subscribe(0, Surface::new(1, 640, 360), "room"),
            Err(RenderError::InvalidUid(0))
        );
        assert_eq!(
            engine.setup_remote_video(0, None, "room", InitOptions::default()),
            Err(RenderError::InvalidUid(0))
        );
        assert!(recorder.calls().is_empty());
        assert!(source.commands().is_empty());
        assert!(engine.session().lock().registry().is_empty());
    }

    #[test]
    fn setup_remote_video_none_destroys_and_unsubscribes() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);
        engine
            .setup_remote_video(7, Some(Surface::new(1, 640, 360)), "room", InitOptions::append())
            .unwrap();
        engine
            .setup_remote_video(7, Some(Surface::new(2, 320, 180)), "room", InitOptions::append())
            .unwrap();

        recorder.fail_unbind(1);
        let result = engine.setup_remote_video(7, None, "room", InitOptions::default());

        assert!(matches!(result, Err(RenderError::UnbindFailed(_))));
        assert_eq!(
            source.commands(),
            vec!["subscribe 7@room", "subscribe 7@room", "unsubscribe 7@room"]
        );
        assert!(engine.session().lock().registry().is_empty());
    }

    #[test]
    fn local_video_source_uses_default_channel() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let engine = engine(&recorder, &source);

        engine.setup_local_video_source(Some(Surface::new(5, 640, 360))).unwrap();
        let (h, y, u, v) = frame_buffers();
        engine
            .session()
            .lock()
            .on_frame_batch(&[FrameDescriptor::new(3, 0, DEFAULT_CHANNEL, &h, &y, &u, &v)])
            .unwrap();
        engine.setup_local_video_source(None).unwrap();

        assert_eq!(recorder.draws(), vec![SurfaceId(5)]);
        assert_eq!(recorder.count(&Call::Unbind(SurfaceId(5))), 1);
    }

    #[test]
    fn draw_failure_is_contained_at_the_callback() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        let mut engine = engine(&recorder, &source);
        engine.setup_local_video(Some(Surface::new(1, 640, 360))).unwrap();
        engine.start().unwrap();
        recorder.fail_draw(1);

        let (h, y, u, v) = frame_buffers();
        source.emit(&[FrameDescriptor::new(0, 0, "", &h, &y, &u, &v)]);

        assert_eq!(engine.diagnostics().draw_failures, 1);
        assert!(engine
            .session()
            .lock()
            .registry()
            .lookup("", SlotKey::Local)
            .is_some());
    }

    #[test]
    fn drop_stops_source_and_unbinds() {
        let recorder = Recorder::new();
        let source = ManualSource::default();
        {
            let mut engine = engine(&recorder, &source);
            engine.setup_local_video(Some(Surface::new(1, 640, 360))).unwrap();
            engine.start().unwrap();
        }

        assert_eq!(source.commands(), vec!["start", "stop"]);
        assert_eq!(recorder.count(&Call::Unbind(SurfaceId(1))), 1);
    }
}
