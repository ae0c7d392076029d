//! Synthetic stand-in for the native engine's video pipeline.
//!
//! Produces I420 test-pattern frames for the local camera, an optional local
//! video source, and every subscribed remote user, and delivers them in one
//! batch per tick via the `FrameBatchCallback`.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use video_render_core::{
    FrameBatchCallback, FrameDescriptor, FrameHeader, FrameSource, RenderError, StreamType,
    DEFAULT_CHANNEL, FRAME_HEADER_LEN,
};

/// Configuration for [`SyntheticFrameSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSourceConfig {
    /// Batches per second (default: 30).
    pub fps: u32,

    /// Frame width in pixels; must be even (default: 320).
    pub width: u16,

    /// Frame height in pixels; must be even (default: 180).
    pub height: u16,

    /// Emit local camera frames (default: true).
    pub emit_local: bool,

    /// Emit local video-source frames (default: false).
    pub emit_video_source: bool,
}

impl SyntheticSourceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=240).contains(&self.fps) {
            return Err(format!("unsupported frame rate: {}", self.fps));
        }
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(format!(
                "frame size must be even and non-zero: {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

impl Default for SyntheticSourceConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            width: 320,
            height: 180,
            emit_local: true,
            emit_video_source: false,
        }
    }
}

/// One generated frame; owns the buffers the descriptor borrows.
#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    pub stream_type: StreamType,
    pub uid: u32,
    pub channel_id: String,
    pub header: [u8; FRAME_HEADER_LEN],
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
}

impl SyntheticFrame {
    pub fn descriptor(&self) -> FrameDescriptor<'_> {
        FrameDescriptor::new(
            self.stream_type.as_raw(),
            self.uid,
            &self.channel_id,
            &self.header,
            &self.y_plane,
            &self.u_plane,
            &self.v_plane,
        )
    }
}

/// Test pattern: a diagonal luma ramp that scrolls with `tick`, chroma tinted by `seed`.
pub fn test_pattern(width: u16, height: u16, tick: u32, seed: u32) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let (w, h) = (width as usize, height as usize);
    let mut y_plane = Vec::with_capacity(w * h);
    for row in 0..h {
        for col in 0..w {
            y_plane.push(((row + col + tick as usize) % 256) as u8);
        }
    }

    let chroma_len = (w / 2) * (h / 2);
    let u_plane = vec![(seed.wrapping_mul(37) % 256) as u8; chroma_len];
    let v_plane = vec![(seed.wrapping_mul(91) % 256) as u8; chroma_len];
    (y_plane, u_plane, v_plane)
}

/// Builds the batch for one tick: local, video source, then remotes in
/// (channel, uid) order.
pub fn build_batch(
    config: &SyntheticSourceConfig,
    subscriptions: &BTreeSet<(String, u32)>,
    tick: u32,
) -> Vec<SyntheticFrame> {
    let header = FrameHeader {
        width: config.width,
        height: config.height,
        right: config.width,
        bottom: config.height,
        timestamp: tick.wrapping_mul(1000) / config.fps.max(1),
        ..Default::default()
    }
    .encode();

    let mut streams: Vec<(StreamType, u32, String)> = Vec::new();
    if config.emit_local {
        streams.push((StreamType::Local, 0, DEFAULT_CHANNEL.to_string()));
    }
    if config.emit_video_source {
        streams.push((StreamType::VideoSource, 0, DEFAULT_CHANNEL.to_string()));
    }
    for (channel_id, uid) in subscriptions {
        streams.push((StreamType::Remote, *uid, channel_id.clone()));
    }

    streams
        .into_iter()
        .map(|(stream_type, uid, channel_id)| {
            let (y_plane, u_plane, v_plane) = test_pattern(config.width, config.height, tick, uid);
            SyntheticFrame {
                stream_type,
                uid,
                channel_id,
                header,
                y_plane,
                u_plane,
                v_plane,
            }
        })
        .collect()
}

/// Frame source that synthesizes frames on a dedicated thread.
pub struct SyntheticFrameSource {
    config: SyntheticSourceConfig,
    subscriptions: Arc<Mutex<BTreeSet<(String, u32)>>>,
    running: Arc<AtomicBool>,
    delivery_handle: Option<thread::JoinHandle<()>>,
}

impl SyntheticFrameSource {
    pub fn new(config: SyntheticSourceConfig) -> Result<Self, RenderError> {
        config.validate().map_err(RenderError::ConfigurationFailed)?;
        Ok(Self {
            config,
            subscriptions: Arc::new(Mutex::new(BTreeSet::new())),
            running: Arc::new(AtomicBool::new(false)),
            delivery_handle: None,
        })
    }

    pub fn config(&self) -> &SyntheticSourceConfig {
        &self.config
    }

    pub fn subscriptions(&self) -> Vec<(String, u32)> {
        self.subscriptions.lock().iter().cloned().collect()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn start(&mut self, callback: FrameBatchCallback) -> Result<(), RenderError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(RenderError::SourceFailed(
                "synthetic source already running".into(),
            ));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let subscriptions = Arc::clone(&self.subscriptions);
        let config = self.config.clone();
        let interval = Duration::from_secs_f64(1.0 / config.fps as f64);

        let handle = thread::Builder::new()
            .name("synthetic-frame-source".into())
            .spawn(move || {
                let mut tick: u32 = 0;
                while running.load(Ordering::SeqCst) {
                    let frames = {
                        let subs = subscriptions.lock();
                        build_batch(&config, &subs, tick)
                    };
                    if !frames.is_empty() {
                        let batch: Vec<FrameDescriptor<'_>> =
                            frames.iter().map(SyntheticFrame::descriptor).collect();
                        callback(&batch);
                    }
                    tick = tick.wrapping_add(1);
                    thread::sleep(interval);
                }
                log::debug!("Synthetic frame source exited after {} ticks", tick);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                RenderError::SourceFailed(format!("failed to spawn source thread: {}", e))
            })?;

        self.delivery_handle = Some(handle);
        log::info!(
            "Synthetic frame source started ({}x{} @ {} fps)",
            self.config.width,
            self.config.height,
            self.config.fps
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RenderError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.delivery_handle.take() {
            handle
                .join()
                .map_err(|_| RenderError::SourceFailed("source thread panicked".into()))?;
        }
        Ok(())
    }

    fn subscribe(&mut self, uid: u32, channel_id: &str) -> Result<(), RenderError> {
        if uid == 0 {
            return Err(RenderError::InvalidUid(uid));
        }
        self.subscriptions.lock().insert((channel_id.to_string(), uid));
        log::debug!("Subscribed to uid {} in channel {:?}", uid, channel_id);
        Ok(())
    }

    fn unsubscribe(&mut self, uid: u32, channel_id: &str) -> Result<(), RenderError> {
        self.subscriptions.lock().remove(&(channel_id.to_string(), uid));
        log::debug!("Unsubscribed from uid {} in channel {:?}", uid, channel_id);
        Ok(())
    }
}

impl Drop for SyntheticFrameSource {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
