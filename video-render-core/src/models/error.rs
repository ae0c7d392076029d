use thiserror::Error;

use super::render_mode::RenderMode;
use super::slot::SlotKey;

/// Errors surfaced by the renderer lifecycle and the frame source.
///
/// Frame-path problems (malformed frames, frames with no renderer) are not
/// errors: they are dropped, logged and counted. See [`FrameRejection`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no renderer for slot {slot} in channel {channel_id:?}")]
    SlotNotFound { channel_id: String, slot: SlotKey },

    #[error("no renderer available for render mode {0:?}")]
    RendererUnavailable(RenderMode),

    #[error("bind failed: {0}")]
    BindFailed(String),

    #[error("unbind failed: {0}")]
    UnbindFailed(String),

    #[error("draw failed: {0}")]
    DrawFailed(String),

    #[error("frame source error: {0}")]
    SourceFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("uid {0} does not name a remote user")]
    InvalidUid(u32),
}

impl RenderError {
    /// Integer status code for hosts that only understand return codes.
    ///
    /// `SlotNotFound` is `-1`, the code `setupViewContentMode` has always
    /// returned for an unknown view.
    pub fn code(&self) -> i32 {
        match self {
            Self::SlotNotFound { .. } => -1,
            Self::RendererUnavailable(_) => -2,
            Self::BindFailed(_) => -3,
            Self::UnbindFailed(_) => -4,
            Self::DrawFailed(_) => -5,
            Self::SourceFailed(_) => -6,
            Self::ConfigurationFailed(_) => -7,
            Self::InvalidUid(_) => -8,
        }
    }
}

/// Why the frame validator refused a frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameRejection {
    #[error("header is {0} bytes, expected 20")]
    HeaderLength(usize),

    #[error("plane looks mis-shifted onto the header (y={y_len}, u={u_len})")]
    MisShiftedPlane { y_len: usize, u_len: usize },

    #[error("plane lengths are not 4:1:1 (y={y_len}, u={u_len}, v={v_len})")]
    PlaneRatio {
        y_len: usize,
        u_len: usize,
        v_len: usize,
    },

    #[error("header declares {width}x{height} but y plane is {y_len} bytes")]
    Geometry { width: u16, height: u16, y_len: usize },
}
