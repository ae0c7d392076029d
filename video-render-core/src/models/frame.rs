use super::slot::SlotKey;

/// Size of the fixed header that precedes every frame's planes.
pub const FRAME_HEADER_LEN: usize = 20;

/// Decoded form of the 20-byte frame header.
///
/// Layout (big-endian):
/// ```text
/// 0      1         2..4   4..6    6..8  8..10 10..12 12..14  14..16    16..20
/// format mirrored  width  height  left  top   right  bottom  rotation  timestamp
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub format: u8,
    pub mirrored: bool,
    pub width: u16,
    pub height: u16,
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub rotation: u16,
    pub timestamp: u32,
}

impl FrameHeader {
    /// Decodes a header. Returns `None` unless `bytes` is exactly 20 bytes long.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; FRAME_HEADER_LEN] = bytes.try_into().ok()?;
        let u16_at = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);
        Some(Self {
            format: bytes[0],
            mirrored: bytes[1] != 0,
            width: u16_at(2),
            height: u16_at(4),
            left: u16_at(6),
            top: u16_at(8),
            right: u16_at(10),
            bottom: u16_at(12),
            rotation: u16_at(14),
            timestamp: u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        })
    }

    pub fn encode(&self) -> [u8; FRAME_HEADER_LEN] {
        let mut out = [0u8; FRAME_HEADER_LEN];
        out[0] = self.format;
        out[1] = u8::from(self.mirrored);
        for (i, value) in [
            self.width,
            self.height,
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.rotation,
        ]
        .into_iter()
        .enumerate()
        {
            out[2 + i * 2..4 + i * 2].copy_from_slice(&value.to_be_bytes());
        }
        out[16..20].copy_from_slice(&self.timestamp.to_be_bytes());
        out
    }
}

/// One frame as handed over by the native engine.
///
/// Buffers are borrowed from the engine for the duration of the delivery
/// callback and must not be retained. A `None` buffer means the engine
/// delivered the descriptor without that plane.
#[derive(Debug, Clone, Copy)]
pub struct FrameDescriptor<'a> {
    /// Raw stream type: 0 = local, 1 = remote, 2 = device test, 3 = video source.
    pub stream_type: u8,
    pub uid: u32,
    pub channel_id: &'a str,
    pub header: Option<&'a [u8]>,
    pub y_plane: Option<&'a [u8]>,
    pub u_plane: Option<&'a [u8]>,
    pub v_plane: Option<&'a [u8]>,
}

impl<'a> FrameDescriptor<'a> {
    /// Descriptor with every buffer present.
    pub fn new(
        stream_type: u8,
        uid: u32,
        channel_id: &'a str,
        header: &'a [u8],
        y_plane: &'a [u8],
        u_plane: &'a [u8],
        v_plane: &'a [u8],
    ) -> Self {
        Self {
            stream_type,
            uid,
            channel_id,
            header: Some(header),
            y_plane: Some(y_plane),
            u_plane: Some(u_plane),
            v_plane: Some(v_plane),
        }
    }
}

/// A validated frame, as seen by renderers.
///
/// The planes are the engine's buffers, shared read-only by every renderer
/// in a fan-out.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub slot: SlotKey,
    pub uid: u32,
    pub channel_id: &'a str,
    pub header: FrameHeader,
    pub y_plane: &'a [u8],
    pub u_plane: &'a [u8],
    pub v_plane: &'a [u8],
}
