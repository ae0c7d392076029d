use crate::models::config::GeometryCheck;
use crate::models::error::FrameRejection;
use crate::models::frame::{FrameHeader, FRAME_HEADER_LEN};

/// Pure geometric consistency check of an incoming frame's buffers.
///
/// Only observed buffer lengths are trusted. In `LengthRatio` mode the
/// width/height declared in the header are ignored, so a 4-byte Y plane with
/// 1-byte U and V planes passes; `Strict` mode closes that gap.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameValidator {
    geometry: GeometryCheck,
}

impl FrameValidator {
    pub fn new(geometry: GeometryCheck) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> GeometryCheck {
        self.geometry
    }

    /// Checks the buffers and returns the decoded header if they are consistent.
    pub fn check(
        &self,
        header: &[u8],
        y_plane: &[u8],
        u_plane: &[u8],
        v_plane: &[u8],
    ) -> Result<FrameHeader, FrameRejection> {
        let parsed =
            FrameHeader::parse(header).ok_or(FrameRejection::HeaderLength(header.len()))?;

        let (y_len, u_len, v_len) = (y_plane.len(), u_plane.len(), v_plane.len());

        // A plane exactly header-sized means the engine shifted buffers by one slot.
        if y_len == FRAME_HEADER_LEN || u_len == FRAME_HEADER_LEN {
            return Err(FrameRejection::MisShiftedPlane { y_len, u_len });
        }

        if y_len != 4 * u_len || u_len != v_len {
            return Err(FrameRejection::PlaneRatio {
                y_len,
                u_len,
                v_len,
            });
        }

        if self.geometry == GeometryCheck::Strict {
            let expected = parsed.width as usize * parsed.height as usize;
            if expected == 0 || y_len != expected {
                return Err(FrameRejection::Geometry {
                    width: parsed.width,
                    height: parsed.height,
                    y_len,
                });
            }
        }

        Ok(parsed)
    }

    /// Boolean form of [`check`](Self::check) for hosts that only need a
    /// yes/no answer; logs the offending lengths on rejection.
    ///
    /// The delivery gateway calls `check` instead, because it needs the
    /// decoded header and logs the rejection with the slot and channel.
    pub fn validate(&self, header: &[u8], y_plane: &[u8], u_plane: &[u8], v_plane: &[u8]) -> bool {
        match self.check(header, y_plane, u_plane, v_plane) {
            Ok(_) => true,
            Err(rejection) => {
                log::warn!("Dropping malformed frame: {}", rejection);
                false
            }
        }
    }
}
