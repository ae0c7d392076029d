use serde::{Deserialize, Serialize};

/// Renderer variant used for newly created renderer handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// GPU-accelerated drawing (e.g. a GL or wgpu texture upload).
    #[default]
    Gpu,
    /// CPU blit into the surface.
    Software,
    /// Application-supplied renderer.
    Custom,
}

impl RenderMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::Gpu),
            2 => Some(Self::Software),
            3 => Some(Self::Custom),
            _ => None,
        }
    }
}

/// How a frame is fitted into a surface whose aspect ratio differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Scale to cover the whole surface, cropping the overflow.
    #[default]
    Cropped,
    /// Scale to fit inside the surface, letterboxing the remainder.
    Fit,
}

impl ContentMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Cropped),
            1 => Some(Self::Fit),
            _ => None,
        }
    }

    /// Destination rectangle of a `frame_w` x `frame_h` frame inside a
    /// `surface_w` x `surface_h` surface, centered.
    ///
    /// In `Cropped` mode the rectangle may extend past the surface edges
    /// (negative origin). Degenerate sizes yield an empty rectangle.
    pub fn layout(self, frame_w: u32, frame_h: u32, surface_w: u32, surface_h: u32) -> ViewRect {
        if frame_w == 0 || frame_h == 0 || surface_w == 0 || surface_h == 0 {
            return ViewRect::default();
        }

        let sx = surface_w as f32 / frame_w as f32;
        let sy = surface_h as f32 / frame_h as f32;
        let scale = match self {
            Self::Cropped => sx.max(sy),
            Self::Fit => sx.min(sy),
        };

        let width = frame_w as f32 * scale;
        let height = frame_h as f32 * scale;
        ViewRect {
            x: (surface_w as f32 - width) / 2.0,
            y: (surface_h as f32 - height) / 2.0,
            width,
            height,
        }
    }
}

/// Placement of a frame inside a surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}
