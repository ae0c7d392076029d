use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-assigned identity of a presentation surface (a window, a canvas, a view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// A presentation surface a renderer can bind to.
///
/// Identity is the `id`; the size is whatever the host reported last and is
/// what renderers re-read on `refresh_canvas`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Surface {
    pub id: SurfaceId,
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self {
            id: SurfaceId(id),
            width,
            height,
        }
    }

    /// Whether both values describe the same host surface, regardless of size.
    pub fn same_as(&self, other: &Surface) -> bool {
        self.id == other.id
    }
}
