use serde::{Deserialize, Serialize};

use super::error::RenderError;
use super::render_mode::{ContentMode, RenderMode};

/// How strictly the frame validator checks plane geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryCheck {
    /// Trust observed lengths only: Y must be 4x U, U must equal V.
    #[default]
    LengthRatio,
    /// Also require the Y plane to match the width and height in the header.
    Strict,
}

/// Configuration for a render session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfiguration {
    /// Renderer variant for new handles (default: GPU, falling back to software).
    pub render_mode: RenderMode,

    /// Content mode applied to every newly bound handle (default: cropped).
    pub content_mode: ContentMode,

    /// Frame geometry validation (default: length ratio only).
    pub geometry_check: GeometryCheck,
}

impl RenderConfiguration {
    /// Parses a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        serde_json::from_str(json)
            .map_err(|e| RenderError::ConfigurationFailed(format!("invalid config: {}", e)))
    }
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Gpu,
            content_mode: ContentMode::Cropped,
            geometry_check: GeometryCheck::LengthRatio,
        }
    }
}
