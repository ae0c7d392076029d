//! # video-render-sim
//!
//! Desktop harness for `video-render-core`: a threaded synthetic frame
//! source standing in for the native engine, and a headless renderer that
//! records what each surface would have shown.

pub mod headless_renderer;
pub mod synthetic_source;

use serde::{Deserialize, Serialize};
use video_render_core::{RenderConfiguration, RenderError};

pub use headless_renderer::{HeadlessBoard, HeadlessRenderer, SurfaceStats};
pub use synthetic_source::{SyntheticFrame, SyntheticFrameSource, SyntheticSourceConfig};

/// Configuration file for the `render-sim` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub source: SyntheticSourceConfig,
    pub render: RenderConfiguration,
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RenderError::ConfigurationFailed(format!("invalid config: {}", e)))?;
        config
            .source
            .validate()
            .map_err(RenderError::ConfigurationFailed)?;
        Ok(config)
    }
}
