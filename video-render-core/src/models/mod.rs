pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod render_mode;
pub mod slot;
pub mod surface;
