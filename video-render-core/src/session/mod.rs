pub mod engine;
pub mod gateway;
pub mod render_session;
