//! `render-sim [SECONDS] [CONFIG.json]`
//!
//! Runs the synthetic source through a `VideoEngine` with headless
//! renderers, exercises the lifecycle calls while frames flow, and prints a
//! JSON report. Set `RUST_LOG=debug` to watch delivery.

use std::error::Error;
use std::thread;
use std::time::Duration;

use video_render_core::{
    ContentMode, InitOptions, RendererFactory, SlotKey, Surface, SurfaceId, VideoEngine,
    DEFAULT_CHANNEL,
};
use video_render_sim::{HeadlessBoard, SimConfig, SyntheticFrameSource};

const DEMO_CHANNEL: &str = "demo";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("render-sim failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let seconds: f64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 2.0,
    };
    let config = match args.next() {
        Some(path) => SimConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };
    let phase = Duration::from_secs_f64(seconds.max(0.0) / 2.0);

    let board = HeadlessBoard::new();
    // Only a software renderer exists here; GPU requests fall back to it.
    let factory = RendererFactory::new().with_software(board.constructor());
    let source = SyntheticFrameSource::new(config.source.clone())?;
    let mut engine = VideoEngine::new(source, factory, config.render.clone());

    engine.setup_local_video(Some(Surface::new(1, 640, 360)))?;
    engine.subscribe(1001, Surface::new(2, 320, 240), DEMO_CHANNEL)?;
    engine.setup_remote_video(
        1002,
        Some(Surface::new(3, 1280, 720)),
        DEMO_CHANNEL,
        InitOptions::append(),
    )?;
    engine.setup_remote_video(
        1002,
        Some(Surface::new(4, 200, 200)),
        DEMO_CHANNEL,
        InitOptions::append(),
    )?;
    engine.start()?;
    thread::sleep(phase);

    board.set_surface_size(SurfaceId(1), 1920, 1080);
    engine.resize_render(SlotKey::Local, DEFAULT_CHANNEL);
    engine.setup_view_content_mode(SlotKey::Remote(1002), ContentMode::Fit, DEMO_CHANNEL)?;
    engine.destroy_render_view(SlotKey::Remote(1002), DEMO_CHANNEL, &Surface::new(3, 0, 0))?;
    thread::sleep(phase);

    engine.stop()?;
    let report = serde_json::json!({
        "diagnostics": engine.diagnostics(),
        "renderers": board.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    engine.release()?;
    Ok(())
}
