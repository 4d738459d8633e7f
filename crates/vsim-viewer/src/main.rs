mod app;

use vsim_engine::device::GpuInit;
use vsim_engine::logging::{init_logging, LoggingConfig};
use vsim_engine::window::{Runtime, RuntimeConfig};
use vsim_world::WorldConfig;

use crate::app::ViewerApp;

fn main() {
    init_logging(LoggingConfig::default());

    let mut world = WorldConfig::default();
    let mut gpu = GpuInit::default();
    apply_env(&mut world, &mut gpu);

    let config = RuntimeConfig {
        title: "vsim".to_string(),
        ..RuntimeConfig::default()
    };
    let app = ViewerApp::new(config.title.clone(), world);

    if let Err(e) = Runtime::run(config, gpu, app) {
        log::error!("vsim runtime error: {e:#}");
        std::process::exit(1);
    }
}

/// `VSIM_RAIN_COUNT` sets the number of rain drops, `VSIM_DEBUG_GPU` (0/1)
/// forces the validation layer off or on.
fn apply_env(world: &mut WorldConfig, gpu: &mut GpuInit) {
    if let Ok(raw) = std::env::var("VSIM_RAIN_COUNT") {
        match raw.trim().parse::<usize>() {
            Ok(count) => world.rain.count = count,
            Err(e) => log::warn!("ignoring VSIM_RAIN_COUNT={raw:?}: {e}"),
        }
    }

    if let Ok(raw) = std::env::var("VSIM_DEBUG_GPU") {
        match parse_flag(&raw) {
            Some(debug) => gpu.debug = debug,
            None => log::warn!("ignoring VSIM_DEBUG_GPU={raw:?}: expected 0 or 1"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
