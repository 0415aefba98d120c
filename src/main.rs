//! Dashboard binary. Usage: `curvescope-dashboard [config.yaml|config.json]`.

use curvescope::config::EngineConfig;
use curvescope::dashboard::run_dashboard;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("cannot load {path}: {e}; using defaults");
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };
    run_dashboard(cfg)
}
