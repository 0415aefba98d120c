//! Time repeated render passes at scale, with and without performance mode.
//!
//! `cargo run --release --example stress -- [curves] [points] [passes]`

use std::time::Instant;

use curvescope::config::{EngineFlags, GeneratorConfig};
use curvescope::data::generator::generate_curves;
use curvescope::render::{NullSurface, RenderEngine, Surface};
use curvescope::viewport::ViewportConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut args = std::env::args().skip(1);
    let curve_count: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(10_000);
    let points_per_curve: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(1_000);
    let passes: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5);

    let started = Instant::now();
    let curves = generate_curves(&GeneratorConfig {
        curve_count,
        points_per_curve,
        end_ms: Some(0),
        ..Default::default()
    });
    println!(
        "generated {} x {} in {:.0} ms",
        curve_count,
        points_per_curve,
        started.elapsed().as_secs_f64() * 1_000.0
    );

    let mut surface = NullSurface::new(1920.0, 1080.0);
    for perf in [true, false] {
        let flags = EngineFlags {
            enable_performance_mode: perf,
            ..Default::default()
        };
        let mut engine = RenderEngine::default();
        let mut worst = 0.0f64;
        let mut drawn = 0;
        for _ in 0..passes {
            if let Some(m) = engine.render(
                Some(&mut surface as &mut dyn Surface),
                &curves,
                &ViewportConfig::default(),
                &flags,
            ) {
                worst = worst.max(m.render_time_ms);
                drawn = m.visible_point_count;
            }
        }
        println!(
            "performance_mode={perf}: worst pass {worst:.1} ms, {drawn} points drawn, median fps {:?}",
            engine.frame_clock().median_fps()
        );
    }
    Ok(())
}
