//! Render a synthetic curve set offscreen and write it as PNG.
//!
//! `cargo run --example render_png -- [out.png] [curves] [points]`

use curvescope::config::{EngineConfig, GeneratorConfig};
use curvescope::data::generator::{generate_curves, TimeRange};
use curvescope::render::{PixmapSurface, RenderEngine, Surface};
use curvescope::viewport::ViewportConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let out = args.next().unwrap_or_else(|| "curves.png".to_string());
    let curve_count: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(12);
    let points_per_curve: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(2_000);

    let cfg = EngineConfig::default();
    let curves = generate_curves(&GeneratorConfig {
        curve_count,
        points_per_curve,
        time_range: TimeRange::H6,
        ..cfg.generator.clone()
    });

    let mut surface = PixmapSurface::new(1280, 720, 2.0)?;
    let mut engine = RenderEngine::from_config(&cfg);
    let metrics = engine
        .render(
            Some(&mut surface as &mut dyn Surface),
            &curves,
            &ViewportConfig::default(),
            &cfg.flags,
        )
        .ok_or("surface was not drawable")?;
    surface.save_png(&out)?;

    println!(
        "{} curves, {} points drawn in {:.2} ms -> {out}",
        metrics.total_curve_count, metrics.visible_point_count, metrics.render_time_ms
    );
    Ok(())
}
