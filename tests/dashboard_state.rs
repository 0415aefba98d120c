use std::time::{Duration, Instant};

use curvescope::analysis::AnalysisService;
use curvescope::config::EngineConfig;
use curvescope::dashboard::screenshot::{save_screenshot, to_rgba_image};
use curvescope::dashboard::DashboardState;
use curvescope::render::{RecordingSurface, Surface};
use curvescope::{ExportError, TimeRange};

fn small_config() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.generator.curve_count = 4;
    cfg.generator.points_per_curve = 100;
    cfg.generator.end_ms = Some(1_700_000_000_000);
    cfg.dashboard.tick_interval_ms = 1_000;
    cfg.dashboard.points_per_tick = 5;
    cfg.dashboard.retain_points = 102;
    cfg
}

fn offline(cfg: EngineConfig) -> DashboardState {
    DashboardState::with_analysis(cfg, AnalysisService::unavailable("offline test"))
}

#[test]
fn ticks_only_while_live_and_due() {
    let mut st = offline(small_config());
    let t0 = Instant::now();
    assert!(!st.tick(t0));
    assert_eq!(st.curves.curves()[0].len(), 100);

    st.set_live(true);
    assert!(st.tick(t0));
    assert!(!st.tick(t0 + Duration::from_millis(10)));
    assert!(st.tick(t0 + Duration::from_millis(1_000)));
    for c in &st.curves {
        assert_eq!(c.len(), 102);
        assert!(c.data.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}

#[test]
fn selectors_regenerate_the_curve_set() {
    let mut st = offline(small_config());
    st.viewport.zoom_in();
    let v0 = st.curves.version();

    st.set_curve_count(7);
    assert_eq!(st.curves.len(), 7);
    assert!(st.curves.version() > v0);
    assert_eq!(st.viewport.config.zoom_level, 1.0);

    let v1 = st.curves.version();
    st.set_curve_count(7);
    assert_eq!(st.curves.version(), v1);

    st.set_time_range(TimeRange::D30);
    let c = &st.curves.curves()[0];
    let span = c.last_timestamp().unwrap() - c.first_timestamp().unwrap();
    assert!(span > TimeRange::D7.duration_ms());
}

#[test]
fn visibility_toggles_produce_new_snapshots() {
    let mut st = offline(small_config());
    st.toggle_visibility("curve-2");
    assert_eq!(st.curves.visible_count(), 3);
    assert!(!st.curves.get("curve-2").unwrap().visible);
    st.set_all_visible(false);
    assert_eq!(st.curves.visible_count(), 0);
    st.set_all_visible(true);
    assert_eq!(st.curves.visible_count(), 4);
}

#[test]
fn analysis_errors_are_surfaced_not_fatal() {
    let mut st = offline(small_config());
    assert!(!st.analysis_ready());
    st.request_analysis(Instant::now(), None);
    assert!(st.analysis_error.as_deref().unwrap_or("").contains("offline test"));
    st.poll_analysis();
    assert!(st.current_stats().is_none());
}

#[test]
fn live_analysis_results_track_the_current_snapshot() {
    let mut st = DashboardState::new(small_config());
    let mut surface = RecordingSurface::new(640.0, 480.0);
    let metrics = st
        .engine
        .render(
            Some(&mut surface as &mut dyn Surface),
            &st.curves,
            &st.viewport.config,
            &st.flags,
        )
        .expect("pass ran");
    st.request_analysis(Instant::now(), Some(&metrics));

    let deadline = Instant::now() + Duration::from_secs(10);
    while st.current_stats().is_none() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        st.poll_analysis();
    }
    assert_eq!(st.current_stats().map(|s| s.total_curves), Some(4));

    st.toggle_visibility("curve-0");
    assert!(st.current_stats().is_none(), "stale statistics must be hidden");
}

fn quadrants(w: usize, h: usize) -> egui::ColorImage {
    let mut rgba = Vec::with_capacity(w * h * 4);
    for y in 0..h {
        for x in 0..w {
            let px = match (x < w / 2, y < h / 2) {
                (true, true) => [255, 0, 0, 255],
                (false, true) => [0, 255, 0, 255],
                (true, false) => [0, 0, 255, 255],
                (false, false) => [255, 255, 255, 255],
            };
            rgba.extend_from_slice(&px);
        }
    }
    egui::ColorImage::from_rgba_unmultiplied([w, h], &rgba)
}

#[test]
fn screenshot_is_cropped_to_the_chart_rect() {
    let shot = quadrants(200, 100);
    // right half in points at 2 pixels per point
    let chart = egui::Rect::from_min_max(egui::pos2(50.0, 0.0), egui::pos2(100.0, 50.0));
    let path = std::env::temp_dir().join(format!("curvescope-shot-{}.png", std::process::id()));
    let dims = save_screenshot(&shot, Some(chart), 2.0, &path).unwrap();
    assert_eq!(dims, (100, 100));

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (100, 100));
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(99, 99).0, [255, 255, 255, 255]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn full_frame_is_kept_without_a_region() {
    let img = to_rgba_image(&quadrants(8, 4), None, 1.0);
    assert_eq!(img.dimensions(), (8, 4));
    assert_eq!(img.get_pixel(0, 3).0, [0, 0, 255, 255]);
}

#[test]
fn empty_crop_is_an_export_error() {
    let outside = egui::Rect::from_min_max(egui::pos2(500.0, 0.0), egui::pos2(600.0, 10.0));
    let path = std::env::temp_dir().join("curvescope-never-written.png");
    assert!(matches!(
        save_screenshot(&quadrants(8, 4), Some(outside), 1.0, &path),
        Err(ExportError::Surface { width: 0, .. })
    ));
}
