use curvescope::config::LodConfig;
use curvescope::lod::{degraded_target, downsample, downsample_points, downsample_with, target_point_count, Decimation};
use curvescope::{CurveData, DataPoint, Rgba};

fn wave(n: usize) -> CurveData {
    let pts = (0..n)
        .map(|i| DataPoint::new(i as i64 * 1_000, (i as f64 * 0.01).sin() * 10.0))
        .collect();
    CurveData::new("w", "Wave", Rgba::from_rgb(1, 2, 3))
        .with_unit("ms")
        .with_points(pts)
}

#[test]
fn never_exceeds_target() {
    for n in [0, 1, 2, 3, 10, 999, 1_000, 1_001, 2_000, 12_345] {
        let c = wave(n);
        for target in [1, 2, 3, 7, 50, 500, 1_000, 5_000] {
            for strategy in Decimation::ALL {
                let out = downsample_with(&c, target, strategy);
                assert!(
                    out.len() <= target.max(1),
                    "{strategy:?} n={n} target={target} got {}",
                    out.len()
                );
            }
        }
    }
}

#[test]
fn short_curves_are_returned_unchanged() {
    let c = wave(800);
    let out = downsample(&c, 1_000);
    assert_eq!(out, c);
    let borrowed = downsample_points(&c.data, 800, Decimation::Lttb);
    assert!(matches!(borrowed, std::borrow::Cow::Borrowed(_)));
}

#[test]
fn larger_target_never_yields_fewer_points() {
    let c = wave(10_000);
    let mut prev = 0;
    for target in [10, 50, 100, 333, 1_000, 2_500, 9_999, 10_000] {
        let len = downsample(&c, target).len();
        assert!(len >= prev, "target {target}: {len} < {prev}");
        prev = len;
    }
}

#[test]
fn styling_survives_reduction() {
    let c = wave(5_000);
    let out = downsample_with(&c, 100, Decimation::MinMax);
    assert_eq!(out.id, c.id);
    assert_eq!(out.color, c.color);
    assert_eq!(out.unit.as_deref(), Some("ms"));
    assert!(out.data.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn lttb_keeps_endpoints() {
    let c = wave(3_000);
    let out = downsample_with(&c, 64, Decimation::Lttb);
    assert_eq!(out.len(), 64);
    assert_eq!(out.data.first(), c.data.first());
    assert_eq!(out.data.last(), c.data.last());
}

#[test]
fn target_grows_with_zoom_within_limits() {
    let cfg = LodConfig::default();
    assert_eq!(target_point_count(0.5, &cfg), cfg.coarse_target);
    assert_eq!(target_point_count(f64::NAN, &cfg), cfg.coarse_target);
    assert_eq!(target_point_count(1.0, &cfg), cfg.detail_target);
    assert_eq!(target_point_count(4.0, &cfg), 4 * cfg.detail_target);
    assert_eq!(target_point_count(1e6, &cfg), cfg.max_target);
}

#[test]
fn degradation_is_proportional_with_floor() {
    assert_eq!(degraded_target(1_000, 500, 1_000, 50), 1_000);
    assert_eq!(degraded_target(1_000, 2_000, 1_000, 50), 500);
    assert_eq!(degraded_target(1_000, 10_000, 1_000, 50), 100);
    assert_eq!(degraded_target(1_000, 1_000_000, 1_000, 50), 50);
    assert_eq!(degraded_target(1_000, 5_000, 0, 50), 1_000);
}
