use std::time::Duration;

use curvescope::analysis::{AnalysisService, SuggestionKind};
use curvescope::config::{AnalysisConfig, EngineFlags};
use curvescope::{AnalysisError, CurveData, CurveSet, DataPoint, PerformanceMetrics, Quality, Rgba};

const WAIT: Duration = Duration::from_secs(10);

fn set_of(curves: usize, points: usize) -> CurveSet {
    CurveSet::new(
        (0..curves)
            .map(|i| {
                CurveData::new(format!("c{i}"), format!("C{i}"), Rgba::WHITE).with_points(
                    (0..points)
                        .map(|k| DataPoint::new(k as i64 * 1_000, k as f64))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn calm_metrics() -> PerformanceMetrics {
    PerformanceMetrics {
        render_time_ms: 3.0,
        visible_point_count: 100,
        total_curve_count: 1,
        memory_usage_mb: Some(0.5),
        fps: 60.0,
    }
}

#[test]
fn statistics_round_trip_is_tagged_with_version() {
    let svc = AnalysisService::start();
    assert!(svc.ready());
    let set = set_of(3, 11).with_visibility("c2", false);
    let res = svc.calculate_statistics(&set).unwrap().wait(WAIT).unwrap();

    assert!(res.is_current_for(&set));
    let s = &res.value;
    assert_eq!(s.total_curves, 3);
    assert_eq!(s.visible_curves, 2);
    assert_eq!(s.total_points, 33);
    assert_eq!(s.visible_points, 22);
    assert_eq!(s.value_min, Some(0.0));
    assert_eq!(s.value_max, Some(10.0));
    assert_eq!(s.value_mean, Some(5.0));
    assert_eq!(s.time_span_ms, Some(10_000));
    assert_eq!(s.quality.good, 33);
}

#[test]
fn results_for_an_older_snapshot_are_stale() {
    let svc = AnalysisService::start();
    let old = set_of(2, 5);
    let pending = svc.calculate_statistics(&old).unwrap();
    let newer = old.toggle_visibility("c0");
    let res = pending.wait(WAIT).unwrap();
    assert!(res.is_current_for(&old));
    assert!(!res.is_current_for(&newer));
}

#[test]
fn repeated_requests_return_identical_statistics() {
    let svc = AnalysisService::start_with(AnalysisConfig {
        cache_capacity: 2,
        ..Default::default()
    });
    let set = set_of(4, 50);
    let a = svc.calculate_statistics(&set).unwrap().wait(WAIT).unwrap();
    let b = svc.calculate_statistics(&set).unwrap().wait(WAIT).unwrap();
    assert_eq!(a, b);
    svc.clear_cache().unwrap();
    let c = svc.calculate_statistics(&set).unwrap().wait(WAIT).unwrap();
    assert_eq!(a, c);
}

#[test]
fn try_take_eventually_yields_the_result() {
    let svc = AnalysisService::start();
    let pending = svc.calculate_statistics(&set_of(1, 3)).unwrap();
    let mut got = None;
    for _ in 0..1_000 {
        if let Some(v) = pending.try_take().unwrap() {
            got = Some(v);
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(got.map(|v| v.value.total_points), Some(3));
}

#[test]
fn suggestions_flag_too_many_curves() {
    let mut svc = AnalysisService::start();
    svc.set_flags(EngineFlags {
        max_curves: 10,
        ..Default::default()
    });
    let set = set_of(25, 2);
    let res = svc
        .get_optimization_suggestions(&set, &calm_metrics())
        .unwrap()
        .wait(WAIT)
        .unwrap();
    assert!(res.is_current_for(&set));
    assert!(res
        .value
        .iter()
        .any(|s| s.kind == SuggestionKind::TooManyCurves));
}

#[test]
fn suggestions_flag_error_heavy_and_hidden_curves() {
    let svc = AnalysisService::start();
    let noisy = CurveData::new("bad", "Bad", Rgba::WHITE).with_points(
        (0..10)
            .map(|k| {
                let q = if k < 5 { Quality::Error } else { Quality::Good };
                DataPoint::with_quality(k, 1.0, q)
            })
            .collect(),
    );
    let mut curves = set_of(3, 2).to_vec();
    curves.push(noisy);
    let set = CurveSet::new(curves)
        .with_visibility("c0", false)
        .with_visibility("c1", false)
        .with_visibility("c2", false);
    let res = svc
        .get_optimization_suggestions(&set, &calm_metrics())
        .unwrap()
        .wait(WAIT)
        .unwrap();
    let kinds: Vec<_> = res.value.iter().map(|s| s.kind.clone()).collect();
    assert!(kinds.contains(&SuggestionKind::ErrorHeavyCurve("bad".into())), "{kinds:?}");
    assert!(kinds.contains(&SuggestionKind::HiddenCurvesInMemory), "{kinds:?}");
}

#[test]
fn unavailable_service_fails_fast() {
    let svc = AnalysisService::unavailable("no threads in this sandbox");
    assert!(!svc.ready());
    match svc.calculate_statistics(&set_of(1, 1)) {
        Err(AnalysisError::Unavailable(reason)) => assert!(reason.contains("sandbox")),
        other => panic!("expected Unavailable, got {other:?}"),
    }
    assert!(matches!(
        svc.get_optimization_suggestions(&set_of(1, 1), &calm_metrics()),
        Err(AnalysisError::Unavailable(_))
    ));
    assert!(matches!(svc.clear_cache(), Err(AnalysisError::Unavailable(_))));
}
