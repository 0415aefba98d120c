use curvescope::config::GeneratorConfig;
use curvescope::data::generator::{generate_curves, generate_streaming_update, DEFAULT_INTERVAL_MS};
use curvescope::{CurveData, CurveSet, DataPoint, Rgba, TimeRange};

fn seeded(curves: usize, points: usize) -> CurveSet {
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

fn strictly_increasing(c: &CurveData) -> bool {
    c.data.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}

#[test]
fn update_appends_points_with_increasing_timestamps() {
    let before = seeded(3, 100);
    let after = generate_streaming_update(&before, 5);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(new.len(), 105);
        assert!(strictly_increasing(new));
        assert_eq!(&new.data[..100], &old.data[..]);
        assert_eq!(new.data[100].timestamp, 100_000);
    }
}

#[test]
fn snapshots_are_immutable_and_versioned() {
    let before = seeded(2, 10);
    let after = generate_streaming_update(&before, 5);
    assert!(after.version() > before.version());
    assert_eq!(before.total_points(), 20);
    assert_eq!(after.total_points(), 30);
}

#[test]
fn trimming_keeps_the_newest_points() {
    let mut set = seeded(4, 100);
    for _ in 0..500 {
        set = generate_streaming_update(&set, 5);
    }
    let last_before_trim = set.curves()[0].last_timestamp();
    let trimmed = set.retain_last(2_000);
    for c in &trimmed {
        assert_eq!(c.len(), 2_000);
        assert!(strictly_increasing(c));
    }
    assert_eq!(trimmed.curves()[0].last_timestamp(), last_before_trim);
}

#[test]
fn empty_curve_starts_streaming() {
    let set = CurveSet::new(vec![CurveData::new("e", "E", Rgba::WHITE)]);
    let after = generate_streaming_update(&set, 3);
    let c = &after.curves()[0];
    assert_eq!(c.len(), 3);
    assert!(strictly_increasing(c));
    assert_eq!(c.data[1].timestamp - c.data[0].timestamp, DEFAULT_INTERVAL_MS);
}

#[test]
fn generator_is_deterministic_for_fixed_seed_and_end() {
    let cfg = GeneratorConfig {
        curve_count: 7,
        points_per_curve: 300,
        time_range: TimeRange::H6,
        end_ms: Some(1_700_000_000_000),
        ..Default::default()
    };
    let a = generate_curves(&cfg);
    let b = generate_curves(&cfg);
    assert_eq!(a.len(), 7);
    assert_eq!(a.curves(), b.curves());
    for c in &a {
        assert_eq!(c.len(), 300);
        assert!(strictly_increasing(c));
        assert_eq!(c.last_timestamp(), Some(1_700_000_000_000));
    }
    let first = &a.curves()[0];
    let span = first.last_timestamp().unwrap() - first.first_timestamp().unwrap();
    assert!(span <= TimeRange::H6.duration_ms());
    assert_eq!(a.curves()[1].id, "curve-1");
    assert_eq!(a.curves()[1].name, "Series 2");
}

#[test]
fn time_range_parses_selector_labels() {
    for r in TimeRange::ALL {
        assert_eq!(r.label().parse::<TimeRange>(), Ok(r));
    }
    assert_eq!(" 24H ".parse::<TimeRange>(), Ok(TimeRange::H24));
    assert!("2w".parse::<TimeRange>().is_err());
    assert_eq!(TimeRange::D7.duration_ms(), 7 * 24 * 3_600_000);
}
