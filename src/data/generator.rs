//! Synthetic curve data for demos and load tests.
//!
//! The generator is the only data source when no live telemetry feed is
//! attached. It is deterministic for a given seed so load tests are
//! reproducible, and it never trims: retention is the caller's decision
//! (see [`CurveSet::retain_last`]).

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::alloc_color;
use crate::config::GeneratorConfig;
use crate::data::curve::{CurveData, DataPoint, Quality};
use crate::data::store::CurveSet;

/// Interval used when a curve has fewer than two points to infer one from.
pub const DEFAULT_INTERVAL_MS: i64 = 1_000;

/// Query window offered by the host's time-range selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "30d")]
    D30,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::H1,
        TimeRange::H6,
        TimeRange::H24,
        TimeRange::D7,
        TimeRange::D30,
    ];

    pub fn duration_ms(self) -> i64 {
        const HOUR: i64 = 60 * 60 * 1_000;
        match self {
            TimeRange::H1 => HOUR,
            TimeRange::H6 => 6 * HOUR,
            TimeRange::H24 => 24 * HOUR,
            TimeRange::D7 => 7 * 24 * HOUR,
            TimeRange::D30 => 30 * 24 * HOUR,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::H1 => "1h",
            TimeRange::H6 => "6h",
            TimeRange::H24 => "24h",
            TimeRange::D7 => "7d",
            TimeRange::D30 => "30d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown time range '{s}', expected one of 1h|6h|24h|7d|30d"))
    }
}

/// xorshift64* generator; enough entropy for plausible-looking noise.
#[derive(Debug, Clone)]
struct Noise(u64);

impl Noise {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self((seed ^ 0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-1, 1)`.
    fn signed(&mut self) -> f64 {
        self.unit() * 2.0 - 1.0
    }

    fn quality(&mut self, warning_rate: f64, error_rate: f64) -> Quality {
        let r = self.unit();
        if r < error_rate {
            Quality::Error
        } else if r < error_rate + warning_rate {
            Quality::Warning
        } else {
            Quality::Good
        }
    }
}

fn hash_id(id: &str) -> u64 {
    // FNV-1a
    id.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Shape parameters of one synthetic series.
struct Waveform {
    base: f64,
    amplitude: f64,
    period_ms: f64,
    phase: f64,
    drift_per_ms: f64,
    noise: f64,
}

impl Waveform {
    fn random(rng: &mut Noise, span_ms: i64) -> Self {
        let span = span_ms.max(1) as f64;
        Self {
            base: 20.0 + rng.unit() * 60.0,
            amplitude: 2.0 + rng.unit() * 18.0,
            period_ms: span / (1.0 + rng.unit() * 6.0),
            phase: rng.unit() * TAU,
            drift_per_ms: rng.signed() * 10.0 / span,
            noise: 0.5 + rng.unit() * 2.0,
        }
    }

    fn sample(&self, rng: &mut Noise, t_rel_ms: f64) -> f64 {
        self.base
            + self.amplitude * (TAU * t_rel_ms / self.period_ms + self.phase).sin()
            + self.drift_per_ms * t_rel_ms
            + self.noise * rng.signed()
    }
}

/// Generate `curve_count` curves of `points_per_curve` samples spread evenly
/// over the configured time range, ending at `end_ms` (or now).
pub fn generate_curves(cfg: &GeneratorConfig) -> CurveSet {
    let end_ms = cfg
        .end_ms
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let span_ms = cfg.time_range.duration_ms();
    let n = cfg.points_per_curve;
    let interval = if n > 1 {
        (span_ms / (n as i64 - 1)).max(1)
    } else {
        DEFAULT_INTERVAL_MS
    };
    let start_ms = end_ms - interval * (n.saturating_sub(1) as i64);

    let curves = (0..cfg.curve_count)
        .map(|i| {
            let mut rng = Noise::new(cfg.seed.wrapping_add(i as u64 * 0x1000_0001));
            let wave = Waveform::random(&mut rng, span_ms);
            let data = (0..n)
                .map(|k| {
                    let t_rel = (k as i64 * interval) as f64;
                    DataPoint::with_quality(
                        start_ms + k as i64 * interval,
                        wave.sample(&mut rng, t_rel),
                        rng.quality(cfg.warning_rate, cfg.error_rate),
                    )
                })
                .collect();
            CurveData::new(format!("curve-{i}"), format!("Series {}", i + 1), alloc_color(i))
                .with_unit(if i % 3 == 0 { "%" } else { "ms" })
                .with_points(data)
        })
        .collect();
    CurveSet::new(curves)
}

/// Append `points_per_tick` samples to the tail of every curve.
///
/// Timestamps continue from each curve's last sample at its last observed
/// interval, so they stay strictly increasing. Values random-walk from the
/// last value. Nothing is trimmed.
pub fn generate_streaming_update(curves: &CurveSet, points_per_tick: usize) -> CurveSet {
    let defaults = GeneratorConfig::default();
    generate_streaming_update_with(curves, points_per_tick, &defaults)
}

/// Like [`generate_streaming_update`] with explicit quality rates and seed.
pub fn generate_streaming_update_with(
    curves: &CurveSet,
    points_per_tick: usize,
    cfg: &GeneratorConfig,
) -> CurveSet {
    if points_per_tick == 0 {
        return curves.map_curves(|_| {});
    }
    curves.map_curves(|curve| {
        let interval = last_interval(curve);
        let (mut t, mut v) = match curve.data.last() {
            Some(p) => (p.timestamp, p.value),
            None => (
                cfg.end_ms
                    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
                    - interval,
                50.0,
            ),
        };
        let seed = cfg.seed ^ hash_id(&curve.id) ^ (t as u64).rotate_left(17);
        let mut rng = Noise::new(seed);
        let step_scale = (v.abs() * 0.02).max(0.5);
        curve.data.reserve(points_per_tick);
        for _ in 0..points_per_tick {
            t += interval;
            v += step_scale * rng.signed();
            let q = rng.quality(cfg.warning_rate, cfg.error_rate);
            curve.data.push(DataPoint::with_quality(t, v, q));
        }
    })
}

fn last_interval(curve: &CurveData) -> i64 {
    match curve.data.as_slice() {
        [.., a, b] if b.timestamp > a.timestamp => b.timestamp - a.timestamp,
        _ => DEFAULT_INTERVAL_MS,
    }
}
