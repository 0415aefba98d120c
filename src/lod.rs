//! Level-of-detail reduction for curves.
//!
//! All strategies share one contract: a curve already at or below the target
//! size is returned untouched, otherwise at most `max(target, 1)` samples are
//! kept, first sample included. Stride sampling is the default because it is
//! the cheapest; `MinMax` and `Lttb` keep transient spikes visible at a higher
//! cost.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::LodConfig;
use crate::data::curve::{CurveData, DataPoint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decimation {
    /// Keep every `floor(len / target)`-th sample.
    #[default]
    Stride,
    /// Keep the minimum and maximum of each bucket, in time order.
    MinMax,
    /// Largest-Triangle-Three-Buckets.
    Lttb,
}

impl Decimation {
    pub const ALL: [Decimation; 3] = [Decimation::Stride, Decimation::MinMax, Decimation::Lttb];

    pub fn label(self) -> &'static str {
        match self {
            Decimation::Stride => "Stride",
            Decimation::MinMax => "Min/Max",
            Decimation::Lttb => "LTTB",
        }
    }
}

/// Stride-sample `curve` down to roughly `target` points.
pub fn downsample(curve: &CurveData, target: usize) -> CurveData {
    downsample_with(curve, target, Decimation::Stride)
}

/// Reduce `curve` with the given strategy. Styling and metadata are kept.
pub fn downsample_with(curve: &CurveData, target: usize, strategy: Decimation) -> CurveData {
    match downsample_points(&curve.data, target, strategy) {
        Cow::Borrowed(_) => curve.clone(),
        Cow::Owned(data) => curve.with_data_replaced(data),
    }
}

/// Reduce a point slice. Borrows when no reduction is needed.
pub fn downsample_points(
    points: &[DataPoint],
    target: usize,
    strategy: Decimation,
) -> Cow<'_, [DataPoint]> {
    let target = target.max(1);
    if points.len() <= target {
        return Cow::Borrowed(points);
    }
    let reduced = match strategy {
        Decimation::Stride => stride(points, target),
        Decimation::MinMax if target >= 2 => min_max(points, target),
        Decimation::Lttb if target >= 3 => lttb(points, target),
        _ => stride(points, target),
    };
    Cow::Owned(reduced)
}

fn stride(points: &[DataPoint], target: usize) -> Vec<DataPoint> {
    let step = (points.len() / target).max(1);
    points.iter().step_by(step).take(target).copied().collect()
}

fn min_max(points: &[DataPoint], target: usize) -> Vec<DataPoint> {
    let buckets = target / 2;
    let bucket_len = points.len().div_ceil(buckets);
    let mut out = Vec::with_capacity(target);
    for bucket in points.chunks(bucket_len) {
        let mut lo = 0;
        let mut hi = 0;
        for (i, p) in bucket.iter().enumerate() {
            if p.value < bucket[lo].value {
                lo = i;
            }
            if p.value > bucket[hi].value {
                hi = i;
            }
        }
        match lo.cmp(&hi) {
            std::cmp::Ordering::Less => out.extend([bucket[lo], bucket[hi]]),
            std::cmp::Ordering::Greater => out.extend([bucket[hi], bucket[lo]]),
            std::cmp::Ordering::Equal => out.push(bucket[lo]),
        }
    }
    out
}

fn lttb(points: &[DataPoint], target: usize) -> Vec<DataPoint> {
    let len = points.len();
    let every = (len - 2) as f64 / (target - 2) as f64;
    let xy = |p: &DataPoint| (p.timestamp as f64, p.value);

    let mut out = Vec::with_capacity(target);
    out.push(points[0]);
    let mut a = 0usize;
    for i in 0..target - 2 {
        let start = (i as f64 * every).floor() as usize + 1;
        let end = (((i + 1) as f64 * every).floor() as usize + 1).min(len - 1);

        let next_start = end;
        let next_end = (((i + 2) as f64 * every).floor() as usize + 1).min(len);
        let (avg_x, avg_y) = if next_start < next_end {
            let n = (next_end - next_start) as f64;
            let (sx, sy) = points[next_start..next_end]
                .iter()
                .map(xy)
                .fold((0.0, 0.0), |acc, (x, y)| (acc.0 + x, acc.1 + y));
            (sx / n, sy / n)
        } else {
            xy(&points[len - 1])
        };

        let (ax, ay) = xy(&points[a]);
        let mut best = start;
        let mut best_area = -1.0f64;
        for (j, p) in points.iter().enumerate().take(end.max(start + 1)).skip(start) {
            let (bx, by) = xy(p);
            let area = ((ax - avg_x) * (by - ay) - (ax - bx) * (avg_y - ay)).abs();
            if area > best_area {
                best_area = area;
                best = j;
            }
        }
        out.push(points[best]);
        a = best;
    }
    out.push(points[len - 1]);
    out
}

/// Per-curve target point count for a zoom level: coarse when zoomed out,
/// growing with zoom when zoomed in.
pub fn target_point_count(zoom_level: f64, cfg: &LodConfig) -> usize {
    if zoom_level.is_nan() || zoom_level < 1.0 {
        return cfg.coarse_target.min(cfg.detail_target).max(1);
    }
    let scaled = (cfg.detail_target as f64 * zoom_level).round();
    (scaled as usize).clamp(cfg.detail_target.max(1), cfg.max_target.max(cfg.detail_target).max(1))
}

/// Shrink `target` proportionally when more curves are visible than
/// `max_curves`, never going below `floor`.
pub fn degraded_target(target: usize, visible_curves: usize, max_curves: usize, floor: usize) -> usize {
    if max_curves == 0 || visible_curves <= max_curves {
        return target;
    }
    let scaled = (target as f64 * max_curves as f64 / visible_curves as f64) as usize;
    scaled.max(floor).min(target).max(1)
}
