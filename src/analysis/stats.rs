//! Aggregate statistics over a curve set.

use serde::{Deserialize, Serialize};

use crate::data::curve::{CurveData, Quality};
use crate::data::store::CurveSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCounts {
    pub good: usize,
    pub warning: usize,
    pub error: usize,
}

impl QualityCounts {
    fn add(&mut self, q: Quality) {
        match q {
            Quality::Good => self.good += 1,
            Quality::Warning => self.warning += 1,
            Quality::Error => self.error += 1,
        }
    }

    fn merge(&mut self, other: &QualityCounts) {
        self.good += other.good;
        self.warning += other.warning;
        self.error += other.error;
    }

    pub fn total(&self) -> usize {
        self.good + self.warning + self.error
    }
}

/// Per-curve summary. Value statistics skip non-finite samples and are `None`
/// when a curve has no finite value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub quality: QualityCounts,
}

impl CurveSummary {
    /// Fraction of samples flagged as errors, `0.0` for an empty curve.
    pub fn error_share(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.quality.error as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_curves: usize,
    pub visible_curves: usize,
    pub total_points: usize,
    pub visible_points: usize,
    pub quality: QualityCounts,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
    pub value_mean: Option<f64>,
    /// Earliest to latest timestamp across all curves.
    pub time_span_ms: Option<i64>,
    pub curves: Vec<CurveSummary>,
}

impl Statistics {
    pub fn hidden_curves(&self) -> usize {
        self.total_curves - self.visible_curves
    }
}

#[derive(Default)]
struct Accum {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accum {
    fn push(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        if self.count == 0 {
            self.min = v;
            self.max = v;
        } else {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
        self.sum += v;
        self.count += 1;
    }

    fn merge(&mut self, other: &Accum) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            self.min = other.min;
            self.max = other.max;
        } else {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
        self.sum += other.sum;
        self.count += other.count;
    }

    fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn summarize(curve: &CurveData) -> (CurveSummary, Accum) {
    let mut acc = Accum::default();
    let mut quality = QualityCounts::default();
    for p in &curve.data {
        acc.push(p.value);
        quality.add(p.quality);
    }
    let summary = CurveSummary {
        id: curve.id.clone(),
        name: curve.name.clone(),
        visible: curve.visible,
        count: curve.data.len(),
        min: acc.min(),
        max: acc.max(),
        mean: acc.mean(),
        quality,
    };
    (summary, acc)
}

pub fn compute_statistics(set: &CurveSet) -> Statistics {
    let mut stats = Statistics {
        total_curves: set.len(),
        ..Default::default()
    };
    let mut values = Accum::default();
    let mut t_min: Option<i64> = None;
    let mut t_max: Option<i64> = None;

    for curve in set {
        let (summary, acc) = summarize(curve);
        stats.total_points += summary.count;
        if curve.visible {
            stats.visible_curves += 1;
            stats.visible_points += summary.count;
        }
        stats.quality.merge(&summary.quality);
        values.merge(&acc);
        if let (Some(first), Some(last)) = (curve.first_timestamp(), curve.last_timestamp()) {
            t_min = Some(t_min.map_or(first, |t| t.min(first)));
            t_max = Some(t_max.map_or(last, |t| t.max(last)));
        }
        stats.curves.push(summary);
    }

    stats.value_min = values.min();
    stats.value_max = values.max();
    stats.value_mean = values.mean();
    stats.time_span_ms = t_min.zip(t_max).map(|(a, b)| b - a);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::data::curve::DataPoint;

    fn curve(id: &str, values: &[f64]) -> CurveData {
        let pts = values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(i as i64 * 1_000, *v))
            .collect();
        CurveData::new(id, id, Rgba::WHITE).with_points(pts)
    }

    #[test]
    fn aggregates_values_across_curves() {
        let set = CurveSet::new(vec![curve("a", &[1.0, 2.0, 3.0]), curve("b", &[-4.0, 8.0])]);
        let s = compute_statistics(&set);
        assert_eq!(s.total_points, 5);
        assert_eq!(s.value_min, Some(-4.0));
        assert_eq!(s.value_max, Some(8.0));
        assert_eq!(s.value_mean, Some(2.0));
        assert_eq!(s.time_span_ms, Some(2_000));
        assert_eq!(s.curves[1].mean, Some(2.0));
    }

    #[test]
    fn nan_is_skipped_in_value_stats() {
        let set = CurveSet::new(vec![curve("a", &[f64::NAN, 5.0])]);
        let s = compute_statistics(&set);
        assert_eq!(s.value_mean, Some(5.0));
        assert_eq!(s.curves[0].count, 2);
    }

    #[test]
    fn empty_set_has_no_value_stats() {
        let s = compute_statistics(&CurveSet::default());
        assert_eq!(s.total_curves, 0);
        assert!(s.value_min.is_none());
        assert!(s.time_span_ms.is_none());
    }
}
