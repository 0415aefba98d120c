//! Per-pass performance telemetry.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Number of inter-frame deltas kept for the median estimate.
pub const FPS_WINDOW: usize = 10;

/// Snapshot produced by every completed render pass. Observational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock duration of the pass.
    pub render_time_ms: f64,
    /// Points that ended up in curve paths after LOD and culling.
    pub visible_point_count: usize,
    pub total_curve_count: usize,
    /// Best-effort estimate of the curve data footprint.
    pub memory_usage_mb: Option<f64>,
    /// Single-sample rate from the delta to the previous completed pass.
    pub fps: f64,
}

/// Tracks pass completion times.
///
/// [`PerformanceMetrics::fps`] is the single-sample value returned by
/// [`complete`](Self::complete); [`median_fps`](Self::median_fps) is the
/// steadier median over the last [`FPS_WINDOW`] deltas and is what automatic
/// quality adaptation should read.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_completed: Option<Instant>,
    deltas_ms: VecDeque<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed pass and return the single-sample fps (0 for the
    /// first pass).
    pub fn complete(&mut self, now: Instant) -> f64 {
        let fps = match self.last_completed {
            Some(prev) => {
                let delta_ms = now.saturating_duration_since(prev).as_secs_f64() * 1_000.0;
                if self.deltas_ms.len() == FPS_WINDOW {
                    self.deltas_ms.pop_front();
                }
                self.deltas_ms.push_back(delta_ms);
                fps_from_delta(delta_ms)
            }
            None => 0.0,
        };
        self.last_completed = Some(now);
        fps
    }

    /// Median fps over the retained deltas; `None` before two passes completed.
    pub fn median_fps(&self) -> Option<f64> {
        if self.deltas_ms.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.deltas_ms.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        Some(fps_from_delta(median))
    }

    pub fn reset(&mut self) {
        self.last_completed = None;
        self.deltas_ms.clear();
    }
}

fn fps_from_delta(delta_ms: f64) -> f64 {
    if delta_ms > 0.0 {
        1_000.0 / delta_ms
    } else {
        0.0
    }
}

pub(crate) fn bytes_to_mb(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_pass_has_no_rate() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.complete(Instant::now()), 0.0);
        assert_eq!(clock.median_fps(), None);
    }

    #[test]
    fn single_sample_and_median_differ_on_outliers() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.complete(t0);
        let mut t = t0;
        for _ in 0..9 {
            t += Duration::from_millis(20);
            clock.complete(t);
        }
        t += Duration::from_millis(200);
        let fps = clock.complete(t);
        assert!((fps - 5.0).abs() < 1e-6);
        let median = clock.median_fps().unwrap();
        assert!((median - 50.0).abs() < 1e-6, "median = {median}");
    }
}
