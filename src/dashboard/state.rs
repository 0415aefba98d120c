//! Dashboard state, independent of the egui frame loop.
//!
//! Everything the shell does besides drawing widgets lives here: streaming
//! ticks, regeneration on time-range or curve-count changes, visibility
//! toggles, auto-optimize and analysis round trips.

use std::time::{Duration, Instant};

use crate::analysis::{AnalysisService, Pending, Statistics, Suggestion, Versioned};
use crate::config::{EngineConfig, EngineFlags, LodConfig};
use crate::data::generator::{generate_curves, generate_streaming_update_with, TimeRange};
use crate::data::store::CurveSet;
use crate::render::RenderEngine;
use crate::telemetry::PerformanceMetrics;
use crate::viewport::ViewportController;

/// Curve counts offered by the curve-count selector.
pub const CURVE_COUNT_CHOICES: [usize; 6] = [5, 20, 100, 500, 1_000, 5_000];

/// Next LOD hint given the median frame rate.
///
/// Below `low_fps` the hint drops to three quarters of its current value
/// (starting from `detail_target`), never below `min_degraded_target`. Above
/// `high_fps` it grows by a quarter and is removed once it reaches
/// `detail_target` again. In between the hint is kept.
pub fn adjust_lod_hint(
    current: Option<usize>,
    median_fps: Option<f64>,
    lod: &LodConfig,
    low_fps: f64,
    high_fps: f64,
) -> Option<usize> {
    let Some(fps) = median_fps else {
        return current;
    };
    if fps < low_fps {
        let base = current.unwrap_or(lod.detail_target);
        Some((base * 3 / 4).max(lod.min_degraded_target.max(1)))
    } else if fps > high_fps {
        let raised = current? * 5 / 4 + 1;
        (raised < lod.detail_target).then_some(raised)
    } else {
        current
    }
}

pub struct DashboardState {
    pub cfg: EngineConfig,
    pub curves: CurveSet,
    pub viewport: ViewportController,
    pub flags: EngineFlags,
    pub engine: RenderEngine,
    analysis: AnalysisService,
    pub live: bool,
    pub time_range: TimeRange,
    pub curve_count: usize,
    last_tick: Option<Instant>,
    last_analysis: Option<Instant>,
    pending_stats: Option<Pending<Versioned<Statistics>>>,
    pending_suggestions: Option<Pending<Versioned<Vec<Suggestion>>>>,
    pub stats: Option<Versioned<Statistics>>,
    pub suggestions: Option<Versioned<Vec<Suggestion>>>,
    pub analysis_error: Option<String>,
}

impl DashboardState {
    pub fn new(cfg: EngineConfig) -> Self {
        let analysis = AnalysisService::start_with(cfg.analysis.clone());
        Self::with_analysis(cfg, analysis)
    }

    /// Build around an existing analysis service.
    pub fn with_analysis(cfg: EngineConfig, mut analysis: AnalysisService) -> Self {
        analysis.set_flags(cfg.flags);
        let curves = generate_curves(&cfg.generator);
        log::info!(
            "generated {} curves x {} points ({})",
            cfg.generator.curve_count,
            cfg.generator.points_per_curve,
            cfg.generator.time_range
        );
        Self {
            curves,
            viewport: ViewportController::new(cfg.viewport),
            flags: cfg.flags,
            engine: RenderEngine::from_config(&cfg),
            live: cfg.dashboard.live,
            time_range: cfg.generator.time_range,
            curve_count: cfg.generator.curve_count,
            last_tick: None,
            last_analysis: None,
            pending_stats: None,
            pending_suggestions: None,
            stats: None,
            suggestions: None,
            analysis_error: None,
            analysis,
            cfg,
        }
    }

    pub fn analysis_ready(&self) -> bool {
        self.analysis.ready()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.cfg.dashboard.tick_interval_ms.max(1))
    }

    /// Append a streaming update when live and the tick interval elapsed.
    /// Returns whether the curve set changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.live {
            self.last_tick = None;
            return false;
        }
        let due = self
            .last_tick
            .is_none_or(|t| now.duration_since(t) >= self.tick_interval());
        if !due {
            return false;
        }
        self.last_tick = Some(now);
        self.stream_once();
        true
    }

    /// One streaming update followed by the retention trim.
    pub fn stream_once(&mut self) {
        let d = &self.cfg.dashboard;
        self.curves = generate_streaming_update_with(&self.curves, d.points_per_tick, &self.cfg.generator)
            .retain_last(d.retain_points);
    }

    pub fn set_live(&mut self, live: bool) {
        self.live = live;
    }

    fn regenerate(&mut self) {
        let mut gen = self.cfg.generator.clone();
        gen.time_range = self.time_range;
        gen.curve_count = self.curve_count;
        self.curves = generate_curves(&gen);
        self.viewport.reset();
        log::info!("regenerated {} curves over {}", gen.curve_count, gen.time_range);
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        if range != self.time_range {
            self.time_range = range;
            self.regenerate();
        }
    }

    pub fn set_curve_count(&mut self, count: usize) {
        if count != self.curve_count {
            self.curve_count = count;
            self.regenerate();
        }
    }

    pub fn toggle_visibility(&mut self, id: &str) {
        self.curves = self.curves.toggle_visibility(id);
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        self.curves = self.curves.with_all_visible(visible);
    }

    pub fn set_flags(&mut self, flags: EngineFlags) {
        if !flags.auto_optimize && self.flags.auto_optimize {
            self.engine.set_lod_hint(None);
        }
        self.flags = flags;
        self.analysis.set_flags(flags);
    }

    /// Feed the median frame rate back into the LOD hint when auto-optimize
    /// is on.
    pub fn auto_optimize(&mut self) {
        if !self.flags.auto_optimize {
            return;
        }
        let d = &self.cfg.dashboard;
        let before = self.engine.lod_hint();
        let after = adjust_lod_hint(
            before,
            self.engine.frame_clock().median_fps(),
            self.engine.lod_config(),
            d.auto_optimize_low_fps,
            d.auto_optimize_high_fps,
        );
        if after != before {
            log::debug!("auto-optimize: LOD hint {before:?} -> {after:?}");
            self.engine.set_lod_hint(after);
        }
    }

    /// Send statistics and suggestion requests for the current snapshot if
    /// the analysis interval elapsed and nothing is in flight.
    pub fn request_analysis(&mut self, now: Instant, metrics: Option<&PerformanceMetrics>) {
        let interval = Duration::from_millis(self.cfg.dashboard.analysis_interval_ms);
        if self.last_analysis.is_some_and(|t| now.duration_since(t) < interval) {
            return;
        }
        if self.pending_stats.is_some() || self.pending_suggestions.is_some() {
            return;
        }
        self.last_analysis = Some(now);
        match self.analysis.calculate_statistics(&self.curves) {
            Ok(p) => self.pending_stats = Some(p),
            Err(e) => {
                self.analysis_error = Some(e.to_string());
                return;
            }
        }
        if let Some(m) = metrics {
            match self.analysis.get_optimization_suggestions(&self.curves, m) {
                Ok(p) => self.pending_suggestions = Some(p),
                Err(e) => self.analysis_error = Some(e.to_string()),
            }
        }
    }

    /// Collect finished analysis results. Results for an older snapshot are
    /// kept only until a current one arrives.
    pub fn poll_analysis(&mut self) {
        if let Some(p) = &self.pending_stats {
            match p.try_take() {
                Ok(Some(v)) => {
                    if !v.is_current_for(&self.curves) {
                        log::trace!("statistics for version {} are stale", v.version);
                    }
                    self.stats = Some(v);
                    self.pending_stats = None;
                }
                Ok(None) => {}
                Err(e) => {
                    self.analysis_error = Some(e.to_string());
                    self.pending_stats = None;
                }
            }
        }
        if let Some(p) = &self.pending_suggestions {
            match p.try_take() {
                Ok(Some(v)) => {
                    self.suggestions = Some(v);
                    self.pending_suggestions = None;
                }
                Ok(None) => {}
                Err(e) => {
                    self.analysis_error = Some(e.to_string());
                    self.pending_suggestions = None;
                }
            }
        }
    }

    /// Statistics, if they describe the current snapshot.
    pub fn current_stats(&self) -> Option<&Statistics> {
        self.stats
            .as_ref()
            .filter(|v| v.is_current_for(&self.curves))
            .map(|v| &v.value)
    }

    pub fn current_suggestions(&self) -> Option<&[Suggestion]> {
        self.suggestions
            .as_ref()
            .filter(|v| v.is_current_for(&self.curves))
            .map(|v| v.value.as_slice())
    }

    pub fn clear_analysis_cache(&mut self) {
        if let Err(e) = self.analysis.clear_cache() {
            self.analysis_error = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lod() -> LodConfig {
        LodConfig::default()
    }

    #[test]
    fn low_fps_lowers_hint_from_detail_target() {
        let h = adjust_lod_hint(None, Some(20.0), &lod(), 30.0, 55.0);
        assert_eq!(h, Some(750));
    }

    #[test]
    fn hint_never_drops_below_floor() {
        let h = adjust_lod_hint(Some(55), Some(5.0), &lod(), 30.0, 55.0);
        assert_eq!(h, Some(50));
    }

    #[test]
    fn high_fps_raises_and_eventually_clears_hint() {
        let mut h = Some(100);
        for _ in 0..20 {
            h = adjust_lod_hint(h, Some(60.0), &lod(), 30.0, 55.0);
        }
        assert_eq!(h, None);
    }

    #[test]
    fn steady_fps_keeps_hint() {
        assert_eq!(adjust_lod_hint(Some(400), Some(40.0), &lod(), 30.0, 55.0), Some(400));
        assert_eq!(adjust_lod_hint(Some(400), None, &lod(), 30.0, 55.0), Some(400));
        assert_eq!(adjust_lod_hint(None, Some(60.0), &lod(), 30.0, 55.0), None);
    }
}
