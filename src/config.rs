//! Configuration types shared by the engine, the analysis worker and the dashboard.
//!
//! Every section has sensible defaults, so a configuration file only needs to
//! mention the values it overrides. Files are read as YAML or JSON depending on
//! their extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::ChartColors;
use crate::data::generator::TimeRange;
use crate::error::ConfigError;
use crate::lod::Decimation;

// ─────────────────────────────────────────────────────────────────────────────
// Behavioural flags (the host-facing input contract)
// ─────────────────────────────────────────────────────────────────────────────

/// Behavioural switches the host hands to the engine alongside the curve set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineFlags {
    /// Route every curve through LOD reduction. Curves already within the
    /// target are drawn unchanged; larger ones are reduced regardless.
    pub enable_performance_mode: bool,
    /// Let the host adapt the LOD target hint from measured frame rates.
    pub auto_optimize: bool,
    /// Soft limit on the curve count. Exceeding it degrades detail, never fails.
    pub max_curves: usize,
}

impl Default for EngineFlags {
    fn default() -> Self {
        Self {
            enable_performance_mode: true,
            auto_optimize: false,
            max_curves: 1_000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewport limits
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied by a single zoom-in step (and divided by zoom-out).
    pub zoom_step: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 20.0,
            zoom_step: 1.3,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Level of detail
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Target point count per curve when zoomed out (`zoom < 1`).
    pub coarse_target: usize,
    /// Target point count per curve at zoom 1; scaled up with the zoom level.
    pub detail_target: usize,
    /// Upper bound on the zoom-scaled target.
    pub max_target: usize,
    /// Floor for the per-curve target when the curve count exceeds `max_curves`.
    pub min_degraded_target: usize,
    pub strategy: Decimation,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            coarse_target: 500,
            detail_target: 1_000,
            max_target: 20_000,
            min_degraded_target: 50,
            strategy: Decimation::Stride,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Render pipeline
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub grid_min_lines: usize,
    pub grid_max_lines: usize,
    /// Desired spacing between grid lines before clamping to the min/max counts.
    pub grid_spacing_px: f32,
    pub grid_line_width: f32,
    /// Points handled per inner loop while building a curve path.
    pub chunk_size: usize,
    /// Extra pixels around the viewport that still count as on screen.
    pub cull_margin_px: f32,
    pub default_line_width: f32,
    /// Quality markers are drawn only above this zoom level...
    pub marker_zoom_threshold: f64,
    /// ...and only for curves rendering fewer points than this.
    pub marker_point_cap: usize,
    pub marker_radius: f32,
    pub legend_height: f32,
    pub legend_padding: f32,
    pub legend_swatch: f32,
    pub legend_gap: f32,
    pub legend_font_size: f32,
    pub colors: ChartColors,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            grid_min_lines: 5,
            grid_max_lines: 20,
            grid_spacing_px: 100.0,
            grid_line_width: 1.0,
            chunk_size: 1_000,
            cull_margin_px: 2.0,
            default_line_width: 1.0,
            marker_zoom_threshold: 1.5,
            marker_point_cap: 5_000,
            marker_radius: 2.5,
            legend_height: 24.0,
            legend_padding: 8.0,
            legend_swatch: 12.0,
            legend_gap: 12.0,
            legend_font_size: 12.0,
            colors: ChartColors::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis worker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub thread_name: String,
    /// Number of curve-set versions whose statistics are memoized.
    pub cache_capacity: usize,
    /// Total point count above which performance mode is suggested.
    pub high_point_count: usize,
    /// Render time above which a pass is considered over budget.
    pub frame_budget_ms: f64,
    pub min_fps: f64,
    /// Share of error-quality points that flags a curve.
    pub error_share: f64,
    /// Share of hidden curves above which dropping them is suggested.
    pub hidden_share: f64,
    pub memory_limit_mb: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thread_name: "curvescope-analysis".to_string(),
            cache_capacity: 8,
            high_point_count: 500_000,
            frame_budget_ms: 16.7,
            min_fps: 30.0,
            error_share: 0.1,
            hidden_share: 0.5,
            memory_limit_mb: 512.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Synthetic data
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub curve_count: usize,
    pub points_per_curve: usize,
    pub time_range: TimeRange,
    /// Timestamp (ms epoch) of the newest generated sample. `None` = now.
    pub end_ms: Option<i64>,
    pub seed: u64,
    /// Probability of a sample being flagged `Warning`.
    pub warning_rate: f64,
    /// Probability of a sample being flagged `Error`.
    pub error_rate: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            curve_count: 20,
            points_per_curve: 2_000,
            time_range: TimeRange::H1,
            end_ms: None,
            seed: 0x5eed,
            warning_rate: 0.01,
            error_rate: 0.002,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard shell
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub window_size: [f32; 2],
    /// Start with live streaming enabled.
    pub live: bool,
    pub tick_interval_ms: u64,
    pub points_per_tick: usize,
    /// Points kept per curve after each streaming tick.
    pub retain_points: usize,
    /// Median fps below which auto-optimize lowers the LOD hint.
    pub auto_optimize_low_fps: f64,
    /// Median fps above which auto-optimize raises the LOD hint again.
    pub auto_optimize_high_fps: f64,
    /// Minimum time between two analysis requests.
    pub analysis_interval_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "curvescope".to_string(),
            window_size: [1400.0, 900.0],
            live: false,
            tick_interval_ms: 1_000,
            points_per_tick: 5,
            retain_points: 2_000,
            auto_optimize_low_fps: 30.0,
            auto_optimize_high_fps: 55.0,
            analysis_interval_ms: 500,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub flags: EngineFlags,
    pub viewport: ViewportLimits,
    pub lod: LodConfig,
    pub render: RenderConfig,
    pub analysis: AnalysisConfig,
    pub generator: GeneratorConfig,
    pub dashboard: DashboardConfig,
}

impl EngineConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a configuration file; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        log::debug!("loading configuration from {}", path.display());
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would produce degenerate scales or empty loops.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vp = &self.viewport;
        if !(vp.min_zoom > 0.0 && vp.min_zoom <= vp.max_zoom && vp.max_zoom.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom limits must satisfy 0 < min ({}) <= max ({})",
                vp.min_zoom, vp.max_zoom
            )));
        }
        if !(vp.zoom_step > 1.0 && vp.zoom_step.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom step must be greater than 1, got {}",
                vp.zoom_step
            )));
        }
        let r = &self.render;
        if r.grid_min_lines > r.grid_max_lines {
            return Err(ConfigError::Invalid(format!(
                "grid line bounds reversed: min {} > max {}",
                r.grid_min_lines, r.grid_max_lines
            )));
        }
        if r.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk size must be non-zero".into()));
        }
        if self.lod.coarse_target == 0 || self.lod.detail_target == 0 {
            return Err(ConfigError::Invalid("LOD targets must be non-zero".into()));
        }
        Ok(())
    }
}
