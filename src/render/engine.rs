//! The synchronous render pass.
//!
//! One call to [`RenderEngine::render`] runs the whole pipeline to completion:
//! surface preparation, background and grid, curves, quality markers, legend,
//! then telemetry. Steps always run in that order, so later steps are always
//! painted on top of earlier ones.

use std::borrow::Cow;
use std::time::Instant;

use crate::config::{EngineConfig, EngineFlags, LodConfig, RenderConfig};
use crate::data::curve::{CurveData, DataPoint, Quality};
use crate::data::store::CurveSet;
use crate::lod::{degraded_target, downsample_points, target_point_count};
use crate::render::grid::{grid_line_count, grid_path};
use crate::render::legend::{layout_legend, LegendLayout};
use crate::render::surface::{Path, Stroke, Surface};
use crate::telemetry::{bytes_to_mb, FrameClock, PerformanceMetrics};
use crate::viewport::{compute_bounds_in, ChartBounds, PixelTransform, ViewportConfig, ViewportSize};

/// Renders curve sets onto a [`Surface`] and reports per-pass telemetry.
pub struct RenderEngine {
    render: RenderConfig,
    lod: LodConfig,
    clock: FrameClock,
    /// Host override of the per-curve LOD target (auto-optimize).
    lod_hint: Option<usize>,
    last_metrics: Option<PerformanceMetrics>,
    last_legend: Option<LegendLayout>,
    last_bounds: Option<ChartBounds>,
    degraded: bool,
    path: Path,
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(RenderConfig::default(), LodConfig::default())
    }
}

impl RenderEngine {
    pub fn new(render: RenderConfig, lod: LodConfig) -> Self {
        Self {
            render,
            lod,
            clock: FrameClock::new(),
            lod_hint: None,
            last_metrics: None,
            last_legend: None,
            last_bounds: None,
            degraded: false,
            path: Path::new(),
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(cfg.render.clone(), cfg.lod)
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    pub fn lod_config(&self) -> &LodConfig {
        &self.lod
    }

    pub fn set_lod_config(&mut self, lod: LodConfig) {
        self.lod = lod;
    }

    /// Override the zoom-derived LOD target. `None` restores the default.
    pub fn set_lod_hint(&mut self, hint: Option<usize>) {
        self.lod_hint = hint.map(|h| h.max(1));
    }

    pub fn lod_hint(&self) -> Option<usize> {
        self.lod_hint
    }

    pub fn frame_clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn last_metrics(&self) -> Option<&PerformanceMetrics> {
        self.last_metrics.as_ref()
    }

    /// Legend layout of the last completed pass.
    pub fn last_legend(&self) -> Option<&LegendLayout> {
        self.last_legend.as_ref()
    }

    /// Chart bounds of the last completed pass, for hit testing against what
    /// was actually drawn.
    pub fn last_bounds(&self) -> Option<ChartBounds> {
        self.last_bounds
    }

    /// Per-curve point budget for this pass.
    pub fn effective_target(&self, zoom_level: f64, visible_curves: usize, flags: &EngineFlags) -> usize {
        let base = self
            .lod_hint
            .unwrap_or_else(|| target_point_count(zoom_level, &self.lod));
        degraded_target(base, visible_curves, flags.max_curves, self.lod.min_degraded_target)
    }

    /// Run one complete pass. Returns `None` without drawing when there is no
    /// surface or the surface cannot be drawn on yet.
    pub fn render(
        &mut self,
        surface: Option<&mut dyn Surface>,
        curves: &CurveSet,
        viewport: &ViewportConfig,
        flags: &EngineFlags,
    ) -> Option<PerformanceMetrics> {
        let surface = surface?;
        let started = Instant::now();

        // 1. resize / DPI normalization
        let size = surface.begin_pass()?;

        let bounds = compute_bounds_in(curves.iter(), viewport.time_window);
        let transform = PixelTransform::new(bounds, size, viewport);

        // 2. background + grid
        self.draw_background(surface, size);

        // 3. curves
        let visible: Vec<&CurveData> = curves.visible().collect();
        let over_limit = flags.max_curves > 0 && visible.len() > flags.max_curves;
        self.note_degradation(over_limit, visible.len(), flags.max_curves);
        let target = self.effective_target(viewport.zoom_level, visible.len(), flags);
        let forced = flags.enable_performance_mode || flags.auto_optimize || over_limit;

        let mut reduced: Vec<(&CurveData, Cow<'_, [DataPoint]>)> = Vec::with_capacity(visible.len());
        let mut visible_point_count = 0usize;
        for curve in visible {
            let points = if forced || curve.data.len() > target {
                downsample_points(&curve.data, target, self.lod.strategy)
            } else {
                Cow::Borrowed(curve.data.as_slice())
            };
            visible_point_count += self.draw_curve(surface, curve, &points, &transform);
            reduced.push((curve, points));
        }

        // 4. quality markers
        if viewport.zoom_level > self.render.marker_zoom_threshold {
            for (_, points) in &reduced {
                if points.len() < self.render.marker_point_cap {
                    self.draw_markers(surface, points, &transform);
                }
            }
        }

        // 5. legend
        let legend = self.draw_legend(surface, &reduced, size);

        // 6. telemetry
        let render_time_ms = started.elapsed().as_secs_f64() * 1_000.0;
        let fps = self.clock.complete(Instant::now());
        let metrics = PerformanceMetrics {
            render_time_ms,
            visible_point_count,
            total_curve_count: curves.len(),
            memory_usage_mb: Some(bytes_to_mb(curves.estimated_bytes())),
            fps,
        };
        self.last_metrics = Some(metrics);
        self.last_legend = Some(legend);
        self.last_bounds = Some(bounds);
        Some(metrics)
    }

    fn note_degradation(&mut self, over_limit: bool, visible: usize, max_curves: usize) {
        if over_limit != self.degraded {
            if over_limit {
                log::debug!(
                    "{visible} visible curves exceed max_curves={max_curves}; reducing per-curve detail"
                );
            } else {
                log::debug!("curve count back within max_curves={max_curves}");
            }
            self.degraded = over_limit;
        }
    }

    fn draw_background(&mut self, surface: &mut dyn Surface, size: ViewportSize) {
        let colors = &self.render.colors;
        surface.fill_rect(0.0, 0.0, size.width, size.height, colors.background);
        let count = grid_line_count(size.width, &self.render);
        let grid = grid_path(size, count);
        surface.stroke_path(&grid, Stroke::new(self.render.grid_line_width, colors.grid));
    }

    /// Build and stroke one continuous path for `points`, skipping samples
    /// that land off screen. Returns the number of points in the path.
    fn draw_curve(
        &mut self,
        surface: &mut dyn Surface,
        curve: &CurveData,
        points: &[DataPoint],
        transform: &PixelTransform,
    ) -> usize {
        let margin = self.render.cull_margin_px;
        let chunk_size = self.render.chunk_size.max(1);
        self.path.clear();
        let mut started = false;
        let mut in_path = 0usize;
        for chunk in points.chunks(chunk_size) {
            for p in chunk {
                let (x, y) = transform.point_to_pixel(p);
                if !(x.is_finite() && y.is_finite()) || !transform.is_on_screen(x, y, margin) {
                    continue;
                }
                if started {
                    self.path.line_to(x, y);
                } else {
                    self.path.move_to(x, y);
                    started = true;
                }
                in_path += 1;
            }
        }
        if !self.path.is_empty() {
            let stroke = Stroke::new(
                curve.stroke_width(self.render.default_line_width),
                curve.stroke_color(),
            );
            surface.stroke_path(&self.path, stroke);
        }
        in_path
    }

    fn draw_markers(&self, surface: &mut dyn Surface, points: &[DataPoint], transform: &PixelTransform) {
        let colors = &self.render.colors;
        for p in points.iter().filter(|p| p.quality.is_flagged()) {
            let (x, y) = transform.point_to_pixel(p);
            if !(x.is_finite() && y.is_finite()) || !transform.is_on_screen(x, y, 0.0) {
                continue;
            }
            let color = match p.quality {
                Quality::Error => colors.error_marker,
                _ => colors.warning_marker,
            };
            surface.fill_circle(x, y, self.render.marker_radius, color);
        }
    }

    fn draw_legend(
        &self,
        surface: &mut dyn Surface,
        curves: &[(&CurveData, Cow<'_, [DataPoint]>)],
        size: ViewportSize,
    ) -> LegendLayout {
        let cfg = &self.render;
        if curves.is_empty() {
            return LegendLayout::default();
        }
        let labels: Vec<String> = curves.iter().map(|(c, _)| c.label()).collect();
        let font = cfg.legend_font_size;
        let layout = layout_legend(&labels, size.width, cfg, |s| surface.measure_text(s, font));

        let band = cfg.legend_height.min(size.height);
        surface.fill_rect(0.0, 0.0, size.width, band, cfg.colors.background.with_alpha(0.8));
        let mid = band / 2.0;
        let swatch = cfg.legend_swatch.min(band);
        for entry in &layout.entries {
            let (curve, _) = &curves[entry.index];
            surface.fill_rect(entry.x, mid - swatch / 2.0, swatch, swatch, curve.color);
            let text_x = entry.x + swatch + cfg.legend_swatch * 0.5;
            surface.fill_text(&labels[entry.index], text_x, mid, font, cfg.colors.legend_text);
        }
        if let (Some(label), Some(x)) = (layout.more_label(), layout.more_x) {
            surface.fill_text(&label, x, mid, font, cfg.colors.legend_text);
        }
        layout
    }
}
