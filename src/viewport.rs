//! Viewport state and the data-space ↔ pixel-space mapping.
//!
//! The viewport is a plain value. Interactions never mutate it in place: each
//! transition function takes the current [`ViewportConfig`] and returns the
//! next one, so zoom clamping and drag panning can be reasoned about (and
//! tested) without a UI.
//!
//! The same [`PixelTransform`] is used by the render pipeline and by hit
//! testing, so what is drawn and what is picked always agree.

use serde::{Deserialize, Serialize};

use crate::config::ViewportLimits;
use crate::data::curve::{CurveData, DataPoint};

/// Fraction of the data range added on each side of the chart bounds.
pub const BOUNDS_PADDING: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

/// Inclusive time window in milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Window of `duration_ms` ending at `end`.
    pub fn ending_at(end: i64, duration_ms: i64) -> Self {
        Self::new(end.saturating_sub(duration_ms.max(0)), end)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Zoom, pan and optional time window of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub zoom_level: f64,
    pub pan_offset: PanOffset,
    /// Restricts the time axis when set; otherwise the data extent is used.
    pub time_window: Option<TimeWindow>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            pan_offset: PanOffset::default(),
            time_window: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transitions
// ─────────────────────────────────────────────────────────────────────────────

fn clamp_zoom(zoom: f64, limits: &ViewportLimits) -> f64 {
    // limits may not have been validated; NaN bounds fall back to zoom 1
    let (a, b) = (limits.min_zoom, limits.max_zoom);
    let lo = if a.is_nan() { 1.0 } else { a.min(b) };
    let hi = if b.is_nan() { 1.0 } else { b.max(a) };
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let zoom = if zoom.is_nan() { 1.0 } else { zoom };
    zoom.clamp(lo, hi)
}

/// Multiply the zoom level by `factor`, clamped to the configured limits.
pub fn apply_zoom(vp: ViewportConfig, factor: f64, limits: &ViewportLimits) -> ViewportConfig {
    ViewportConfig {
        zoom_level: clamp_zoom(vp.zoom_level * factor, limits),
        ..vp
    }
}

pub fn zoom_in(vp: ViewportConfig, limits: &ViewportLimits) -> ViewportConfig {
    apply_zoom(vp, limits.zoom_step, limits)
}

pub fn zoom_out(vp: ViewportConfig, limits: &ViewportLimits) -> ViewportConfig {
    apply_zoom(vp, 1.0 / limits.zoom_step, limits)
}

/// Shift the pan offset by a pixel delta.
pub fn apply_pan(vp: ViewportConfig, dx: f64, dy: f64) -> ViewportConfig {
    ViewportConfig {
        pan_offset: PanOffset {
            x: vp.pan_offset.x + dx,
            y: vp.pan_offset.y + dy,
        },
        ..vp
    }
}

/// Back to zoom 1 and no pan. The time window is kept.
pub fn reset(vp: ViewportConfig) -> ViewportConfig {
    ViewportConfig {
        zoom_level: 1.0,
        pan_offset: PanOffset::default(),
        ..vp
    }
}

pub fn with_time_window(vp: ViewportConfig, window: Option<TimeWindow>) -> ViewportConfig {
    ViewportConfig {
        time_window: window,
        ..vp
    }
}

/// Pointer interaction state for drag panning.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Dragging; `last` is the pointer position of the previous event.
    Dragging { last: (f64, f64) },
}

impl Interaction {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Interaction::Dragging { .. })
    }
}

pub fn pointer_down(x: f64, y: f64) -> Interaction {
    Interaction::Dragging { last: (x, y) }
}

/// Pan by the delta since the previous pointer event. Has no effect when idle.
pub fn pointer_move(
    state: Interaction,
    vp: ViewportConfig,
    x: f64,
    y: f64,
) -> (Interaction, ViewportConfig) {
    match state {
        Interaction::Idle => (state, vp),
        Interaction::Dragging { last } => (
            Interaction::Dragging { last: (x, y) },
            apply_pan(vp, x - last.0, y - last.1),
        ),
    }
}

pub fn pointer_up(_state: Interaction) -> Interaction {
    Interaction::Idle
}

pub fn pointer_leave(_state: Interaction) -> Interaction {
    Interaction::Idle
}

/// Viewport value, drag state and limits bundled for hosts that prefer a
/// single owner. Every method delegates to the pure transitions above.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    pub config: ViewportConfig,
    pub interaction: Interaction,
    pub limits: ViewportLimits,
}

impl ViewportController {
    pub fn new(limits: ViewportLimits) -> Self {
        Self {
            config: ViewportConfig::default(),
            interaction: Interaction::Idle,
            limits,
        }
    }

    pub fn zoom_in(&mut self) {
        self.config = zoom_in(self.config, &self.limits);
    }

    pub fn zoom_out(&mut self) {
        self.config = zoom_out(self.config, &self.limits);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.config = apply_zoom(self.config, factor, &self.limits);
    }

    pub fn reset(&mut self) {
        self.config = reset(self.config);
        self.interaction = Interaction::Idle;
    }

    pub fn set_time_window(&mut self, window: Option<TimeWindow>) {
        self.config = with_time_window(self.config, window);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.interaction = pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let (interaction, config) = pointer_move(self.interaction, self.config, x, y);
        self.interaction = interaction;
        self.config = config;
    }

    pub fn pointer_up(&mut self) {
        self.interaction = pointer_up(self.interaction);
    }

    pub fn pointer_leave(&mut self) {
        self.interaction = pointer_leave(self.interaction);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounds and mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Logical size of the drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Data-space extent of the chart. Always non-degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub min_time: f64,
    pub max_time: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl ChartBounds {
    pub const UNIT: ChartBounds = ChartBounds {
        min_time: 0.0,
        max_time: 1.0,
        min_value: 0.0,
        max_value: 1.0,
    };

    pub fn time_span(&self) -> f64 {
        self.max_time - self.min_time
    }

    pub fn value_span(&self) -> f64 {
        self.max_value - self.min_value
    }
}

/// Widen a raw `[lo, hi]` extent to a padded, non-zero range.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let (lo, hi) = if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, lo + 0.5)
    };
    let pad = (hi - lo) * BOUNDS_PADDING;
    (lo - pad, hi + pad)
}

/// Bounds of the visible curves, padded by 5% on each axis. Falls back to the
/// unit square when no visible curve has a finite point.
pub fn compute_bounds<'a, I>(curves: I) -> ChartBounds
where
    I: IntoIterator<Item = &'a CurveData>,
{
    compute_bounds_in(curves, None)
}

/// Like [`compute_bounds`], restricted to `window` when one is given: the time
/// axis spans the window and values are taken from points inside it.
pub fn compute_bounds_in<'a, I>(curves: I, window: Option<TimeWindow>) -> ChartBounds
where
    I: IntoIterator<Item = &'a CurveData>,
{
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for curve in curves.into_iter().filter(|c| c.visible) {
        for p in &curve.data {
            if window.is_some_and(|w| !w.contains(p.timestamp)) || !p.value.is_finite() {
                continue;
            }
            let t = p.timestamp as f64;
            min_t = min_t.min(t);
            max_t = max_t.max(t);
            min_v = min_v.min(p.value);
            max_v = max_v.max(p.value);
        }
    }
    if let Some(w) = window {
        min_t = w.start as f64;
        max_t = w.end as f64;
    }
    if !(min_t.is_finite() && max_t.is_finite() && min_v.is_finite() && max_v.is_finite()) {
        if window.is_none() {
            return ChartBounds::UNIT;
        }
        min_v = 0.0;
        max_v = 1.0;
    }
    let (min_time, max_time) = padded(min_t, max_t);
    let (min_value, max_value) = padded(min_v, max_v);
    ChartBounds {
        min_time,
        max_time,
        min_value,
        max_value,
    }
}

/// Map a data point to pixel space at zoom 1 without pan. `x` grows with
/// time, `y` shrinks as the value grows.
pub fn to_pixel(timestamp: f64, value: f64, bounds: &ChartBounds, size: ViewportSize) -> (f32, f32) {
    let (x, y) = to_pixel_f64(timestamp, value, bounds, size);
    (x as f32, y as f32)
}

fn to_pixel_f64(timestamp: f64, value: f64, bounds: &ChartBounds, size: ViewportSize) -> (f64, f64) {
    let w = size.width as f64;
    let h = size.height as f64;
    let x = (timestamp - bounds.min_time) / bounds.time_span() * w;
    let y = h - (value - bounds.min_value) / bounds.value_span() * h;
    (x, y)
}

/// A data point picked by [`PixelTransform::nearest_point`].
#[derive(Debug, Clone, PartialEq)]
pub struct HitPoint {
    pub curve_id: String,
    pub index: usize,
    pub point: DataPoint,
    /// Distance to the query position in pixels.
    pub distance: f32,
}

/// Full mapping for one pass: bounds, size, then zoom about the centre and pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTransform {
    pub bounds: ChartBounds,
    pub size: ViewportSize,
    zoom: f64,
    pan: PanOffset,
}

impl PixelTransform {
    pub fn new(bounds: ChartBounds, size: ViewportSize, viewport: &ViewportConfig) -> Self {
        let zoom = if viewport.zoom_level.is_finite() && viewport.zoom_level > 0.0 {
            viewport.zoom_level
        } else {
            1.0
        };
        Self {
            bounds,
            size,
            zoom,
            pan: viewport.pan_offset,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn to_pixel(&self, timestamp: f64, value: f64) -> (f32, f32) {
        let (bx, by) = to_pixel_f64(timestamp, value, &self.bounds, self.size);
        let cx = self.size.width as f64 / 2.0;
        let cy = self.size.height as f64 / 2.0;
        let x = cx + (bx - cx) * self.zoom + self.pan.x;
        let y = cy + (by - cy) * self.zoom + self.pan.y;
        (x as f32, y as f32)
    }

    pub fn point_to_pixel(&self, p: &DataPoint) -> (f32, f32) {
        self.to_pixel(p.timestamp as f64, p.value)
    }

    /// Inverse of [`to_pixel`](Self::to_pixel): `(timestamp, value)` under a pixel.
    pub fn to_data(&self, x: f32, y: f32) -> (f64, f64) {
        let w = self.size.width as f64;
        let h = self.size.height as f64;
        let cx = w / 2.0;
        let cy = h / 2.0;
        let bx = (x as f64 - self.pan.x - cx) / self.zoom + cx;
        let by = (y as f64 - self.pan.y - cy) / self.zoom + cy;
        let t = self.bounds.min_time + bx / w * self.bounds.time_span();
        let v = self.bounds.min_value + (h - by) / h * self.bounds.value_span();
        (t, v)
    }

    /// Whether a pixel lies inside the drawing area grown by `margin`.
    pub fn is_on_screen(&self, x: f32, y: f32, margin: f32) -> bool {
        x >= -margin
            && x <= self.size.width + margin
            && y >= -margin
            && y <= self.size.height + margin
    }

    /// Nearest visible point within `radius` pixels of `(x, y)`.
    pub fn nearest_point<'a, I>(&self, curves: I, x: f32, y: f32, radius: f32) -> Option<HitPoint>
    where
        I: IntoIterator<Item = &'a CurveData>,
    {
        let mut best: Option<HitPoint> = None;
        let r2 = radius * radius;
        for curve in curves.into_iter().filter(|c| c.visible) {
            for (index, p) in curve.data.iter().enumerate() {
                let (px, py) = self.point_to_pixel(p);
                let d2 = (px - x).powi(2) + (py - y).powi(2);
                if !(d2 <= r2) {
                    continue;
                }
                if best.as_ref().map_or(true, |b| d2.sqrt() < b.distance) {
                    best = Some(HitPoint {
                        curve_id: curve.id.clone(),
                        index,
                        point: *p,
                        distance: d2.sqrt(),
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn zero_range_is_widened() {
        let c = CurveData::new("a", "a", Rgba::WHITE).with_points(vec![DataPoint::new(10, 3.0)]);
        let b = compute_bounds([&c]);
        assert!(b.min_time < 10.0 && b.max_time > 10.0);
        assert!(b.min_value < 3.0 && b.max_value > 3.0);
    }

    #[test]
    fn time_window_overrides_time_axis() {
        let c = CurveData::new("a", "a", Rgba::WHITE).with_points(
            (0..100).map(|i| DataPoint::new(i, i as f64)).collect(),
        );
        let b = compute_bounds_in([&c], Some(TimeWindow::new(10, 20)));
        assert!(b.min_time < 10.0 && b.min_time > 9.0);
        assert!(b.max_value < 21.0);
    }

    #[test]
    fn to_data_inverts_to_pixel_under_zoom_and_pan() {
        let bounds = ChartBounds {
            min_time: 0.0,
            max_time: 1_000.0,
            min_value: -5.0,
            max_value: 5.0,
        };
        let vp = ViewportConfig {
            zoom_level: 2.5,
            pan_offset: PanOffset { x: 13.0, y: -7.0 },
            time_window: None,
        };
        let tf = PixelTransform::new(bounds, ViewportSize::new(800.0, 600.0), &vp);
        let (x, y) = tf.to_pixel(420.0, 1.25);
        let (t, v) = tf.to_data(x, y);
        assert!((t - 420.0).abs() < 0.01, "t = {t}");
        assert!((v - 1.25).abs() < 1e-4, "v = {v}");
    }

    #[test]
    fn drag_pans_by_incremental_delta() {
        let vp = ViewportConfig::default();
        let s = pointer_down(100.0, 100.0);
        let (s, vp) = pointer_move(s, vp, 110.0, 95.0);
        let (s, vp) = pointer_move(s, vp, 130.0, 95.0);
        assert_eq!(vp.pan_offset, PanOffset { x: 30.0, y: -5.0 });
        let s = pointer_up(s);
        let (_, vp2) = pointer_move(s, vp, 500.0, 500.0);
        assert_eq!(vp2, vp, "moves while idle do not pan");
    }
}
