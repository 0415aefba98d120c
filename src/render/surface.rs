//! Drawing surface abstraction used by the render pipeline.
//!
//! The pipeline only needs a handful of primitives: filled rectangles, stroked
//! polylines, filled circles and single-line text with measured widths. A
//! surface that cannot draw (not mounted yet, zero size) reports so from
//! [`Surface::begin_pass`] and the pass becomes a no-op.

use crate::color::Rgba;
use crate::viewport::ViewportSize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
}

/// Polyline path made of sub-paths; every `MoveTo` starts a new sub-path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::LineTo(x, y));
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Split into sub-paths of points, one per `MoveTo`.
    pub fn sub_paths(&self) -> Vec<Vec<(f32, f32)>> {
        let mut out: Vec<Vec<(f32, f32)>> = Vec::new();
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(x, y) => out.push(vec![(x, y)]),
                PathSegment::LineTo(x, y) => match out.last_mut() {
                    Some(run) => run.push((x, y)),
                    None => out.push(vec![(x, y)]),
                },
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Width in logical pixels.
    pub width: f32,
    pub color: Rgba,
}

impl Stroke {
    pub fn new(width: f32, color: Rgba) -> Self {
        Self { width, color }
    }
}

/// A 2D target the render pipeline draws on. Coordinates are logical pixels
/// with the origin at the top-left corner of the drawing area.
pub trait Surface {
    /// Prepare the backing store for a new pass (resize to the current size
    /// times the device pixel ratio) and return the logical size. `None`
    /// means the surface cannot be drawn on right now.
    fn begin_pass(&mut self) -> Option<ViewportSize>;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);

    fn stroke_path(&mut self, path: &Path, stroke: Stroke);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);

    /// Draw one line of text; `(x, y)` is the left edge at the vertical centre.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba);

    /// Width in logical pixels that `fill_text` would use for `text`.
    fn measure_text(&mut self, text: &str, size: f32) -> f32;
}

/// Surface that draws nothing. Text is measured as a fixed advance per
/// character so layout code still behaves realistically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullSurface {
    pub size: ViewportSize,
    /// Advance per character as a fraction of the font size.
    pub char_advance: f32,
}

impl NullSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: ViewportSize::new(width, height),
            char_advance: 0.6,
        }
    }
}

impl Surface for NullSurface {
    fn begin_pass(&mut self) -> Option<ViewportSize> {
        (!self.size.is_empty()).then_some(self.size)
    }

    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _color: Rgba) {}

    fn stroke_path(&mut self, _path: &Path, _stroke: Stroke) {}

    fn fill_circle(&mut self, _cx: f32, _cy: f32, _r: f32, _color: Rgba) {}

    fn fill_text(&mut self, _text: &str, _x: f32, _y: f32, _size: f32, _color: Rgba) {}

    fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.char_advance
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    StrokePath {
        path: Path,
        stroke: Stroke,
    },
    FillCircle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Rgba,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        color: Rgba,
    },
}

/// Surface that records every call, for inspecting what a pass produced.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    inner: NullSurface,
    pub ops: Vec<DrawOp>,
    pub passes: usize,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            inner: NullSurface::new(width, height),
            ops: Vec::new(),
            passes: 0,
        }
    }

    pub fn stroke_calls(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokePath { .. }))
            .count()
    }

    pub fn circles(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillCircle { .. }))
            .count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn begin_pass(&mut self) -> Option<ViewportSize> {
        let size = self.inner.begin_pass()?;
        self.ops.clear();
        self.passes += 1;
        Some(size)
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: Stroke) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            stroke,
        });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::FillCircle {
            cx,
            cy,
            radius,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _size: f32, color: Rgba) {
        self.ops.push(DrawOp::FillText {
            text: text.to_owned(),
            x,
            y,
            color,
        });
    }

    fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        self.inner.measure_text(text, size)
    }
}
