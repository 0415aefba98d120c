//! [`Surface`] over an `egui::Painter`, used by the dashboard.

use egui::{Align2, FontId, Pos2, Rect, Shape};

use crate::color::Rgba;
use crate::render::surface::{Path, Stroke, Surface};
use crate::viewport::ViewportSize;

/// Draws into `rect` of an egui painter. Surface coordinates are relative
/// to `rect.min`.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    rect: Rect,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, rect: Rect) -> Self {
        Self { painter, rect }
    }

    fn pos(&self, x: f32, y: f32) -> Pos2 {
        Pos2::new(self.rect.min.x + x, self.rect.min.y + y)
    }
}

impl Surface for PainterSurface<'_> {
    fn begin_pass(&mut self) -> Option<ViewportSize> {
        let size = ViewportSize::new(self.rect.width(), self.rect.height());
        (!size.is_empty() && self.painter.is_visible()).then_some(size)
    }

    fn pixel_ratio(&self) -> f32 {
        self.painter.ctx().pixels_per_point()
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let r = Rect::from_min_size(self.pos(x, y), egui::vec2(width, height));
        self.painter.rect_filled(r, 0.0, color.to_color32());
    }

    fn stroke_path(&mut self, path: &Path, stroke: Stroke) {
        let egui_stroke = egui::Stroke::new(stroke.width, stroke.color.to_color32());
        let shapes: Vec<Shape> = path
            .sub_paths()
            .into_iter()
            .filter(|run| run.len() >= 2)
            .map(|run| {
                let pts: Vec<Pos2> = run.into_iter().map(|(x, y)| self.pos(x, y)).collect();
                Shape::line(pts, egui_stroke)
            })
            .collect();
        self.painter.extend(shapes);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        self.painter
            .circle_filled(self.pos(cx, cy), radius, color.to_color32());
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba) {
        self.painter.text(
            self.pos(x, y),
            Align2::LEFT_CENTER,
            text,
            FontId::proportional(size),
            color.to_color32(),
        );
    }

    fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        self.painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(size), egui::Color32::WHITE)
            .rect
            .width()
    }
}
