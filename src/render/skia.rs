//! Offscreen raster surface backed by a `tiny_skia::Pixmap`.
//!
//! Headless rendering for demos and tests. The pixmap holds
//! `logical size × pixel ratio` device pixels and every draw call is scaled
//! by the ratio, so the pipeline always works in logical pixels.
//!
//! tiny-skia has no text shaping, so text is measured with a fixed advance
//! and not drawn. The dashboard exports through an egui screenshot instead.

use std::path::Path as FsPath;

use image::{Rgba as ImagePixel, RgbaImage};
use tiny_skia as sk;

use crate::color::Rgba;
use crate::error::ExportError;
use crate::render::surface::{Path, PathSegment, Stroke, Surface};
use crate::viewport::ViewportSize;

/// Advance per character as a fraction of the font size.
const TEXT_ADVANCE: f32 = 0.6;

pub struct PixmapSurface {
    pixmap: sk::Pixmap,
    size: ViewportSize,
    pixel_ratio: f32,
}

fn device_dims(size: ViewportSize, pixel_ratio: f32) -> (u32, u32) {
    let w = (size.width * pixel_ratio).ceil().max(0.0) as u32;
    let h = (size.height * pixel_ratio).ceil().max(0.0) as u32;
    (w, h)
}

fn paint(color: Rgba) -> sk::Paint<'static> {
    let mut paint = sk::Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

impl PixmapSurface {
    /// A surface of `width × height` logical pixels.
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Result<Self, ExportError> {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let size = ViewportSize::new(width as f32, height as f32);
        let (dw, dh) = device_dims(size, pixel_ratio);
        let pixmap = sk::Pixmap::new(dw, dh).ok_or(ExportError::Surface {
            width: dw,
            height: dh,
        })?;
        Ok(Self {
            pixmap,
            size,
            pixel_ratio,
        })
    }

    /// Change the logical size; the backing pixmap follows on the next pass.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = ViewportSize::new(width, height);
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            self.pixel_ratio = pixel_ratio;
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn pixmap(&self) -> &sk::Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy of the pixmap.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut out = RgbaImage::new(w, h);
        for (i, px) in self.pixmap.pixels().iter().enumerate() {
            let c = px.demultiply();
            let (x, y) = (i as u32 % w, i as u32 / w);
            out.put_pixel(x, y, ImagePixel([c.red(), c.green(), c.blue(), c.alpha()]));
        }
        out
    }

    pub fn save_png(&self, path: impl AsRef<FsPath>) -> Result<(), ExportError> {
        let path = path.as_ref();
        match self.to_rgba_image().save(path) {
            Ok(()) => {
                log::info!("saved chart to {}", path.display());
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to save chart to {}: {e}", path.display());
                Err(e.into())
            }
        }
    }

    fn transform(&self) -> sk::Transform {
        sk::Transform::from_scale(self.pixel_ratio, self.pixel_ratio)
    }
}

impl Surface for PixmapSurface {
    fn begin_pass(&mut self) -> Option<ViewportSize> {
        if self.size.is_empty() {
            return None;
        }
        let (dw, dh) = device_dims(self.size, self.pixel_ratio);
        if (dw, dh) != (self.pixmap.width(), self.pixmap.height()) {
            self.pixmap = sk::Pixmap::new(dw, dh)?;
        }
        self.pixmap.fill(sk::Color::TRANSPARENT);
        Some(self.size)
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        if let Some(rect) = sk::Rect::from_xywh(x, y, width, height) {
            let transform = self.transform();
            self.pixmap.fill_rect(rect, &paint(color), transform, None);
        }
    }

    fn stroke_path(&mut self, path: &Path, stroke: Stroke) {
        let mut pb = sk::PathBuilder::new();
        for seg in path.segments() {
            match *seg {
                PathSegment::MoveTo(x, y) => pb.move_to(x, y),
                PathSegment::LineTo(x, y) => pb.line_to(x, y),
            }
        }
        let Some(built) = pb.finish() else {
            return;
        };
        let sk_stroke = sk::Stroke {
            width: stroke.width,
            line_cap: sk::LineCap::Round,
            line_join: sk::LineJoin::Round,
            ..Default::default()
        };
        let transform = self.transform();
        self.pixmap
            .stroke_path(&built, &paint(stroke.color), &sk_stroke, transform, None);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if let Some(circle) = sk::PathBuilder::from_circle(cx, cy, radius) {
            let transform = self.transform();
            self.pixmap
                .fill_path(&circle, &paint(color), sk::FillRule::Winding, transform, None);
        }
    }

    fn fill_text(&mut self, _text: &str, _x: f32, _y: f32, _size: f32, _color: Rgba) {}

    fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * TEXT_ADVANCE
    }
}
