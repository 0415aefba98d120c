//! PNG export of the live dashboard.
//!
//! The chart is captured exactly as egui drew it: the app asks for a viewport
//! screenshot, and when the `Event::Screenshot` arrives the frame is cropped
//! to the chart rect and written out.

use std::path::Path;

use eframe::egui;
use image::{Rgba, RgbaImage};

use crate::error::ExportError;

/// Device-pixel bounds `(x0, y0, x1, y1)` of `region` inside a `w × h` image.
fn device_region(
    region: egui::Rect,
    pixels_per_point: f32,
    w: usize,
    h: usize,
) -> (usize, usize, usize, usize) {
    let ppp = if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
        pixels_per_point
    } else {
        1.0
    };
    let to_px = |v: f32, limit: usize| ((v * ppp).round().max(0.0) as usize).min(limit);
    (
        to_px(region.min.x, w),
        to_px(region.min.y, h),
        to_px(region.max.x, w),
        to_px(region.max.y, h),
    )
}

/// Copy a screenshot into an `RgbaImage`, optionally cropped to `region`
/// (given in points).
pub fn to_rgba_image(
    image: &egui::ColorImage,
    region: Option<egui::Rect>,
    pixels_per_point: f32,
) -> RgbaImage {
    let egui::ColorImage {
        size: [w, h],
        pixels,
        ..
    } = image;
    let (x0, y0, x1, y1) = match region {
        Some(r) => device_region(r, pixels_per_point, *w, *h),
        None => (0, 0, *w, *h),
    };
    let mut out = RgbaImage::new(x1.saturating_sub(x0) as u32, y1.saturating_sub(y0) as u32);
    for y in y0..y1 {
        for x in x0..x1 {
            let p = pixels[y * *w + x];
            out.put_pixel((x - x0) as u32, (y - y0) as u32, Rgba([p.r(), p.g(), p.b(), p.a()]));
        }
    }
    out
}

/// Crop and save a screenshot as PNG. Returns the written dimensions.
pub fn save_screenshot(
    image: &egui::ColorImage,
    region: Option<egui::Rect>,
    pixels_per_point: f32,
    path: impl AsRef<Path>,
) -> Result<(u32, u32), ExportError> {
    let path = path.as_ref();
    let out = to_rgba_image(image, region, pixels_per_point);
    if out.width() == 0 || out.height() == 0 {
        return Err(ExportError::Surface {
            width: out.width(),
            height: out.height(),
        });
    }
    match out.save(path) {
        Ok(()) => {
            log::info!("saved chart screenshot to {}", path.display());
            Ok(out.dimensions())
        }
        Err(e) => {
            log::warn!("failed to save chart screenshot to {}: {e}", path.display());
            Err(e.into())
        }
    }
}
