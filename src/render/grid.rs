//! Background grid, emitted as one batched path.

use crate::config::RenderConfig;
use crate::render::surface::Path;
use crate::viewport::ViewportSize;

/// Grid lines per axis for a drawing area `width` pixels wide.
pub fn grid_line_count(width: f32, cfg: &RenderConfig) -> usize {
    let spacing = if cfg.grid_spacing_px > 0.0 {
        cfg.grid_spacing_px
    } else {
        100.0
    };
    let raw = if width.is_finite() && width > 0.0 {
        (width / spacing).floor() as usize
    } else {
        0
    };
    raw.clamp(cfg.grid_min_lines, cfg.grid_max_lines.max(cfg.grid_min_lines))
}

/// `count` evenly spaced vertical and horizontal interior lines in one path.
pub fn grid_path(size: ViewportSize, count: usize) -> Path {
    let mut path = Path::with_capacity(count * 4);
    let step_x = size.width / (count + 1) as f32;
    let step_y = size.height / (count + 1) as f32;
    for i in 1..=count {
        let x = (step_x * i as f32).round() + 0.5;
        path.move_to(x, 0.0);
        path.line_to(x, size.height);
    }
    for i in 1..=count {
        let y = (step_y * i as f32).round() + 0.5;
        path.move_to(0.0, y);
        path.line_to(size.width, y);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_clamped_between_bounds() {
        let cfg = RenderConfig::default();
        assert_eq!(grid_line_count(100.0, &cfg), 5);
        assert_eq!(grid_line_count(1_200.0, &cfg), 12);
        assert_eq!(grid_line_count(10_000.0, &cfg), 20);
        assert_eq!(grid_line_count(f32::NAN, &cfg), 5);
    }

    #[test]
    fn path_has_two_segments_per_line() {
        let p = grid_path(ViewportSize::new(600.0, 400.0), 6);
        assert_eq!(p.len(), 6 * 2 * 2);
        assert_eq!(p.sub_paths().len(), 12);
    }
}
