//! Render pipeline and drawing surfaces.

pub mod engine;
pub mod grid;
pub mod legend;
pub mod painter;
pub mod skia;
pub mod surface;

pub use engine::RenderEngine;
pub use legend::{layout_legend, LegendLayout};
pub use painter::PainterSurface;
pub use skia::PixmapSurface;
pub use surface::{DrawOp, NullSurface, Path, PathSegment, RecordingSurface, Stroke, Surface};
