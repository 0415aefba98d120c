//! curvescope crate root: re-exports and module wiring.
//!
//! A rendering engine for thousands of time series at once:
//! - `data`: curves, immutable curve-set snapshots, synthetic generator
//! - `lod`: per-curve downsampling with a zoom-dependent point budget
//! - `viewport`: zoom/pan state, chart bounds and the data-to-pixel mapping
//! - `render`: the synchronous render pass and its drawing surfaces
//! - `analysis`: statistics and optimization suggestions on a worker thread
//! - `dashboard`: the eframe shell that ties it together

pub mod analysis;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod lod;
pub mod render;
pub mod telemetry;
pub mod viewport;

pub use analysis::{AnalysisService, Pending, Severity, Statistics, Suggestion, Versioned};
pub use color::Rgba;
pub use config::{EngineConfig, EngineFlags, LodConfig, RenderConfig};
pub use dashboard::{run_dashboard, DashboardApp};
pub use data::curve::{CurveData, DataPoint, Quality};
pub use data::generator::{generate_curves, generate_streaming_update, TimeRange};
pub use data::store::{CurveSet, CurveSetVersion};
pub use error::{AnalysisError, ConfigError, ExportError};
pub use lod::{downsample, Decimation};
pub use render::{NullSurface, PainterSurface, PixmapSurface, RecordingSurface, RenderEngine, Surface};
pub use telemetry::{FrameClock, PerformanceMetrics};
pub use viewport::{compute_bounds, to_pixel, ChartBounds, ViewportConfig, ViewportController, ViewportSize};
