//! Error types for the fallible edges of the engine.
//!
//! Rendering itself never fails: degenerate input is clamped and a missing
//! surface turns a pass into a no-op. Errors only surface from the analysis
//! worker, configuration loading and image export.

use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// The worker thread could not be started; the service is not ready.
    #[error("analysis worker unavailable: {0}")]
    Unavailable(String),
    /// The worker went away while a request was pending.
    #[error("analysis worker disconnected")]
    Disconnected,
    #[error("analysis result not ready after {0:?}")]
    Timeout(Duration),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("cannot allocate a {width}x{height} drawing surface")]
    Surface { width: u32, height: u32 },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
