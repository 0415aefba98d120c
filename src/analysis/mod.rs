//! Off-UI-thread statistics and optimization suggestions.

pub mod service;
pub mod stats;
pub mod suggest;

pub use service::{AnalysisService, Pending, Versioned};
pub use stats::{compute_statistics, CurveSummary, QualityCounts, Statistics};
pub use suggest::{suggest, Severity, Suggestion, SuggestionKind};
