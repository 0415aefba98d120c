//! Optimization heuristics over statistics and the latest render metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::stats::{CurveSummary, Statistics};
use crate::config::{AnalysisConfig, EngineFlags};
use crate::telemetry::PerformanceMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    TooManyCurves,
    HighPointCount,
    SlowRender,
    LowFrameRate,
    /// Carries the id of the offending curve.
    ErrorHeavyCurve(String),
    /// Error-heavy curves beyond the ones listed individually.
    MoreErrorHeavyCurves(usize),
    HiddenCurvesInMemory,
    HighMemory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub severity: Severity,
    pub message: String,
}

impl Suggestion {
    fn new(kind: SuggestionKind, severity: Severity, message: String) -> Self {
        Self {
            kind,
            severity,
            message,
        }
    }
}

/// Error-heavy curves named individually; the rest are folded into one line.
const ERROR_HEAVY_LISTED: usize = 5;

/// Warning above `limit`, critical above twice that.
fn scaled(value: f64, limit: f64) -> Severity {
    if value > 2.0 * limit {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

/// Evaluate every heuristic. The result is ordered most severe first; ties
/// keep evaluation order.
pub fn suggest(
    stats: &Statistics,
    metrics: &PerformanceMetrics,
    flags: &EngineFlags,
    cfg: &AnalysisConfig,
) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if flags.max_curves > 0 && stats.total_curves > flags.max_curves {
        out.push(Suggestion::new(
            SuggestionKind::TooManyCurves,
            scaled(stats.total_curves as f64, flags.max_curves as f64),
            format!(
                "{} curves loaded, limit is {}; detail is reduced per curve",
                stats.total_curves, flags.max_curves
            ),
        ));
    }

    if stats.total_points > cfg.high_point_count {
        let (severity, message) = if flags.enable_performance_mode {
            (
                Severity::Info,
                format!(
                    "{} points loaded; consider a shorter time range",
                    stats.total_points
                ),
            )
        } else {
            (
                Severity::Warning,
                format!(
                    "{} points loaded; enable performance mode",
                    stats.total_points
                ),
            )
        };
        out.push(Suggestion::new(SuggestionKind::HighPointCount, severity, message));
    }

    if metrics.render_time_ms > cfg.frame_budget_ms {
        out.push(Suggestion::new(
            SuggestionKind::SlowRender,
            scaled(metrics.render_time_ms, cfg.frame_budget_ms),
            format!(
                "render took {:.1} ms, frame budget is {:.1} ms",
                metrics.render_time_ms, cfg.frame_budget_ms
            ),
        ));
    }

    // fps == 0 means no previous pass to measure against
    if metrics.fps > 0.0 && metrics.fps < cfg.min_fps {
        let severity = if metrics.fps < cfg.min_fps / 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        out.push(Suggestion::new(
            SuggestionKind::LowFrameRate,
            severity,
            format!("{:.0} fps, below {:.0}", metrics.fps, cfg.min_fps),
        ));
    }

    let mut error_heavy: Vec<(f64, &CurveSummary)> = stats
        .curves
        .iter()
        .map(|c| (c.error_share(), c))
        .filter(|(share, _)| *share > cfg.error_share)
        .collect();
    error_heavy.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (share, curve) in error_heavy.iter().take(ERROR_HEAVY_LISTED) {
        out.push(Suggestion::new(
            SuggestionKind::ErrorHeavyCurve(curve.id.clone()),
            Severity::Warning,
            format!("{}: {:.0}% of samples are errors", curve.name, share * 100.0),
        ));
    }
    if error_heavy.len() > ERROR_HEAVY_LISTED {
        let rest = error_heavy.len() - ERROR_HEAVY_LISTED;
        out.push(Suggestion::new(
            SuggestionKind::MoreErrorHeavyCurves(rest),
            Severity::Warning,
            format!(
                "{rest} more curves have over {:.0}% error samples",
                cfg.error_share * 100.0
            ),
        ));
    }

    if stats.total_curves > 0 {
        let hidden = stats.hidden_curves();
        if hidden as f64 / stats.total_curves as f64 > cfg.hidden_share {
            out.push(Suggestion::new(
                SuggestionKind::HiddenCurvesInMemory,
                Severity::Info,
                format!(
                    "{hidden} of {} curves are hidden but still held in memory",
                    stats.total_curves
                ),
            ));
        }
    }

    if let Some(mb) = metrics.memory_usage_mb {
        if mb > cfg.memory_limit_mb {
            out.push(Suggestion::new(
                SuggestionKind::HighMemory,
                scaled(mb, cfg.memory_limit_mb),
                format!("curve data uses {mb:.0} MB, limit is {:.0} MB", cfg.memory_limit_mb),
            ));
        }
    }

    out.sort_by(|a, b| b.severity.cmp(&a.severity));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::QualityCounts;

    fn healthy_metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            render_time_ms: 4.0,
            visible_point_count: 1_000,
            total_curve_count: 2,
            memory_usage_mb: Some(1.0),
            fps: 60.0,
        }
    }

    fn stats_with(total_curves: usize, visible_curves: usize) -> Statistics {
        Statistics {
            total_curves,
            visible_curves,
            ..Default::default()
        }
    }

    #[test]
    fn healthy_state_has_no_suggestions() {
        let s = suggest(
            &stats_with(2, 2),
            &healthy_metrics(),
            &EngineFlags::default(),
            &AnalysisConfig::default(),
        );
        assert!(s.is_empty(), "{s:?}");
    }

    #[test]
    fn first_pass_fps_is_not_reported() {
        let m = PerformanceMetrics {
            fps: 0.0,
            ..healthy_metrics()
        };
        let s = suggest(&stats_with(1, 1), &m, &EngineFlags::default(), &AnalysisConfig::default());
        assert!(s.iter().all(|s| s.kind != SuggestionKind::LowFrameRate));
    }

    #[test]
    fn critical_sorts_first() {
        let m = PerformanceMetrics {
            render_time_ms: 100.0,
            fps: 25.0,
            ..healthy_metrics()
        };
        let s = suggest(&stats_with(1, 1), &m, &EngineFlags::default(), &AnalysisConfig::default());
        assert_eq!(s[0].kind, SuggestionKind::SlowRender);
        assert_eq!(s[0].severity, Severity::Critical);
        assert_eq!(s[1].severity, Severity::Warning);
    }

    fn noisy(id: &str, errors: usize) -> CurveSummary {
        CurveSummary {
            id: id.into(),
            name: id.to_uppercase(),
            visible: true,
            count: 10,
            min: None,
            max: None,
            mean: None,
            quality: QualityCounts {
                good: 10 - errors,
                warning: 0,
                error: errors,
            },
        }
    }

    #[test]
    fn error_heavy_curve_is_named() {
        let mut stats = stats_with(1, 1);
        stats.curves.push(noisy("curve-7", 3));
        let s = suggest(&stats, &healthy_metrics(), &EngineFlags::default(), &AnalysisConfig::default());
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].kind, SuggestionKind::ErrorHeavyCurve("curve-7".into()));
    }

    #[test]
    fn many_error_heavy_curves_fold_into_one_line() {
        let mut stats = stats_with(10_000, 10_000);
        stats.curves = (0..10_000).map(|i| noisy(&format!("c{i}"), 3)).collect();
        stats.curves[9_999] = noisy("worst", 9);
        let flags = EngineFlags {
            max_curves: 0,
            ..Default::default()
        };
        let s = suggest(&stats, &healthy_metrics(), &flags, &AnalysisConfig::default());

        let named: Vec<_> = s
            .iter()
            .filter(|s| matches!(s.kind, SuggestionKind::ErrorHeavyCurve(_)))
            .collect();
        assert_eq!(named.len(), ERROR_HEAVY_LISTED);
        assert_eq!(named[0].kind, SuggestionKind::ErrorHeavyCurve("worst".into()));
        assert!(s
            .iter()
            .any(|s| s.kind == SuggestionKind::MoreErrorHeavyCurves(10_000 - ERROR_HEAVY_LISTED)));
        assert_eq!(s.len(), ERROR_HEAVY_LISTED + 1);
    }
}
