//! Curve data: points, quality flags and per-curve styling.

use serde::{Deserialize, Serialize};

use crate::color::{alloc_color, Rgba};

/// Quality flag attached to a sample by its producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Good,
    Warning,
    Error,
}

impl Quality {
    /// `true` for samples that get a quality marker when zoomed in.
    pub fn is_flagged(self) -> bool {
        !matches!(self, Quality::Good)
    }
}

/// One sample: timestamp in milliseconds since the Unix epoch and a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: i64,
    pub value: f64,
    #[serde(default)]
    pub quality: Quality,
}

impl DataPoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value,
            quality: Quality::Good,
        }
    }

    pub fn with_quality(timestamp: i64, value: f64, quality: Quality) -> Self {
        Self {
            timestamp,
            value,
            quality,
        }
    }
}

/// A named time series with its display styling.
///
/// Points are expected in timestamp order but duplicates and out-of-order
/// samples are kept as delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveData {
    pub id: String,
    pub name: String,
    pub data: Vec<DataPoint>,
    pub color: Rgba,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub line_width: Option<f32>,
    #[serde(default)]
    pub alpha: Option<f32>,
}

fn default_visible() -> bool {
    true
}

impl CurveData {
    /// Create an empty, visible curve.
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: Rgba) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: Vec::new(),
            color,
            unit: None,
            visible: true,
            line_width: None,
            alpha: None,
        }
    }

    /// Create an empty curve whose colour comes from the palette slot `index`.
    pub fn with_palette_color(index: usize, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, alloc_color(index))
    }

    pub fn with_points(mut self, data: Vec<DataPoint>) -> Self {
        self.data = data;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.data.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.data.last().map(|p| p.timestamp)
    }

    /// Copy of this curve's metadata and styling carrying `data` instead.
    pub fn with_data_replaced(&self, data: Vec<DataPoint>) -> CurveData {
        CurveData {
            id: self.id.clone(),
            name: self.name.clone(),
            data,
            color: self.color,
            unit: self.unit.clone(),
            visible: self.visible,
            line_width: self.line_width,
            alpha: self.alpha,
        }
    }

    /// Append points at the tail.
    pub fn extend_points<I: IntoIterator<Item = DataPoint>>(&mut self, points: I) {
        self.data.extend(points);
    }

    /// Drop points from the head so that at most `max_points` remain.
    pub fn retain_last(&mut self, max_points: usize) {
        if self.data.len() > max_points {
            let excess = self.data.len() - max_points;
            self.data.drain(..excess);
        }
    }

    /// Stroke colour with the optional alpha hint applied.
    pub fn stroke_color(&self) -> Rgba {
        match self.alpha {
            Some(a) => self.color.with_alpha(a),
            None => self.color,
        }
    }

    pub fn stroke_width(&self, default_width: f32) -> f32 {
        self.line_width.unwrap_or(default_width).max(0.1)
    }

    /// Label used by the legend (name, plus unit in brackets when known).
    pub fn label(&self) -> String {
        match &self.unit {
            Some(unit) if !unit.is_empty() => format!("{} [{}]", self.name, unit),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<DataPoint> {
        (0..n).map(|i| DataPoint::new(i as i64, i as f64)).collect()
    }

    #[test]
    fn retain_last_keeps_tail() {
        let mut c = CurveData::new("a", "a", Rgba::WHITE).with_points(ramp(10));
        c.retain_last(3);
        assert_eq!(c.len(), 3);
        assert_eq!(c.first_timestamp(), Some(7));
        c.retain_last(50);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn label_includes_unit() {
        let c = CurveData::new("a", "cpu", Rgba::WHITE).with_unit("%");
        assert_eq!(c.label(), "cpu [%]");
        let c = CurveData::new("b", "mem", Rgba::WHITE);
        assert_eq!(c.label(), "mem");
    }

    #[test]
    fn quality_defaults_when_missing_in_json() {
        let p: DataPoint = serde_json::from_str(r#"{"timestamp":1,"value":2.0}"#).unwrap();
        assert_eq!(p.quality, Quality::Good);
        let p: DataPoint =
            serde_json::from_str(r#"{"timestamp":1,"value":2.0,"quality":"error"}"#).unwrap();
        assert_eq!(p.quality, Quality::Error);
    }
}
