//! Legend layout: visible curves left to right, truncated with a "+N more"
//! indicator once the row is full.

use crate::config::RenderConfig;

/// Position of one legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Index into the label list passed to [`layout_legend`].
    pub index: usize,
    /// Left edge of the colour swatch.
    pub x: f32,
    pub text_width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegendLayout {
    pub entries: Vec<LegendEntry>,
    /// Labels that did not fit.
    pub overflow: usize,
    /// Left edge of the "+N more" text, present iff `overflow > 0`.
    pub more_x: Option<f32>,
}

impl LegendLayout {
    pub fn drawn(&self) -> usize {
        self.entries.len()
    }

    pub fn more_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| more_label(self.overflow))
    }
}

pub fn more_label(n: usize) -> String {
    format!("+{n} more")
}

/// Lay out `labels` in a row `available_width` pixels wide. Widths come from
/// `measure`, never from estimates. A strict prefix of the labels is placed;
/// whenever that prefix is shorter than the list, room is kept for the
/// "+N more" indicator with `N = labels.len() - drawn`.
pub fn layout_legend<F>(
    labels: &[String],
    available_width: f32,
    cfg: &RenderConfig,
    mut measure: F,
) -> LegendLayout
where
    F: FnMut(&str) -> f32,
{
    let n = labels.len();
    let right_edge = available_width - cfg.legend_padding;
    let swatch_gap = cfg.legend_swatch * 0.5;
    let mut x = cfg.legend_padding;
    let mut entries = Vec::new();

    for (i, label) in labels.iter().enumerate() {
        let text_width = measure(label);
        let entry_width = cfg.legend_swatch + swatch_gap + text_width;
        let remaining_after = n - i - 1;
        let reserve = if remaining_after > 0 {
            cfg.legend_gap + measure(&more_label(remaining_after))
        } else {
            0.0
        };
        if x + entry_width + reserve > right_edge {
            break;
        }
        entries.push(LegendEntry {
            index: i,
            x,
            text_width,
        });
        x += entry_width + cfg.legend_gap;
    }

    let overflow = n - entries.len();
    LegendLayout {
        more_x: (overflow > 0).then_some(x),
        entries,
        overflow,
    }
}
