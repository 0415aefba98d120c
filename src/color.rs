//! Colour tokens and the categorical palette used to style curves.
//!
//! Curves carry an [`Rgba`] style token that is backend-neutral; the render
//! surfaces convert it to `egui::Color32` or `tiny_skia::Color` on demand.

use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::from_rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::from_rgba(0, 0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the alpha channel by `alpha` (clamped to `0..=1`).
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (self.a as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::from_rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl From<egui::Color32> for Rgba {
    fn from(c: egui::Color32) -> Self {
        let [r, g, b, a] = c.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

/// Fixed colours used by the render pipeline for non-curve elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartColors {
    pub background: Rgba,
    pub grid: Rgba,
    pub legend_text: Rgba,
    pub warning_marker: Rgba,
    pub error_marker: Rgba,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            background: Rgba::from_rgb(18, 20, 24),
            grid: Rgba::from_rgba(255, 255, 255, 28),
            legend_text: Rgba::from_rgb(220, 222, 226),
            warning_marker: Rgba::from_rgb(245, 166, 35),
            error_marker: Rgba::from_rgb(231, 76, 60),
        }
    }
}

/// Tableau-10 categorical palette.
pub const DEFAULT_PALETTE: [Rgba; 10] = [
    Rgba::from_rgb(31, 119, 180),
    Rgba::from_rgb(255, 127, 14),
    Rgba::from_rgb(44, 160, 44),
    Rgba::from_rgb(214, 39, 40),
    Rgba::from_rgb(148, 103, 189),
    Rgba::from_rgb(140, 86, 75),
    Rgba::from_rgb(227, 119, 194),
    Rgba::from_rgb(127, 127, 127),
    Rgba::from_rgb(188, 189, 34),
    Rgba::from_rgb(23, 190, 207),
];

// Process-wide palette consulted by `alloc_color`. Hosts may swap it to match
// their own styling before generating curves.
static GLOBAL_PALETTE: Lazy<Mutex<Vec<Rgba>>> = Lazy::new(|| Mutex::new(DEFAULT_PALETTE.to_vec()));

/// Get a copy of the current global curve palette.
pub fn global_palette() -> Vec<Rgba> {
    GLOBAL_PALETTE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the global curve palette. An empty palette restores the default.
pub fn set_global_palette(new: Vec<Rgba>) {
    let mut guard = GLOBAL_PALETTE.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = if new.is_empty() {
        DEFAULT_PALETTE.to_vec()
    } else {
        new
    };
}

/// Allocate a colour for the curve at `index`, cycling through the palette.
pub fn alloc_color(index: usize) -> Rgba {
    let guard = GLOBAL_PALETTE.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_empty() {
        return DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()];
    }
    guard[index % guard.len()]
}
