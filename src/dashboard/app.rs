//! The eframe application: top control bar, curve list, metrics and analysis
//! side panel, and the chart in the central area.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use egui_phosphor::regular::{
    ARROWS_OUT, EYE, EYE_SLASH, FLOPPY_DISK, MAGNIFYING_GLASS_MINUS, MAGNIFYING_GLASS_PLUS, PAUSE,
    PLAY,
};

use crate::analysis::Severity;
use crate::config::EngineConfig;
use crate::data::generator::TimeRange;
use crate::lod::Decimation;
use crate::render::PainterSurface;
use crate::viewport::{HitPoint, PixelTransform, ViewportSize};

use super::screenshot::save_screenshot;
use super::state::{DashboardState, CURVE_COUNT_CHOICES};

/// Hover radius for the point tooltip.
const HIT_RADIUS_PX: f32 = 8.0;
/// Above this many visible points hover hit testing is skipped.
const HIT_TEST_POINT_LIMIT: usize = 250_000;
/// Scroll delta (points) per e-fold of zoom.
const SCROLL_ZOOM_SCALE: f64 = 400.0;

pub struct DashboardApp {
    state: DashboardState,
    chart_size: ViewportSize,
    chart_rect: Option<egui::Rect>,
    /// Destination of a requested screenshot, until the frame arrives.
    shot_path: Option<PathBuf>,
    status: Option<String>,
}

impl DashboardApp {
    pub fn new(cfg: EngineConfig) -> Self {
        Self::from_state(DashboardState::new(cfg))
    }

    pub fn from_state(state: DashboardState) -> Self {
        Self {
            state,
            chart_size: ViewportSize::new(0.0, 0.0),
            chart_rect: None,
            shot_path: None,
            status: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    fn controls_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let live = self.state.live;
            let (label, tip) = if live {
                (format!("{PAUSE} Pause"), "Stop streaming updates")
            } else {
                (format!("{PLAY} Live"), "Append new points every tick")
            };
            if ui.button(label).on_hover_text(tip).clicked() {
                self.state.set_live(!live);
            }

            ui.separator();
            if ui
                .button(MAGNIFYING_GLASS_PLUS.to_string())
                .on_hover_text("Zoom in")
                .clicked()
            {
                self.state.viewport.zoom_in();
            }
            if ui
                .button(MAGNIFYING_GLASS_MINUS.to_string())
                .on_hover_text("Zoom out")
                .clicked()
            {
                self.state.viewport.zoom_out();
            }
            if ui
                .button(ARROWS_OUT.to_string())
                .on_hover_text("Reset zoom and pan")
                .clicked()
            {
                self.state.viewport.reset();
            }
            ui.label(format!("{:.2}×", self.state.viewport.config.zoom_level));

            ui.separator();
            let mut range = self.state.time_range;
            egui::ComboBox::from_label("Range")
                .selected_text(range.label())
                .show_ui(ui, |ui| {
                    for r in TimeRange::ALL {
                        ui.selectable_value(&mut range, r, r.label());
                    }
                });
            self.state.set_time_range(range);

            let mut count = self.state.curve_count;
            egui::ComboBox::from_label("Curves")
                .selected_text(count.to_string())
                .show_ui(ui, |ui| {
                    for n in CURVE_COUNT_CHOICES {
                        ui.selectable_value(&mut count, n, n.to_string());
                    }
                });
            self.state.set_curve_count(count);

            ui.separator();
            let mut flags = self.state.flags;
            ui.checkbox(&mut flags.enable_performance_mode, "Performance mode")
                .on_hover_text("Reduce every curve to the zoom-dependent point budget");
            ui.checkbox(&mut flags.auto_optimize, "Auto-optimize")
                .on_hover_text("Lower detail while the frame rate is low");
            if flags != self.state.flags {
                self.state.set_flags(flags);
            }

            let mut lod = *self.state.engine.lod_config();
            egui::ComboBox::from_label("Decimation")
                .selected_text(lod.strategy.label())
                .show_ui(ui, |ui| {
                    for s in Decimation::ALL {
                        ui.selectable_value(&mut lod.strategy, s, s.label());
                    }
                });
            if lod != *self.state.engine.lod_config() {
                self.state.engine.set_lod_config(lod);
            }

            ui.separator();
            if ui
                .button(format!("{FLOPPY_DISK} Save PNG"))
                .on_hover_text("Save the chart as shown to a PNG file")
                .clicked()
            {
                self.save_png(ui.ctx());
            }
            if let Some(status) = &self.status {
                ui.label(status);
            }
        });
    }

    fn save_png(&mut self, ctx: &egui::Context) {
        if self.chart_rect.is_none() {
            return;
        }
        let default_name = format!("curves_{}.png", chrono::Local::now().timestamp_millis());
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("PNG", &["png"])
            .save_file()
        else {
            return;
        };
        self.shot_path = Some(path);
        self.status = Some("Capturing...".to_owned());
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
    }

    /// Write the screenshot requested by `save_png` once egui delivers it.
    fn handle_screenshot(&mut self, ctx: &egui::Context) {
        if self.shot_path.is_none() {
            return;
        }
        let Some(image) = ctx.input(|i| {
            i.events.iter().rev().find_map(|e| {
                if let egui::Event::Screenshot { image, .. } = e {
                    Some(image.clone())
                } else {
                    None
                }
            })
        }) else {
            return;
        };
        let Some(path) = self.shot_path.take() else {
            return;
        };
        let result = save_screenshot(&image, self.chart_rect, ctx.pixels_per_point(), &path);
        self.status = Some(match result {
            Ok(_) => format!("Saved {}", path.display()),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    fn curves_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong(format!(
                "Curves ({}/{})",
                self.state.curves.visible_count(),
                self.state.curves.len()
            ));
        });
        ui.horizontal(|ui| {
            if ui.button(format!("{EYE} All")).clicked() {
                self.state.set_all_visible(true);
            }
            if ui.button(format!("{EYE_SLASH} None")).clicked() {
                self.state.set_all_visible(false);
            }
        });
        ui.separator();

        let mut toggled: Option<String> = None;
        let row_height = ui.spacing().interact_size.y;
        let curves = self.state.curves.clone();
        egui::ScrollArea::vertical().show_rows(ui, row_height, curves.len(), |ui, rows| {
            for curve in &curves.curves()[rows] {
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, curve.color.to_color32());
                    let mut visible = curve.visible;
                    if ui.checkbox(&mut visible, curve.label()).changed() {
                        toggled = Some(curve.id.clone());
                    }
                });
            }
        });
        if let Some(id) = toggled {
            self.state.toggle_visibility(&id);
        }
    }

    fn metrics_panel(&mut self, ui: &mut egui::Ui) {
        ui.strong("Performance");
        match self.state.engine.last_metrics() {
            Some(m) => {
                egui::Grid::new("metrics_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Render time");
                    ui.label(format!("{:.2} ms", m.render_time_ms));
                    ui.end_row();
                    ui.label("FPS");
                    let median = self.state.engine.frame_clock().median_fps();
                    ui.label(match median {
                        Some(med) => format!("{:.0} (median {med:.0})", m.fps),
                        None => format!("{:.0}", m.fps),
                    });
                    ui.end_row();
                    ui.label("Points drawn");
                    ui.label(m.visible_point_count.to_string());
                    ui.end_row();
                    ui.label("Curves");
                    ui.label(m.total_curve_count.to_string());
                    ui.end_row();
                    if let Some(mb) = m.memory_usage_mb {
                        ui.label("Memory");
                        ui.label(format!("{mb:.1} MB"));
                        ui.end_row();
                    }
                    if let Some(hint) = self.state.engine.lod_hint() {
                        ui.label("LOD hint");
                        ui.label(format!("{hint} pts/curve"));
                        ui.end_row();
                    }
                });
            }
            None => {
                ui.weak("no frame rendered yet");
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.strong("Statistics");
            if !self.state.analysis_ready() {
                ui.colored_label(egui::Color32::LIGHT_RED, "worker unavailable");
            }
            if ui.small_button("Clear cache").clicked() {
                self.state.clear_analysis_cache();
            }
        });
        if let Some(err) = &self.state.analysis_error {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }
        match self.state.current_stats() {
            Some(s) => {
                egui::Grid::new("stats_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Points");
                    ui.label(format!("{} ({} visible)", s.total_points, s.visible_points));
                    ui.end_row();
                    ui.label("Quality");
                    ui.label(format!(
                        "{} ok / {} warn / {} err",
                        s.quality.good, s.quality.warning, s.quality.error
                    ));
                    ui.end_row();
                    if let (Some(min), Some(max), Some(mean)) = (s.value_min, s.value_max, s.value_mean) {
                        ui.label("Values");
                        ui.label(format!("{min:.2} … {max:.2} (mean {mean:.2})"));
                        ui.end_row();
                    }
                    if let Some(span) = s.time_span_ms {
                        ui.label("Time span");
                        ui.label(format_span(span));
                        ui.end_row();
                    }
                });
            }
            None => {
                ui.weak("waiting for analysis");
            }
        }

        ui.separator();
        ui.strong("Suggestions");
        match self.state.current_suggestions() {
            Some([]) => {
                ui.weak("nothing to suggest");
            }
            Some(list) => {
                for s in list {
                    let color = match s.severity {
                        Severity::Info => ui.visuals().text_color(),
                        Severity::Warning => egui::Color32::from_rgb(230, 170, 40),
                        Severity::Critical => egui::Color32::from_rgb(230, 70, 60),
                    };
                    ui.colored_label(color, format!("[{}] {}", s.severity, s.message));
                }
            }
            None => {
                ui.weak("waiting for analysis");
            }
        }
    }

    fn chart(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        self.chart_size = ViewportSize::new(rect.width(), rect.height());
        self.chart_rect = Some(rect);

        let local = |p: egui::Pos2| ((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);
        if response.drag_started() {
            if let Some(p) = response.interact_pointer_pos() {
                let (x, y) = local(p);
                self.state.viewport.pointer_down(x, y);
            }
        } else if response.dragged() {
            if let Some(p) = response.interact_pointer_pos() {
                let (x, y) = local(p);
                self.state.viewport.pointer_move(x, y);
            }
        }
        if response.drag_stopped() {
            self.state.viewport.pointer_up();
        } else if !response.hovered() && !response.dragged() {
            self.state.viewport.pointer_leave();
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y) as f64;
            if scroll != 0.0 {
                self.state.viewport.zoom_by((scroll / SCROLL_ZOOM_SCALE).exp());
            }
        }
        if response.double_clicked() {
            self.state.viewport.reset();
        }

        let mut surface = PainterSurface::new(&painter, rect);
        self.state.engine.render(
            Some(&mut surface),
            &self.state.curves,
            &self.state.viewport.config,
            &self.state.flags,
        );

        if let Some(hit) = self.hit_test(response.hover_pos().map(local)) {
            let name = self
                .state
                .curves
                .get(&hit.curve_id)
                .map(|c| c.label())
                .unwrap_or_else(|| hit.curve_id.clone());
            let when = chrono::DateTime::from_timestamp_millis(hit.point.timestamp)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| hit.point.timestamp.to_string());
            response.on_hover_ui_at_pointer(|ui| {
                ui.strong(name);
                ui.label(format!("{when}\nvalue {:.3}\nquality {:?}", hit.point.value, hit.point.quality));
            });
        }
    }

    fn hit_test(&self, pos: Option<(f64, f64)>) -> Option<HitPoint> {
        let (x, y) = pos?;
        if self.state.viewport.interaction.is_dragging()
            || self.state.curves.visible_points() > HIT_TEST_POINT_LIMIT
        {
            return None;
        }
        let bounds = self.state.engine.last_bounds()?;
        let transform = PixelTransform::new(bounds, self.chart_size, &self.state.viewport.config);
        transform.nearest_point(self.state.curves.iter(), x as f32, y as f32, HIT_RADIUS_PX)
    }
}

fn format_span(ms: i64) -> String {
    let secs = ms / 1_000;
    match secs {
        s if s >= 86_400 => format!("{:.1} d", s as f64 / 86_400.0),
        s if s >= 3_600 => format!("{:.1} h", s as f64 / 3_600.0),
        s if s >= 60 => format!("{:.1} min", s as f64 / 60.0),
        s => format!("{s} s"),
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.handle_screenshot(ctx);
        self.state.tick(now);
        self.state.poll_analysis();

        egui::TopBottomPanel::top("dashboard_controls").show(ctx, |ui| {
            self.controls_bar(ui);
        });
        egui::SidePanel::left("dashboard_curves")
            .default_width(220.0)
            .show(ctx, |ui| {
                self.curves_panel(ui);
            });
        egui::SidePanel::right("dashboard_metrics")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.metrics_panel(ui);
                });
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart(ui);
        });

        self.state.auto_optimize();
        let metrics = self.state.engine.last_metrics().copied();
        self.state.request_analysis(now, metrics.as_ref());

        ctx.request_repaint_after(Duration::from_millis(16));
    }
}

#[cfg(test)]
mod tests {
    use super::format_span;

    #[test]
    fn spans_pick_a_readable_unit() {
        assert_eq!(format_span(45_000), "45 s");
        assert_eq!(format_span(90 * 60_000), "1.5 h");
        assert_eq!(format_span(7 * 86_400_000), "7.0 d");
    }
}
