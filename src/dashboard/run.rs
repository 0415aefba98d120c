//! Native window entry point for the dashboard.

use eframe::egui;

use crate::config::EngineConfig;

use super::app::DashboardApp;

/// Open the dashboard window and block until it is closed.
pub fn run_dashboard(cfg: EngineConfig) -> eframe::Result<()> {
    let title = cfg.dashboard.title.clone();
    let [w, h] = cfg.dashboard.window_size;
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(egui::vec2(w, h)),
        ..Default::default()
    };
    let app = DashboardApp::new(cfg);

    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}
