//! Interactive dashboard shell built on eframe.

pub mod app;
pub mod run;
pub mod screenshot;
pub mod state;

pub use app::DashboardApp;
pub use run::run_dashboard;
pub use screenshot::save_screenshot;
pub use state::{adjust_lod_hint, DashboardState};
