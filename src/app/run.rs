//! Top-level entry point for running the dashboard as a native window.

use std::sync::mpsc::Receiver;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::sink::ReadingBatch;

use super::DashboardApp;

/// Open the dashboard window and block until it is closed.
///
/// Readings are taken from `rx`; the producing side is usually a
/// [`crate::source::SourceRunner`]. The grid layout is restored from and
/// saved to `cfg.layout_path` when one is configured.
pub fn run_dashboard(
    cfg: &DashboardConfig,
    rx: Receiver<ReadingBatch>,
    native_options: Option<eframe::NativeOptions>,
) -> eframe::Result<()> {
    let app = DashboardApp::new(cfg, rx);

    let mut opts = native_options.unwrap_or_default();
    if opts.viewport.inner_size.is_none() {
        opts.viewport = opts
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1400.0, 900.0));
    }

    eframe::run_native(
        "Telemetry Dashboard",
        opts,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
