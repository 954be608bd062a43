//! Desktop shell around the [`Dashboard`] core.
//!
//! | Sub-module     | Responsibility |
//! | -------------- | -------------- |
//! | [`selection`]  | Choosing which sensors are displayed |
//! | [`monitor`]    | Live plot grid, drag-and-drop swapping |
//! | [`comparison`] | Lap comparison plot with cursor readout |
//! | [`setups`]     | Car setup table and fastest-setup pick |
//! | [`run`]        | [`run_dashboard()`] entry point |

mod comparison;
mod monitor;
mod run;
mod selection;
mod setups;

pub use run::run_dashboard;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::layout::LayoutRestore;
use crate::sink::ReadingBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Setup,
    Monitor,
    Comparison,
    CarSetup,
}

/// The eframe application: owns the core and the per-view UI state.
pub struct DashboardApp {
    dashboard: Dashboard,
    rx: Receiver<ReadingBatch>,
    layout_path: Option<PathBuf>,
    tab: Tab,
    selection: selection::SelectionPanel,
    monitor: monitor::MonitorView,
    comparison: comparison::ComparisonView,
    setups: setups::SetupView,
    /// Last message shown in the status bar.
    status: Option<String>,
    layout_saved: bool,
}

impl DashboardApp {
    pub fn new(cfg: &DashboardConfig, rx: Receiver<ReadingBatch>) -> Self {
        let mut app = Self {
            dashboard: Dashboard::from_config(cfg),
            rx,
            layout_path: cfg.layout_path.clone(),
            tab: Tab::Setup,
            selection: selection::SelectionPanel::default(),
            monitor: monitor::MonitorView::default(),
            comparison: comparison::ComparisonView::default(),
            setups: setups::SetupView::default(),
            status: None,
            layout_saved: false,
        };
        if let Some(path) = app.layout_path.clone() {
            let outcome = app.dashboard.restore_layout_from_path(&path);
            app.report_restore(outcome);
        }
        app.selection.sync_from(app.dashboard.selected());
        if !app.dashboard.selected().is_empty() {
            app.tab = Tab::Monitor;
        }
        app
    }

    fn report_restore(&mut self, outcome: LayoutRestore) {
        self.status = match outcome {
            LayoutRestore::Restored => Some(format!(
                "Restored layout with {} plots",
                self.dashboard.grid().len()
            )),
            LayoutRestore::FellBack(e) => Some(format!("Saved layout ignored: {e}")),
            LayoutRestore::Fresh => None,
        };
    }

    fn save_layout_to(&mut self, path: PathBuf) {
        self.status = Some(match self.dashboard.save_layout(&path) {
            Ok(()) => format!("Layout saved to {}", path.display()),
            Err(e) => {
                tracing::error!(error = %e, "failed to save layout");
                format!("Failed to save layout: {e}")
            }
        });
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("dashboard_tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Setup, "Setup");
                ui.selectable_value(&mut self.tab, Tab::Monitor, "Car Monitoring");
                ui.selectable_value(&mut self.tab, Tab::Comparison, "Lap Comparison");
                ui.selectable_value(&mut self.tab, Tab::CarSetup, "Car Setup");
                ui.separator();
                if ui.button("Save layout…").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Layout", &["json"])
                        .set_file_name("layout.json")
                        .save_file()
                    {
                        self.save_layout_to(path);
                    }
                }
                if ui.button("Load layout…").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Layout", &["json"])
                        .pick_file()
                    {
                        let outcome = self.dashboard.restore_layout_from_path(&path);
                        self.report_restore(outcome);
                        self.selection.sync_from(self.dashboard.selected());
                    }
                }
                if ui.button("Clear").clicked() {
                    self.dashboard.clear_buffers();
                }
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("dashboard_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} sensors", self.dashboard.selected().len()));
                if let Some(msg) = &self.status {
                    ui.separator();
                    ui.label(msg);
                }
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dashboard.drain(&self.rx);

        self.top_bar(ctx);
        self.status_bar(ctx);

        let mut message = None;
        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Setup => {
                if self.selection.ui(ui, &mut self.dashboard) {
                    self.tab = Tab::Monitor;
                }
            }
            Tab::Monitor => message = self.monitor.ui(ui, &mut self.dashboard),
            Tab::Comparison => message = self.comparison.ui(ui, &mut self.dashboard),
            Tab::CarSetup => message = self.setups.ui(ui),
        });
        if message.is_some() {
            self.status = message;
        }

        if ctx.input(|i| i.viewport().close_requested()) && !self.layout_saved {
            if let Some(path) = self.layout_path.clone() {
                self.save_layout_to(path);
            }
            self.layout_saved = true;
        }

        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
