//! Lap comparison tab: overlay curves of several laps and read every curve
//! at the hovered x position.

use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, Plot, VLine};

use crate::dashboard::Dashboard;
use crate::data::curve::{CurveKey, LapId};
use crate::data::sensors::{display_name, sensor_ids};
use crate::sink::SensorId;

#[derive(Default)]
pub(super) struct ComparisonView {
    laps: Vec<LapId>,
    sensors: Vec<SensorId>,
    cursor_x: Option<f64>,
    fullscreen: bool,
}

impl ComparisonView {
    pub(super) fn ui(&mut self, ui: &mut egui::Ui, dash: &mut Dashboard) -> Option<String> {
        let mut message = None;

        if !self.fullscreen {
            egui::SidePanel::left("comparison_pickers")
                .resizable(true)
                .show_inside(ui, |ui| {
                    message = self.pickers(ui, dash);
                });
        }

        ui.horizontal(|ui| {
            if ui
                .button(if self.fullscreen { "Exit fullscreen" } else { "Fullscreen" })
                .clicked()
            {
                self.fullscreen = !self.fullscreen;
                ui.ctx()
                    .send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.fullscreen));
            }
            if let Some(x) = self.cursor_x {
                ui.label(format!("Cursor: {x:.3}"));
            }
        });

        self.curve_colors(ui, dash);

        let readout_height = 20.0 * dash.comparison().curves().len().min(8) as f32;
        let plot_height = (ui.available_height() - readout_height - 10.0).max(100.0);
        let curves = dash.comparison().curves();
        let response = Plot::new("lap_comparison")
            .legend(Legend::default())
            .height(plot_height)
            .show(ui, |plot_ui| {
                for curve in curves.values() {
                    plot_ui.line(Line::new(curve.key.label(), curve.points()).color(curve.color));
                }
                if let Some(x) = self.cursor_x {
                    plot_ui.vline(VLine::new("", x).color(Color32::YELLOW));
                }
                plot_ui.pointer_coordinate().map(|p| p.x)
            });
        if let Some(x) = response.inner {
            self.cursor_x = Some(x);
        }

        if let Some(x) = self.cursor_x {
            egui::ScrollArea::vertical().show(ui, |ui| {
                for readout in dash.comparison().values_at(x) {
                    let color = dash.comparison().curve_color(&readout.key);
                    ui.colored_label(color, readout.to_string());
                }
            });
        }
        message
    }

    fn pickers(&mut self, ui: &mut egui::Ui, dash: &mut Dashboard) -> Option<String> {
        let mut message = None;
        ui.heading("Laps");
        egui::ScrollArea::vertical()
            .id_salt("lap_list")
            .max_height((ui.available_height() * 0.35).max(0.0))
            .show(ui, |ui| {
                for lap in dash.laps() {
                    toggle(ui, &mut self.laps, lap, lap);
                }
            });
        ui.separator();
        ui.heading("Sensors");
        egui::ScrollArea::vertical()
            .id_salt("sensor_list")
            .max_height((ui.available_height() - 40.0).max(0.0))
            .show(ui, |ui| {
                for id in sensor_ids() {
                    toggle(ui, &mut self.sensors, id, &display_name(id));
                }
            });
        ui.separator();
        if ui.button("Compare").clicked() {
            message = Some(match dash.compare(&self.laps, &self.sensors) {
                Ok(curves) => format!("Comparing {} curves", curves.len()),
                Err(e) => e.to_string(),
            });
        }
        message
    }

    fn curve_colors(&mut self, ui: &mut egui::Ui, dash: &mut Dashboard) {
        let keys: Vec<CurveKey> = dash.comparison().curves().keys().cloned().collect();
        if keys.is_empty() {
            return;
        }
        ui.collapsing("Curve colours", |ui| {
            for key in keys {
                ui.horizontal(|ui| {
                    let mut color = dash.comparison().curve_color(&key);
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        dash.comparison_mut().set_curve_color(&key, color);
                    }
                    ui.label(key.label());
                });
            }
        });
    }
}

fn toggle(ui: &mut egui::Ui, list: &mut Vec<String>, id: &str, label: &str) {
    let mut checked = list.iter().any(|s| s == id);
    if ui.checkbox(&mut checked, label).changed() {
        if checked {
            list.push(id.to_string());
        } else {
            list.retain(|s| s != id);
        }
    }
}
