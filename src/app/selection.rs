//! Setup tab: pick the sensors shown in the monitoring grid.

use eframe::egui;

use crate::dashboard::Dashboard;
use crate::data::sensors::{display_name, sensor_ids};
use crate::sink::SensorId;

/// Pending selection, in the order sensors were ticked.
#[derive(Default)]
pub(super) struct SelectionPanel {
    pending: Vec<SensorId>,
    filter: String,
}

impl SelectionPanel {
    pub(super) fn sync_from(&mut self, selected: &[SensorId]) {
        self.pending = selected.to_vec();
    }

    /// Returns `true` when the selection was applied.
    pub(super) fn ui(&mut self, ui: &mut egui::Ui, dash: &mut Dashboard) -> bool {
        let mut applied = false;
        ui.heading("Select sensors to monitor");
        ui.horizontal(|ui| {
            ui.label("Filter:");
            ui.text_edit_singleline(&mut self.filter);
            if ui.button("Select all").clicked() {
                self.pending = sensor_ids().map(str::to_string).collect();
            }
            if ui.button("Select none").clicked() {
                self.pending.clear();
            }
        });
        ui.separator();

        let needle = self.filter.to_lowercase();
        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - 40.0).max(0.0))
            .show(ui, |ui| {
                egui::Grid::new("sensor_selection").num_columns(3).show(ui, |ui| {
                    let visible = sensor_ids().filter(|id| {
                        needle.is_empty() || display_name(id).to_lowercase().contains(&needle)
                    });
                    for (i, id) in visible.enumerate() {
                        let mut checked = self.pending.iter().any(|s| s == id);
                        if ui.checkbox(&mut checked, display_name(id)).changed() {
                            if checked {
                                self.pending.push(id.to_string());
                            } else {
                                self.pending.retain(|s| s != id);
                            }
                        }
                        if i % 3 == 2 {
                            ui.end_row();
                        }
                    }
                });
            });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!("{} selected", self.pending.len()));
            if ui.button("Start monitoring").clicked() {
                dash.set_selected_sensors(&self.pending);
                applied = true;
            }
        });
        applied
    }
}
