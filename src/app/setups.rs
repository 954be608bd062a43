//! Car setup tab: a table of simulated setup sheets and the fastest one.

use eframe::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::setups::{fastest_setup, simulate_setups, CarSetup, SETUP_COUNT, SETUP_PARAMS};

#[derive(Default)]
pub(super) struct SetupView {
    setups: Vec<CarSetup>,
    /// Detail lines of the fastest setup while its window is open.
    fastest: Option<Vec<String>>,
}

impl SetupView {
    pub(super) fn ui(&mut self, ui: &mut egui::Ui) -> Option<String> {
        let mut message = None;
        ui.heading("Car setup comparison");
        ui.horizontal(|ui| {
            if ui.button("Simulate setups").clicked() {
                let mut rng = StdRng::from_entropy();
                self.setups = simulate_setups(&mut rng, SETUP_COUNT);
                self.fastest = None;
                message = Some(format!("Simulated {} setups", self.setups.len()));
            }
            if ui.button("Compare setups").clicked() {
                match fastest_setup(&self.setups) {
                    Ok(best) => {
                        message = Some(format!("Fastest: {} ({:.2} s)", best.name, best.lap_time));
                        self.fastest = Some(best.details());
                    }
                    Err(e) => message = Some(e.to_string()),
                }
            }
        });
        ui.separator();

        egui::ScrollArea::both().show(ui, |ui| {
            egui::Grid::new("setup_table")
                .striped(true)
                .num_columns(SETUP_PARAMS.len() + 2)
                .show(ui, |ui| {
                    ui.strong("Setup");
                    for p in &SETUP_PARAMS {
                        ui.strong(p.name);
                    }
                    ui.strong("Lap Time (s)");
                    ui.end_row();

                    for s in &self.setups {
                        ui.label(&s.name);
                        for v in s.values {
                            ui.label(format!("{v:.2}"));
                        }
                        ui.label(format!("{:.2}", s.lap_time));
                        ui.end_row();
                    }
                });
        });

        self.fastest_window(ui.ctx());
        message
    }

    fn fastest_window(&mut self, ctx: &egui::Context) {
        let Some(lines) = &self.fastest else {
            return;
        };
        let mut close = false;
        egui::Window::new("Fastest setup")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                for line in lines {
                    ui.label(line);
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        if close {
            self.fastest = None;
        }
    }
}
