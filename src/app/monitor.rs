//! Monitoring tab: one live plot per displayed sensor, laid out at the
//! cells of the grid assignment. Dragging a plot title onto another plot
//! asks for confirmation and then swaps the two cells.

use eframe::egui;
use egui::{Color32, Rect, Sense, UiBuilder};
use egui_plot::{Line, Plot};

use crate::dashboard::Dashboard;
use crate::data::grid::GridCell;
use crate::data::sensors::display_name;
use crate::sink::SensorId;

#[derive(Default)]
pub(super) struct MonitorView {
    /// `(dragged, target)` awaiting confirmation.
    pending_swap: Option<(SensorId, SensorId)>,
}

impl MonitorView {
    /// Draw the grid. Returns a status message when something happened.
    pub(super) fn ui(&mut self, ui: &mut egui::Ui, dash: &mut Dashboard) -> Option<String> {
        let (rows, cols) = dash.grid().grid_extent();
        if rows == 0 || cols == 0 {
            ui.centered_and_justified(|ui| {
                ui.label("No sensors selected. Pick some in the Setup tab.");
            });
            return None;
        }

        let area = ui.available_rect_before_wrap();
        let cell_w = area.width() / cols as f32;
        let cell_h = area.height() / rows as f32;
        let cells: Vec<(SensorId, GridCell)> = dash
            .grid()
            .assignment()
            .iter()
            .map(|(s, c)| (s.clone(), *c))
            .collect();

        for (sensor, cell) in &cells {
            let min = area.min + egui::vec2(cell.column as f32 * cell_w, cell.row as f32 * cell_h);
            let size = egui::vec2(cell.col_span as f32 * cell_w, cell.row_span as f32 * cell_h);
            let rect = Rect::from_min_size(min, size).shrink(3.0);
            if let Some(dragged) = self.plot_cell(ui, dash, sensor, rect) {
                if dragged != *sensor {
                    self.pending_swap = Some((dragged, sensor.clone()));
                }
            }
        }
        ui.allocate_rect(area, Sense::hover());

        self.confirm_swap(ui.ctx(), dash)
    }

    /// Render one cell; returns the sensor dropped onto it, if any.
    fn plot_cell(
        &self,
        ui: &mut egui::Ui,
        dash: &Dashboard,
        sensor: &SensorId,
        rect: Rect,
    ) -> Option<SensorId> {
        let drop_zone = ui.interact(rect, ui.id().with(("cell", sensor)), Sense::hover());
        let hovering = drop_zone.dnd_hover_payload::<SensorId>().is_some();
        let stroke_color = if hovering {
            Color32::LIGHT_BLUE
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        ui.painter()
            .rect_stroke(rect, 4.0, egui::Stroke::new(1.0, stroke_color), egui::StrokeKind::Inside);

        let name = display_name(sensor);
        let buffer = dash.dispatcher().buffer(sensor);
        let latest = buffer.and_then(|b| b.latest());

        ui.scope_builder(UiBuilder::new().max_rect(rect.shrink(4.0)), |ui| {
            ui.horizontal(|ui| {
                ui.dnd_drag_source(ui.id().with(("drag", sensor)), sensor.clone(), |ui| {
                    ui.strong(&name);
                });
                if let Some([_, value]) = latest {
                    let text = format!("{value:.2}");
                    match dash.thresholds().classify(sensor, value) {
                        Some(level) => ui.colored_label(level.color(), text),
                        None => ui.label(text),
                    };
                }
            });
            let points = buffer.map(|b| b.as_sequence()).unwrap_or_default();
            Plot::new(("live_plot", sensor))
                .allow_scroll(false)
                .allow_drag(false)
                .show_x(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(name.clone(), points).color(Color32::LIGHT_GREEN));
                });
        });

        drop_zone
            .dnd_release_payload::<SensorId>()
            .map(|payload| (*payload).clone())
    }

    fn confirm_swap(&mut self, ctx: &egui::Context, dash: &mut Dashboard) -> Option<String> {
        let (a, b) = self.pending_swap.clone()?;
        let mut decision = None;
        egui::Window::new("Swap plots")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Swap '{}' with '{}'?",
                    display_name(&a),
                    display_name(&b)
                ));
                ui.horizontal(|ui| {
                    if ui.button("Swap").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision? {
            true => {
                self.pending_swap = None;
                Some(match dash.swap(&a, &b) {
                    Ok(()) => format!("Swapped {} and {}", display_name(&a), display_name(&b)),
                    Err(e) => format!("Swap failed: {e}"),
                })
            }
            false => {
                self.pending_swap = None;
                None
            }
        }
    }
}
