//! The dashboard core: one owner for the dispatcher, the live grid and the
//! comparison engine, all publishing to a shared [`EventBus`].
//!
//! Everything here runs on the UI thread. Readings arrive from the source
//! thread over the channel returned by [`crate::sink::channel_readings`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::mpsc::Receiver;

use crate::compare::ComparisonEngine;
use crate::config::DashboardConfig;
use crate::data::curve::{Curve, CurveKey, LapId};
use crate::data::grid::{GridAssignment, GridCell};
use crate::data::laps::{lap_ids, LapSeriesStore};
use crate::data::status::StatusThresholds;
use crate::dispatch::Dispatcher;
use crate::error::{CompareError, LayoutError, PersistenceError};
use crate::events::EventBus;
use crate::layout::{GridLayoutManager, LayoutRestore};
use crate::persistence;
use crate::sink::{ReadingBatch, SensorId};

pub struct Dashboard {
    bus: EventBus,
    dispatcher: Dispatcher,
    grid: GridLayoutManager,
    comparison: ComparisonEngine,
    laps: Vec<LapId>,
    thresholds: StatusThresholds,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl Dashboard {
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self::with_store(cfg, LapSeriesStore::default())
    }

    /// Dashboard whose comparison view reads laps from `store`.
    pub fn with_store(cfg: &DashboardConfig, store: LapSeriesStore) -> Self {
        let bus = EventBus::new();
        Self {
            dispatcher: Dispatcher::with_capacity(cfg.buffer_capacity).with_events(bus.clone()),
            grid: GridLayoutManager::new().with_events(bus.clone()),
            comparison: ComparisonEngine::from_store(store).with_events(bus.clone()),
            laps: lap_ids(cfg.lap_count),
            thresholds: cfg.status_thresholds.clone(),
            bus,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn grid(&self) -> &GridLayoutManager {
        &self.grid
    }

    pub fn comparison(&self) -> &ComparisonEngine {
        &self.comparison
    }

    pub fn comparison_mut(&mut self) -> &mut ComparisonEngine {
        &mut self.comparison
    }

    /// Laps offered for comparison.
    pub fn laps(&self) -> &[LapId] {
        &self.laps
    }

    pub fn thresholds(&self) -> &StatusThresholds {
        &self.thresholds
    }

    pub fn selected(&self) -> &[SensorId] {
        self.dispatcher.selected()
    }

    /// Change the displayed sensors: fresh buffers for the new selection and
    /// an auto-built grid.
    pub fn set_selected_sensors(&mut self, ids: &[SensorId]) {
        let selected = self.dispatcher.set_selected_sensors(ids).to_vec();
        self.grid.rebuild(&selected);
    }

    pub fn ingest(&mut self, readings: &HashMap<SensorId, f64>, at: f64) -> Vec<SensorId> {
        self.dispatcher.ingest(readings, at)
    }

    pub fn drain(&mut self, rx: &Receiver<ReadingBatch>) -> usize {
        self.dispatcher.drain(rx)
    }

    pub fn clear_buffers(&mut self) {
        self.dispatcher.clear_buffers();
    }

    pub fn swap(&mut self, a: &str, b: &str) -> Result<(), LayoutError> {
        self.grid.swap(a, b)
    }

    pub fn place_manual<I>(&mut self, assignments: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = (SensorId, GridCell)>,
    {
        self.grid.place_manual(assignments)
    }

    /// Apply a layout document. On success the selection follows the
    /// layout's sensors; on rejection the current selection is re-laid out.
    pub fn restore_layout(&mut self, data: GridAssignment) -> LayoutRestore {
        let fallback = self.dispatcher.selected().to_vec();
        let outcome = self.grid.restore_or_rebuild(data, &fallback);
        self.sync_selection(&outcome);
        outcome
    }

    /// Restore the layout persisted at `path`; see
    /// [`persistence::restore_layout_from_path`].
    pub fn restore_layout_from_path(&mut self, path: &Path) -> LayoutRestore {
        let fallback = self.dispatcher.selected().to_vec();
        let outcome = persistence::restore_layout_from_path(&mut self.grid, path, &fallback);
        self.sync_selection(&outcome);
        outcome
    }

    fn sync_selection(&mut self, outcome: &LayoutRestore) {
        if matches!(outcome, LayoutRestore::Restored) {
            let restored = self.grid.selected().to_vec();
            self.dispatcher.set_selected_sensors(&restored);
        }
    }

    pub fn save_layout(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::save_layout_to_path(&self.grid, path)
    }

    pub fn compare(
        &mut self,
        laps: &[LapId],
        sensors: &[SensorId],
    ) -> Result<&BTreeMap<CurveKey, Curve>, CompareError> {
        self.comparison.compare(laps, sensors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SensorId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selection_drives_grid_and_buffers() {
        let mut dash = Dashboard::default();
        dash.set_selected_sensors(&ids(&["a", "b", "c"]));
        assert_eq!(dash.grid().len(), 3);
        assert!(dash.dispatcher().buffer("c").is_some());

        dash.set_selected_sensors(&ids(&["c"]));
        assert_eq!(dash.grid().cell_of("c"), Some(GridCell::at(0, 0)));
        assert!(dash.dispatcher().buffer("a").is_none());
    }

    #[test]
    fn restored_layout_becomes_selection() {
        let mut dash = Dashboard::default();
        dash.set_selected_sensors(&ids(&["x"]));
        let mut data = GridAssignment::new();
        data.insert("rpm".into(), GridCell::at(0, 1));
        data.insert("speed".into(), GridCell::at(0, 0));
        assert_eq!(dash.restore_layout(data), LayoutRestore::Restored);
        assert_eq!(dash.selected(), &ids(&["speed", "rpm"])[..]);
        assert!(dash.dispatcher().buffer("x").is_none());
    }

    #[test]
    fn rejected_layout_keeps_selection() {
        let mut dash = Dashboard::default();
        dash.set_selected_sensors(&ids(&["x", "y"]));
        let mut data = GridAssignment::new();
        data.insert("rpm".into(), GridCell::spanning(0, 0, 0, 1));
        assert!(matches!(dash.restore_layout(data), LayoutRestore::FellBack(_)));
        assert_eq!(dash.selected(), &ids(&["x", "y"])[..]);
        assert_eq!(dash.grid().cell_of("y"), Some(GridCell::at(1, 0)));
    }
}
