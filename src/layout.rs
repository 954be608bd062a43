//! Grid layout manager: owns the sensor → cell assignment of the live plot
//! grid.
//!
//! The assignment is rebuilt wholesale whenever the selection changes and is
//! then mutated by manual placement and pairwise swaps. Every mutating
//! operation validates the complete resulting assignment first and either
//! applies it in one step or leaves the previous assignment untouched.

use std::collections::HashSet;

use crate::data::grid::{auto_cell, extent, first_conflict, grid_dims, GridAssignment, GridCell};
use crate::error::LayoutError;
use crate::events::{DashboardEvent, EventBus, EventKind};
use crate::sink::SensorId;

/// Result of restoring a persisted layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRestore {
    /// The persisted layout was applied as-is.
    Restored,
    /// The persisted layout was rejected and the grid was auto-rebuilt.
    FellBack(LayoutError),
    /// Nothing was persisted; the grid was auto-built.
    Fresh,
}

/// Owner of the live [`GridAssignment`].
#[derive(Default)]
pub struct GridLayoutManager {
    assignment: GridAssignment,
    /// Displayed sensors in selection order.
    selected: Vec<SensorId>,
    events: Option<EventBus>,
}

impl GridLayoutManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish layout events on `bus`.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn assignment(&self) -> &GridAssignment {
        &self.assignment
    }

    pub fn selected(&self) -> &[SensorId] {
        &self.selected
    }

    pub fn cell_of(&self, sensor: &str) -> Option<GridCell> {
        self.assignment.get(sensor).copied()
    }

    /// Sensor whose cell covers `(row, column)`.
    pub fn sensor_at(&self, row: usize, column: usize) -> Option<&SensorId> {
        self.assignment
            .iter()
            .find(|(_, cell)| cell.contains(row, column))
            .map(|(sensor, _)| sensor)
    }

    /// Bounding `(rows, cols)` of the current assignment.
    pub fn grid_extent(&self) -> (usize, usize) {
        extent(self.assignment.values())
    }

    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Discard the current assignment and lay `selected` out row-major on a
    /// square-ish grid. Repeated ids keep their first position.
    pub fn rebuild(&mut self, selected: &[SensorId]) {
        let mut seen = HashSet::with_capacity(selected.len());
        let ordered: Vec<SensorId> = selected
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        let (rows, cols) = grid_dims(ordered.len());
        let assignment: GridAssignment = ordered
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), auto_cell(i, cols)))
            .collect();

        tracing::info!(sensors = ordered.len(), rows, cols, "grid rebuilt");
        self.assignment = assignment;
        self.selected = ordered;

        let cells = self
            .selected
            .iter()
            .filter_map(|s| self.assignment.get(s).copied())
            .collect();
        self.emit(DashboardEvent::layout(
            EventKind::LAYOUT_REBUILT,
            self.selected.clone(),
            cells,
        ));
    }

    /// Move already-displayed sensors to new cells.
    ///
    /// The whole resulting assignment (untouched sensors included) is checked
    /// for overlaps before anything changes. On any error the assignment is
    /// left exactly as it was.
    pub fn place_manual<I>(&mut self, assignments: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = (SensorId, GridCell)>,
    {
        let updates: Vec<(SensorId, GridCell)> = assignments.into_iter().collect();
        let result = self.validate_placement(&updates);
        let candidate = match result {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(error = %e, "manual placement rejected");
                self.emit(DashboardEvent::rejected(e.to_string()));
                return Err(e);
            }
        };

        self.assignment = candidate;
        tracing::debug!(count = updates.len(), "manual placement applied");
        let (sensors, cells) = updates.into_iter().unzip();
        self.emit(DashboardEvent::layout(EventKind::LAYOUT_PLACED, sensors, cells));
        Ok(())
    }

    fn validate_placement(
        &self,
        updates: &[(SensorId, GridCell)],
    ) -> Result<GridAssignment, LayoutError> {
        let mut candidate = self.assignment.clone();
        for (sensor, cell) in updates {
            if !self.assignment.contains_key(sensor) {
                return Err(LayoutError::UnknownSensor(sensor.clone()));
            }
            if !cell.is_valid() {
                return Err(LayoutError::InvalidCell {
                    sensor: sensor.clone(),
                });
            }
            candidate.insert(sensor.clone(), *cell);
        }
        match first_conflict(candidate.iter()) {
            Some((first, second)) => Err(LayoutError::PlacementConflict { first, second }),
            None => Ok(candidate),
        }
    }

    /// Exchange the cells of two displayed sensors. Applying the same swap
    /// twice restores the original assignment.
    pub fn swap(&mut self, sensor_a: &str, sensor_b: &str) -> Result<(), LayoutError> {
        let cell_a = self
            .cell_of(sensor_a)
            .ok_or_else(|| LayoutError::UnknownSensor(sensor_a.to_string()))?;
        let cell_b = self
            .cell_of(sensor_b)
            .ok_or_else(|| LayoutError::UnknownSensor(sensor_b.to_string()))?;
        if sensor_a == sensor_b {
            return Ok(());
        }

        self.assignment.insert(sensor_a.to_string(), cell_b);
        self.assignment.insert(sensor_b.to_string(), cell_a);
        tracing::info!(a = sensor_a, b = sensor_b, "plots swapped");
        self.emit(DashboardEvent::layout(
            EventKind::LAYOUT_SWAPPED,
            vec![sensor_a.to_string(), sensor_b.to_string()],
            vec![cell_b, cell_a],
        ));
        Ok(())
    }

    /// Snapshot of the assignment, ordered by sensor id.
    pub fn serialize(&self) -> GridAssignment {
        self.assignment.clone()
    }

    /// Replace the assignment with a persisted one.
    ///
    /// Fails with [`LayoutError::InvalidLayout`] if any cell has a zero span,
    /// reaches past the addressable grid, or overlaps another cell of the payload; the current assignment is
    /// kept in that case. On success the displayed sensors become the
    /// payload's sensors in row-major order of their cells.
    pub fn deserialize(&mut self, data: GridAssignment) -> Result<(), LayoutError> {
        if let Some((sensor, _)) = data.iter().find(|(_, cell)| !cell.is_valid()) {
            return Err(self.reject_layout(format!("cell of '{sensor}' has an invalid span or lies outside the grid")));
        }
        if let Some((first, second)) = first_conflict(data.iter()) {
            return Err(self.reject_layout(format!("'{first}' overlaps '{second}'")));
        }

        let mut ordered: Vec<(&SensorId, &GridCell)> = data.iter().collect();
        ordered.sort_by_key(|(sensor, cell)| (cell.row, cell.column, (*sensor).clone()));
        self.selected = ordered.into_iter().map(|(s, _)| s.clone()).collect();
        self.assignment = data;

        tracing::info!(sensors = self.assignment.len(), "layout restored");
        let cells = self
            .selected
            .iter()
            .filter_map(|s| self.assignment.get(s).copied())
            .collect();
        self.emit(DashboardEvent::layout(
            EventKind::LAYOUT_RESTORED,
            self.selected.clone(),
            cells,
        ));
        Ok(())
    }

    /// Apply a persisted layout, or rebuild from `fallback` if it is
    /// rejected. The whole document is discarded on any invalid entry.
    pub fn restore_or_rebuild(
        &mut self,
        data: GridAssignment,
        fallback: &[SensorId],
    ) -> LayoutRestore {
        match self.deserialize(data) {
            Ok(()) => LayoutRestore::Restored,
            Err(e) => {
                tracing::warn!(error = %e, "persisted layout rejected, rebuilding grid");
                self.rebuild(fallback);
                LayoutRestore::FellBack(e)
            }
        }
    }

    fn reject_layout(&self, reason: String) -> LayoutError {
        self.emit(DashboardEvent::rejected(reason.clone()));
        LayoutError::InvalidLayout(reason)
    }

    fn emit(&self, event: DashboardEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SensorId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rebuild_fills_row_major() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a", "b", "c", "d", "e"]));
        // 5 sensors -> 3 rows x 2 cols
        assert_eq!(grid.cell_of("a"), Some(GridCell::at(0, 0)));
        assert_eq!(grid.cell_of("b"), Some(GridCell::at(0, 1)));
        assert_eq!(grid.cell_of("c"), Some(GridCell::at(1, 0)));
        assert_eq!(grid.cell_of("e"), Some(GridCell::at(2, 0)));
        assert_eq!(grid.grid_extent(), (3, 2));
    }

    #[test]
    fn rebuild_drops_duplicates_and_empties() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a", "b", "a"]));
        assert_eq!(grid.selected(), &ids(&["a", "b"])[..]);
        assert_eq!(grid.cell_of("b"), Some(GridCell::at(1, 0)));
        grid.rebuild(&[]);
        assert!(grid.is_empty());
        assert_eq!(grid.grid_extent(), (0, 0));
    }

    #[test]
    fn span_conflict_is_rejected_without_mutation() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["A", "B", "C"]));
        let before = grid.serialize();
        let err = grid
            .place_manual(vec![
                ("A".to_string(), GridCell::spanning(0, 0, 1, 2)),
                ("B".to_string(), GridCell::at(0, 1)),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::PlacementConflict {
                first: "A".into(),
                second: "B".into()
            }
        );
        assert_eq!(grid.serialize(), before);
    }

    #[test]
    fn placement_checks_untouched_sensors_too() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a", "b", "c", "d"]));
        // c sits at (1, 0); widening a downwards collides with it
        let err = grid
            .place_manual(vec![("a".to_string(), GridCell::spanning(0, 0, 2, 1))])
            .unwrap_err();
        assert!(matches!(err, LayoutError::PlacementConflict { .. }));
    }

    #[test]
    fn valid_placement_is_applied() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a", "b"]));
        grid.place_manual(vec![
            ("a".to_string(), GridCell::spanning(0, 0, 1, 2)),
            ("b".to_string(), GridCell::spanning(1, 0, 1, 2)),
        ])
        .unwrap();
        assert_eq!(grid.cell_of("a"), Some(GridCell::spanning(0, 0, 1, 2)));
        assert_eq!(grid.sensor_at(1, 1).map(String::as_str), Some("b"));
    }

    #[test]
    fn placement_of_unknown_or_degenerate_cells_fails() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a"]));
        assert_eq!(
            grid.place_manual(vec![("z".to_string(), GridCell::at(3, 3))]),
            Err(LayoutError::UnknownSensor("z".into()))
        );
        assert_eq!(
            grid.place_manual(vec![("a".to_string(), GridCell::spanning(0, 0, 0, 1))]),
            Err(LayoutError::InvalidCell { sensor: "a".into() })
        );
        assert_eq!(grid.cell_of("a"), Some(GridCell::at(0, 0)));
    }

    #[test]
    fn swap_exchanges_and_is_involutive() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a", "b", "c"]));
        let before = grid.serialize();
        grid.swap("a", "c").unwrap();
        assert_eq!(grid.cell_of("a"), before.get("c").copied());
        assert_eq!(grid.cell_of("c"), before.get("a").copied());
        grid.swap("a", "c").unwrap();
        assert_eq!(grid.serialize(), before);
    }

    #[test]
    fn swap_with_unknown_sensor_fails() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a"]));
        assert_eq!(
            grid.swap("a", "ghost"),
            Err(LayoutError::UnknownSensor("ghost".into()))
        );
        assert_eq!(grid.cell_of("a"), Some(GridCell::at(0, 0)));
    }

    #[test]
    fn deserialize_rejects_overlap_and_keeps_state() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["x"]));
        let mut data = GridAssignment::new();
        data.insert("a".into(), GridCell::spanning(0, 0, 2, 2));
        data.insert("b".into(), GridCell::at(1, 1));
        assert!(matches!(
            grid.deserialize(data),
            Err(LayoutError::InvalidLayout(_))
        ));
        assert_eq!(grid.selected(), &ids(&["x"])[..]);
    }

    #[test]
    fn deserialize_rejects_cells_past_the_addressable_grid() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["x"]));

        let mut pair = GridAssignment::new();
        pair.insert("a".into(), GridCell::spanning(usize::MAX, 0, 2, 1));
        pair.insert("b".into(), GridCell::at(0, 0));
        assert!(matches!(
            grid.deserialize(pair),
            Err(LayoutError::InvalidLayout(_))
        ));

        let mut single = GridAssignment::new();
        single.insert("a".into(), GridCell::spanning(0, usize::MAX, 1, 1));
        assert!(matches!(
            grid.deserialize(single),
            Err(LayoutError::InvalidLayout(_))
        ));

        assert_eq!(grid.selected(), &ids(&["x"])[..]);
        assert_eq!(grid.grid_extent(), (1, 1));
    }

    #[test]
    fn placement_past_the_addressable_grid_is_an_invalid_cell() {
        let mut grid = GridLayoutManager::new();
        grid.rebuild(&ids(&["a", "b"]));
        let before = grid.serialize();
        assert_eq!(
            grid.place_manual(vec![("a".to_string(), GridCell::spanning(usize::MAX, 0, 2, 1))]),
            Err(LayoutError::InvalidCell { sensor: "a".into() })
        );
        assert_eq!(grid.serialize(), before);
    }

    #[test]
    fn deserialize_orders_selection_by_cell() {
        let mut grid = GridLayoutManager::new();
        let mut data = GridAssignment::new();
        data.insert("a".into(), GridCell::at(1, 0));
        data.insert("b".into(), GridCell::at(0, 1));
        data.insert("c".into(), GridCell::at(0, 0));
        grid.deserialize(data.clone()).unwrap();
        assert_eq!(grid.selected(), &ids(&["c", "b", "a"])[..]);
        assert_eq!(grid.serialize(), data);
    }

    #[test]
    fn restore_falls_back_to_rebuild() {
        let mut grid = GridLayoutManager::new();
        let mut data = GridAssignment::new();
        data.insert("a".into(), GridCell::at(0, 0));
        data.insert("b".into(), GridCell::at(0, 0));
        let outcome = grid.restore_or_rebuild(data, &ids(&["speed", "rpm"]));
        assert!(matches!(outcome, LayoutRestore::FellBack(_)));
        assert_eq!(grid.cell_of("rpm"), Some(GridCell::at(1, 0)));
        assert!(grid.cell_of("a").is_none());
    }

    #[test]
    fn operations_publish_events() {
        let bus = EventBus::new();
        let rx = bus.subscribe_all();
        let mut grid = GridLayoutManager::new().with_events(bus);
        grid.rebuild(&ids(&["a", "b"]));
        grid.swap("a", "b").unwrap();
        let _ = grid.swap("a", "nope");
        // after the swap b sits at (0, 0)
        let _ = grid.place_manual(vec![("a".to_string(), GridCell::at(0, 0))]);

        let kinds: Vec<EventKind> = rx.try_iter().map(|e| e.kinds).collect();
        assert_eq!(kinds[0], EventKind::LAYOUT_REBUILT);
        assert_eq!(kinds[1], EventKind::LAYOUT_SWAPPED);
        // unknown-sensor swap is reported to the caller only
        assert_eq!(kinds[2], EventKind::LAYOUT_REJECTED);
        assert_eq!(kinds.len(), 3);
    }
}
