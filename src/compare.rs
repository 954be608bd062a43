//! Lap comparison engine: builds one [`Curve`] per selected `(lap, sensor)`
//! pair and answers cursor queries against them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use egui::Color32;

use crate::data::curve::{curve_color, Curve, CurveKey, LapId};
use crate::data::laps::{LapProvider, LapSeriesStore};
use crate::error::CompareError;
use crate::events::{DashboardEvent, EventBus, EventKind};
use crate::sink::SensorId;

/// Value of one curve at a cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorReadout {
    pub key: CurveKey,
    pub x: f64,
    /// `None` when the cursor lies outside the curve's x range.
    pub value: Option<f64>,
}

impl fmt::Display for CursorReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(y) => write!(
                f,
                "{} - Time: {:.3} - Value: {:.2}",
                self.key.label(),
                self.x,
                y
            ),
            None => write!(f, "{} - Time: N/A - Value: N/A", self.key.label()),
        }
    }
}

/// Comparison state: lap series cache, the current curve set and user
/// colour overrides.
pub struct ComparisonEngine {
    store: LapSeriesStore,
    curves: BTreeMap<CurveKey, Curve>,
    overrides: HashMap<CurveKey, Color32>,
    events: Option<EventBus>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::from_store(LapSeriesStore::default())
    }
}

impl ComparisonEngine {
    pub fn new(provider: Box<dyn LapProvider>) -> Self {
        Self::from_store(LapSeriesStore::new(provider))
    }

    pub fn from_store(store: LapSeriesStore) -> Self {
        Self {
            store,
            curves: BTreeMap::new(),
            overrides: HashMap::new(),
            events: None,
        }
    }

    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn store(&self) -> &LapSeriesStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LapSeriesStore {
        &mut self.store
    }

    /// Curves of the last successful comparison.
    pub fn curves(&self) -> &BTreeMap<CurveKey, Curve> {
        &self.curves
    }

    /// Rebuild the curve set for every `(lap, sensor)` pair in
    /// `laps × sensors`. Series are materialised on first use and cached.
    pub fn compare(
        &mut self,
        laps: &[LapId],
        sensors: &[SensorId],
    ) -> Result<&BTreeMap<CurveKey, Curve>, CompareError> {
        if laps.is_empty() {
            return Err(CompareError::NoLapsSelected);
        }
        if sensors.is_empty() {
            return Err(CompareError::NoSensorsSelected);
        }

        let mut curves = BTreeMap::new();
        for lap in laps {
            for sensor in sensors {
                let key = CurveKey::new(lap.as_str(), sensor.as_str());
                if curves.contains_key(&key) {
                    continue;
                }
                let mut curve = Curve::from_points(key.clone(), self.store.series(lap, sensor));
                if let Some(color) = self.overrides.get(&key) {
                    curve.color = *color;
                }
                curves.insert(key, curve);
            }
        }

        tracing::info!(
            laps = laps.len(),
            sensors = sensors.len(),
            curves = curves.len(),
            "comparison updated"
        );
        self.curves = curves;
        if let Some(bus) = &self.events {
            let mut evt = DashboardEvent::new(EventKind::COMPARISON_READY);
            evt.curve_count = Some(self.curves.len());
            bus.publish(evt);
        }
        Ok(&self.curves)
    }

    /// Colour a curve explicitly. The override outlives re-comparisons.
    pub fn set_curve_color(&mut self, key: &CurveKey, color: Color32) {
        self.overrides.insert(key.clone(), color);
        if let Some(curve) = self.curves.get_mut(key) {
            curve.color = color;
        }
        if let Some(bus) = &self.events {
            bus.publish(DashboardEvent::new(EventKind::CURVE_COLOR_CHANGED));
        }
    }

    /// Drop an override so the curve goes back to its hashed colour.
    pub fn reset_curve_color(&mut self, key: &CurveKey) {
        if self.overrides.remove(key).is_some() {
            if let Some(curve) = self.curves.get_mut(key) {
                curve.color = curve_color(&key.lap_id, &key.sensor_id);
            }
        }
    }

    /// Effective colour for `key`.
    pub fn curve_color(&self, key: &CurveKey) -> Color32 {
        self.overrides
            .get(key)
            .copied()
            .unwrap_or_else(|| curve_color(&key.lap_id, &key.sensor_id))
    }

    /// One readout per current curve at cursor position `x`.
    pub fn values_at(&self, x: f64) -> Vec<CursorReadout> {
        self.curves
            .iter()
            .map(|(key, curve)| CursorReadout {
                key: key.clone(),
                x,
                value: curve.value_at(x),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.curves.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::laps::lap_ids;

    struct Ramp;

    impl LapProvider for Ramp {
        fn load(&self, _lap_id: &str, _sensor_id: &str) -> Vec<[f64; 2]> {
            vec![[0.0, 0.0], [10.0, 100.0]]
        }
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_cartesian_product() {
        let mut engine = ComparisonEngine::default();
        let curves = engine
            .compare(&lap_ids(3), &ids(&["speed", "ecu_rpm"]))
            .unwrap();
        assert_eq!(curves.len(), 6);
        assert!(curves.contains_key(&CurveKey::new("Lap 3", "ecu_rpm")));
        assert_eq!(engine.store().cached_len(), 6);
    }

    #[test]
    fn empty_inputs_are_errors() {
        let mut engine = ComparisonEngine::default();
        assert_eq!(
            engine.compare(&[], &ids(&["speed"])).unwrap_err(),
            CompareError::NoLapsSelected
        );
        assert_eq!(
            engine.compare(&lap_ids(1), &[]).unwrap_err(),
            CompareError::NoSensorsSelected
        );
    }

    #[test]
    fn readout_labels() {
        let mut engine = ComparisonEngine::new(Box::new(Ramp));
        engine.compare(&lap_ids(1), &ids(&["ecu_rpm"])).unwrap();
        let inside = engine.values_at(5.0);
        assert_eq!(inside[0].value, Some(50.0));
        assert_eq!(
            inside[0].to_string(),
            "Lap 1 - Ecu Rpm - Time: 5.000 - Value: 50.00"
        );
        let outside = engine.values_at(11.0);
        assert_eq!(
            outside[0].to_string(),
            "Lap 1 - Ecu Rpm - Time: N/A - Value: N/A"
        );
    }

    #[test]
    fn colour_override_survives_recompare() {
        let mut engine = ComparisonEngine::new(Box::new(Ramp));
        let key = CurveKey::new("Lap 1", "speed");
        engine.compare(&lap_ids(1), &ids(&["speed"])).unwrap();
        assert_eq!(engine.curve_color(&key), curve_color("Lap 1", "speed"));

        engine.set_curve_color(&key, Color32::WHITE);
        engine.compare(&lap_ids(2), &ids(&["speed"])).unwrap();
        assert_eq!(engine.curves()[&key].color, Color32::WHITE);

        engine.reset_curve_color(&key);
        assert_eq!(engine.curves()[&key].color, curve_color("Lap 1", "speed"));
    }
}
