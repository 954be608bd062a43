//! Component status: classify a component reading against its threshold
//! ladder (cold → normal → warm → critical).

use std::collections::BTreeMap;

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Status levels, in ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLevel {
    Cold,
    Normal,
    Warm,
    Critical,
}

impl StatusLevel {
    pub const LADDER: [StatusLevel; 4] = [
        StatusLevel::Cold,
        StatusLevel::Normal,
        StatusLevel::Warm,
        StatusLevel::Critical,
    ];

    pub fn color(self) -> Color32 {
        match self {
            StatusLevel::Cold => Color32::BLUE,
            StatusLevel::Normal => Color32::GREEN,
            StatusLevel::Warm => Color32::YELLOW,
            StatusLevel::Critical => Color32::RED,
        }
    }
}

/// Ladder used for components without configured thresholds.
pub const DEFAULT_THRESHOLDS: [f64; 4] = [100.0, 200.0, 300.0, 400.0];

/// Classify `value`: the first threshold `t` with `value <= t` picks the
/// level at the same position; values above every threshold are critical.
/// Thresholds beyond the fourth are ignored.
pub fn classify(value: f64, thresholds: &[f64]) -> StatusLevel {
    thresholds
        .iter()
        .zip(StatusLevel::LADDER)
        .find(|(t, _)| value <= **t)
        .map(|(_, level)| level)
        .unwrap_or(StatusLevel::Critical)
}

/// Monitored components and the channel reporting each one's temperature.
pub const COMPONENT_CHANNELS: [(&str, &str); 9] = [
    ("Combustion Engine", "combustion_engine_temp"),
    ("Front Left Tire", "front_left_tire_temp"),
    ("Front Right Tire", "front_right_tire_temp"),
    ("Rear Left Tire", "rear_left_tire_temp"),
    ("Rear Right Tire", "rear_right_tire_temp"),
    ("Front Brake", "front_brake_temp"),
    ("Rear Brake", "rear_brake_temp"),
    ("Electric Engine", "electric_engine_temp"),
    ("Accumulator Box", "accumulator_box_temp"),
];

/// Component name for a temperature channel, if it is one.
pub fn component_of(sensor_id: &str) -> Option<&'static str> {
    COMPONENT_CHANNELS
        .iter()
        .find(|(_, id)| *id == sensor_id)
        .map(|(name, _)| *name)
}

/// Threshold ladders keyed by sensor id.
///
/// Configured entries win; component channels without an entry use
/// [`DEFAULT_THRESHOLDS`]; every other sensor has no status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusThresholds(pub BTreeMap<String, Vec<f64>>);

impl Default for StatusThresholds {
    fn default() -> Self {
        let ladders: [&[f64]; 9] = [
            &[85.0, 100.0, 105.0, 110.0],
            &[70.0, 90.0, 100.0],
            &[70.0, 90.0, 100.0],
            &[70.0, 90.0, 100.0],
            &[70.0, 90.0, 100.0],
            &[100.0, 200.0, 300.0, 400.0],
            &[100.0, 200.0, 300.0, 400.0],
            &[40.0, 60.0, 80.0, 100.0],
            &[40.0, 60.0, 80.0, 100.0],
        ];
        Self(
            COMPONENT_CHANNELS
                .iter()
                .zip(ladders)
                .map(|((_, id), t)| (id.to_string(), t.to_vec()))
                .collect(),
        )
    }
}

impl StatusThresholds {
    pub fn thresholds_for(&self, sensor_id: &str) -> Option<&[f64]> {
        match self.0.get(sensor_id) {
            Some(t) => Some(t.as_slice()),
            None => component_of(sensor_id).map(|_| &DEFAULT_THRESHOLDS as &[f64]),
        }
    }

    /// Status of a reading, or `None` for sensors without a ladder.
    pub fn classify(&self, sensor_id: &str, value: f64) -> Option<StatusLevel> {
        self.thresholds_for(sensor_id).map(|t| classify(value, t))
    }
}
