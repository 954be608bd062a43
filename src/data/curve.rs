//! Curves for lap comparison: deterministic colouring and linear
//! interpolation at a cursor position.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use egui::Color32;

use crate::data::sensors::display_name;
use crate::sink::SensorId;

/// Identifier of a recorded lap, e.g. `"Lap 3"`.
pub type LapId = String;

/// `(lap, sensor)` pair a curve is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveKey {
    pub lap_id: LapId,
    pub sensor_id: SensorId,
}

impl CurveKey {
    pub fn new(lap_id: impl Into<LapId>, sensor_id: impl Into<SensorId>) -> Self {
        Self {
            lap_id: lap_id.into(),
            sensor_id: sensor_id.into(),
        }
    }

    /// Legend text, e.g. `"Lap 2 - Ecu Rpm"`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.lap_id, display_name(&self.sensor_id))
    }
}

/// Fixed hue ramp: nine hues 40° apart at full saturation and value.
const HUE_RAMP: [Color32; 9] = [
    Color32::from_rgb(255, 0, 0),
    Color32::from_rgb(255, 170, 0),
    Color32::from_rgb(170, 255, 0),
    Color32::from_rgb(0, 255, 0),
    Color32::from_rgb(0, 255, 170),
    Color32::from_rgb(0, 170, 255),
    Color32::from_rgb(0, 0, 255),
    Color32::from_rgb(170, 0, 255),
    Color32::from_rgb(255, 0, 170),
];

/// `hash(lap_id + sensor_id) mod 256`.
pub fn color_index(lap_id: &str, sensor_id: &str) -> u8 {
    let mut hasher = DefaultHasher::new();
    let mut joined = String::with_capacity(lap_id.len() + sensor_id.len());
    joined.push_str(lap_id);
    joined.push_str(sensor_id);
    joined.hash(&mut hasher);
    (hasher.finish() % 256) as u8
}

/// Map a colour index through the hue ramp.
pub fn ramp_color(index: u8) -> Color32 {
    HUE_RAMP[index as usize % HUE_RAMP.len()]
}

/// Stable colour for a `(lap, sensor)` pair. Collisions are expected.
pub fn curve_color(lap_id: &str, sensor_id: &str) -> Color32 {
    ramp_color(color_index(lap_id, sensor_id))
}

/// A rendering-ready series bound to one `(lap, sensor)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub key: CurveKey,
    /// Ascending x values.
    pub x_data: Vec<f64>,
    pub y_data: Vec<f64>,
    pub color: Color32,
}

impl Curve {
    /// Build a curve from `(x, y)` points, colouring it from its key.
    pub fn from_points(key: CurveKey, points: &[[f64; 2]]) -> Self {
        let color = curve_color(&key.lap_id, &key.sensor_id);
        Self {
            key,
            x_data: points.iter().map(|p| p[0]).collect(),
            y_data: points.iter().map(|p| p[1]).collect(),
            color,
        }
    }

    pub fn len(&self) -> usize {
        self.x_data.len().min(self.y_data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paired points for plotting.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x_data
            .iter()
            .zip(self.y_data.iter())
            .map(|(x, y)| [*x, *y])
            .collect()
    }

    /// `(first_x, last_x)` or `None` when empty.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        let n = self.len();
        if n == 0 {
            None
        } else {
            Some((self.x_data[0], self.x_data[n - 1]))
        }
    }

    pub fn value_at(&self, x: f64) -> Option<f64> {
        get_value_at(self, x)
    }
}

/// Value of `curve` at `x`, linearly interpolated between the neighbouring
/// samples. `None` when `x` lies outside `[x_data[0], x_data[last]]`.
///
/// A query that lands exactly on a sample returns that sample's y value
/// (the first one when abscissas repeat).
pub fn get_value_at(curve: &Curve, x: f64) -> Option<f64> {
    let n = curve.len();
    if n == 0 || x.is_nan() {
        return None;
    }
    let xs = &curve.x_data[..n];
    let ys = &curve.y_data[..n];
    debug_assert!(xs.windows(2).all(|w| w[0] <= w[1]), "curve x must be sorted");

    if x < xs[0] || x > xs[n - 1] {
        return None;
    }

    // first sample with xs[idx] >= x; the interval is [idx - 1, idx]
    let idx = xs.partition_point(|&v| v < x);
    if xs[idx] == x {
        return Some(ys[idx]);
    }
    let (x0, y0) = (xs[idx - 1], ys[idx - 1]);
    let (x1, y1) = (xs[idx], ys[idx]);
    if x1 == x0 {
        return Some(y0);
    }
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}
