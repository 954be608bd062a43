//! Car setup sheets: simulated setup parameters together with the lap time
//! each setup produced, and selection of the fastest one.

use rand::Rng;
use serde::Serialize;

use crate::error::SetupError;

/// One adjustable setup parameter and the range it is simulated in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetupParam {
    pub name: &'static str,
    /// Unit suffix for detail lines; empty for dimensionless values.
    pub unit: &'static str,
    pub lo: f64,
    pub hi: f64,
}

const fn param(name: &'static str, unit: &'static str, lo: f64, hi: f64) -> SetupParam {
    SetupParam { name, unit, lo, hi }
}

/// Parameters of a setup sheet, in table column order.
pub const SETUP_PARAMS: [SetupParam; 12] = [
    param("Rear Height", "mm", 100.0, 200.0),
    param("Front Height", "mm", 100.0, 200.0),
    param("Rear Push", "mm", 0.0, 50.0),
    param("Front Push", "mm", 0.0, 50.0),
    param("Preload Springs", "mm", 10.0, 100.0),
    param("Spring Height", "mm", 20.0, 80.0),
    param("Tire Calibration", "psi", 20.0, 40.0),
    param("Rake", "", 1.0, 5.0),
    param("Wing Inclination", "deg", 0.0, 45.0),
    param("Car Weight", "kg", 800.0, 1500.0),
    param("Balance", "", -10.0, 10.0),
    param("Fuel in the Tank", "l", 10.0, 100.0),
];

/// Lap times of simulated setups, in seconds.
pub const LAP_TIME_RANGE: (f64, f64) = (60.0, 120.0);

/// Number of setups one simulation run produces.
pub const SETUP_COUNT: usize = 30;

/// A setup sheet and the lap time driven with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarSetup {
    pub name: String,
    /// Values in [`SETUP_PARAMS`] order.
    pub values: [f64; 12],
    /// Seconds.
    pub lap_time: f64,
}

impl CarSetup {
    pub fn value(&self, param: &str) -> Option<f64> {
        SETUP_PARAMS
            .iter()
            .position(|p| p.name == param)
            .map(|i| self.values[i])
    }

    /// `"Name: value unit"` lines, lap time first.
    pub fn details(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Setup: {}", self.name),
            format!("Lap Time: {:.2} s", self.lap_time),
        ];
        for (p, v) in SETUP_PARAMS.iter().zip(self.values) {
            if p.unit.is_empty() {
                lines.push(format!("{}: {v:.2}", p.name));
            } else {
                lines.push(format!("{}: {v:.2} {}", p.name, p.unit));
            }
        }
        lines
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `count` setups named `"Setup 1"`, `"Setup 2"`, ... with every value drawn
/// uniformly from its range and rounded to two decimals.
pub fn simulate_setups<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<CarSetup> {
    (1..=count)
        .map(|n| {
            let mut values = [0.0; 12];
            for (v, p) in values.iter_mut().zip(SETUP_PARAMS.iter()) {
                *v = round2(rng.gen_range(p.lo..=p.hi));
            }
            let (lo, hi) = LAP_TIME_RANGE;
            CarSetup {
                name: format!("Setup {n}"),
                values,
                lap_time: round2(rng.gen_range(lo..=hi)),
            }
        })
        .collect()
}

/// The setup with the lowest lap time; the earliest one wins a tie.
/// Setups without a finite lap time are ignored.
pub fn fastest_setup(setups: &[CarSetup]) -> Result<&CarSetup, SetupError> {
    let fastest = setups
        .iter()
        .filter(|s| s.lap_time.is_finite())
        .min_by(|a, b| a.lap_time.total_cmp(&b.lap_time))
        .ok_or(SetupError::NoData)?;
    tracing::info!(setup = %fastest.name, lap_time = fastest.lap_time, "fastest setup selected");
    Ok(fastest)
}
