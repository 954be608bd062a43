//! LapSeries store: per-(lap, sensor) time series, materialised on first
//! request and cached for the session.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::curve::{CurveKey, LapId};

/// Names of the first `count` recorded laps: `"Lap 1"`, `"Lap 2"`, ...
pub fn lap_ids(count: usize) -> Vec<LapId> {
    (1..=count).map(|i| format!("Lap {i}")).collect()
}

/// Backing store that can produce the series for a `(lap, sensor)` pair.
pub trait LapProvider {
    /// Load `(x, y)` samples. Order does not matter; the store sorts by x.
    fn load(&self, lap_id: &str, sensor_id: &str) -> Vec<[f64; 2]>;
}

/// Stand-in for a recording: 60 samples at x = 0..59 with values in
/// `[150, 200)`. Seeded per pair so the same pair always yields the same
/// series.
#[derive(Debug, Clone)]
pub struct SimulatedLaps {
    pub samples: usize,
    pub range: (f64, f64),
}

impl Default for SimulatedLaps {
    fn default() -> Self {
        Self {
            samples: 60,
            range: (150.0, 200.0),
        }
    }
}

impl LapProvider for SimulatedLaps {
    fn load(&self, lap_id: &str, sensor_id: &str) -> Vec<[f64; 2]> {
        let mut hasher = DefaultHasher::new();
        (lap_id, sensor_id).hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        let (lo, hi) = self.range;
        (0..self.samples)
            .map(|i| [i as f64, rng.gen_range(lo..hi)])
            .collect()
    }
}

/// Lazily filled cache of lap series.
pub struct LapSeriesStore {
    provider: Box<dyn LapProvider>,
    series: HashMap<CurveKey, Vec<[f64; 2]>>,
}

impl Default for LapSeriesStore {
    fn default() -> Self {
        Self::new(Box::new(SimulatedLaps::default()))
    }
}

impl LapSeriesStore {
    pub fn new(provider: Box<dyn LapProvider>) -> Self {
        Self {
            provider,
            series: HashMap::new(),
        }
    }

    /// Series for `(lap, sensor)`, loading it from the provider on first use.
    pub fn series(&mut self, lap_id: &str, sensor_id: &str) -> &[[f64; 2]] {
        let key = CurveKey::new(lap_id, sensor_id);
        let provider = &self.provider;
        self.series.entry(key).or_insert_with(|| {
            tracing::debug!(lap = lap_id, sensor = sensor_id, "materialising lap series");
            normalize(provider.load(lap_id, sensor_id))
        })
    }

    /// Store a recorded series, replacing any cached one.
    pub fn insert(&mut self, lap_id: &str, sensor_id: &str, points: Vec<[f64; 2]>) {
        self.series
            .insert(CurveKey::new(lap_id, sensor_id), normalize(points));
    }

    pub fn is_cached(&self, lap_id: &str, sensor_id: &str) -> bool {
        self.series.contains_key(&CurveKey::new(lap_id, sensor_id))
    }

    pub fn cached_len(&self) -> usize {
        self.series.len()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}

/// Drop points with a NaN abscissa and sort by x so interpolation can rely
/// on monotonic x. The sort is stable, keeping arrival order among equal x.
fn normalize(mut points: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    points.retain(|p| !p[0].is_nan());
    if !points.windows(2).all(|w| w[0][0] <= w[1][0]) {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }
    points
}
