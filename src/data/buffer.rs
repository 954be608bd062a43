//! SensorBuffer: fixed-capacity rolling history for one sensor.

use std::collections::VecDeque;

/// Default number of points retained per sensor.
pub const DEFAULT_CAPACITY: usize = 100;

/// Rolling `(timestamp, value)` history for a single sensor.
///
/// Points are kept in arrival order. Once `capacity` is reached every append
/// drops the oldest point first. The x-axis is the sensor's own arrival order;
/// timestamps are not checked or synchronised against other sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorBuffer {
    points: VecDeque<[f64; 2]>,
    capacity: usize,
}

impl Default for SensorBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SensorBuffer {
    /// Create an empty buffer. A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point, evicting the oldest one when full.
    pub fn append(&mut self, timestamp: f64, value: f64) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back([timestamp, value]);
    }

    /// Snapshot of the retained points, oldest first.
    pub fn as_sequence(&self) -> Vec<[f64; 2]> {
        self.points.iter().copied().collect()
    }

    /// Borrowing iterator over the retained points, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<[f64; 2]> {
        self.points.back().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
