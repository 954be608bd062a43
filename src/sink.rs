//! Reading types and the channel used to hand batches from a source to the
//! dashboard.
//!
//! Producers (network pollers, simulators, tests) hold a cloneable
//! [`ReadingSink`] and push whole batches with [`ReadingSink::deliver`]. The
//! UI thread owns the matching `Receiver` and drains it into the
//! [`Dispatcher`](crate::dispatch::Dispatcher) once per frame, so producers
//! never touch core state directly.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, SendError, Sender};

/// Name of a telemetry channel, e.g. `"ecu_rpm"`.
pub type SensorId = String;

/// One named value as produced by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub sensor_id: SensorId,
    pub value: f64,
    /// Seconds since the UNIX epoch.
    pub timestamp: f64,
}

/// A complete batch of readings sharing one timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingBatch {
    pub readings: HashMap<SensorId, f64>,
    pub timestamp: f64,
}

impl ReadingBatch {
    pub fn new(readings: HashMap<SensorId, f64>, timestamp: f64) -> Self {
        Self {
            readings,
            timestamp,
        }
    }

    /// Expand the batch into individual readings (unordered).
    pub fn iter_readings(&self) -> impl Iterator<Item = SensorReading> + '_ {
        self.readings.iter().map(move |(id, v)| SensorReading {
            sensor_id: id.clone(),
            value: *v,
            timestamp: self.timestamp,
        })
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Convenience sender for feeding reading batches into the dashboard.
#[derive(Clone)]
pub struct ReadingSink {
    tx: Sender<ReadingBatch>,
}

impl ReadingSink {
    /// Push a batch stamped with the given time (seconds).
    pub fn deliver(
        &self,
        readings: HashMap<SensorId, f64>,
        timestamp: f64,
    ) -> Result<(), SendError<ReadingBatch>> {
        self.tx.send(ReadingBatch::new(readings, timestamp))
    }

    /// Push a batch stamped with the current wall-clock time.
    pub fn deliver_now(
        &self,
        readings: HashMap<SensorId, f64>,
    ) -> Result<(), SendError<ReadingBatch>> {
        self.deliver(readings, now_seconds())
    }

    /// Push a single reading as a one-entry batch.
    pub fn send_reading(&self, reading: SensorReading) -> Result<(), SendError<ReadingBatch>> {
        let mut readings = HashMap::with_capacity(1);
        readings.insert(reading.sensor_id, reading.value);
        self.deliver(readings, reading.timestamp)
    }
}

/// Create a new channel pair for reading batches.
pub fn channel_readings() -> (ReadingSink, Receiver<ReadingBatch>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (ReadingSink { tx }, rx)
}

/// Wall-clock time in seconds with microsecond resolution.
pub fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 * 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_batch_arrives_intact() {
        let (sink, rx) = channel_readings();
        let mut readings = HashMap::new();
        readings.insert("speed".to_string(), 182.5);
        readings.insert("ecu_rpm".to_string(), 9100.0);
        sink.deliver(readings.clone(), 12.0).unwrap();

        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.timestamp, 12.0);
        assert_eq!(batch.readings, readings);
    }

    #[test]
    fn single_reading_becomes_batch() {
        let (sink, rx) = channel_readings();
        sink.send_reading(SensorReading {
            sensor_id: "steering".into(),
            value: -12.0,
            timestamp: 3.5,
        })
        .unwrap();
        let batch = rx.try_recv().unwrap();
        let expanded: Vec<_> = batch.iter_readings().collect();
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].sensor_id, "steering");
        assert_eq!(expanded[0].timestamp, 3.5);
    }

    #[test]
    fn deliver_fails_once_receiver_dropped() {
        let (sink, rx) = channel_readings();
        drop(rx);
        assert!(sink.deliver_now(HashMap::new()).is_err());
    }
}
