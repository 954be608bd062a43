//! Dispatcher: routes incoming reading batches into the per-sensor buffers
//! of the currently selected sensors.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Receiver;

use crate::data::buffer::{SensorBuffer, DEFAULT_CAPACITY};
use crate::events::{DashboardEvent, EventBus, EventKind};
use crate::sink::{ReadingBatch, SensorId};

/// Owner of the live [`SensorBuffer`]s.
pub struct Dispatcher {
    selected: Vec<SensorId>,
    buffers: HashMap<SensorId, SensorBuffer>,
    capacity: usize,
    events: Option<EventBus>,
    #[cfg(feature = "dispatch_debug")]
    ingested: u64,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher whose buffers keep `capacity` points each.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            selected: Vec::new(),
            buffers: HashMap::new(),
            capacity: capacity.max(1),
            events: None,
            #[cfg(feature = "dispatch_debug")]
            ingested: 0,
        }
    }

    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Selected sensors in selection order.
    pub fn selected(&self) -> &[SensorId] {
        &self.selected
    }

    pub fn is_selected(&self, sensor: &str) -> bool {
        self.buffers.contains_key(sensor)
    }

    pub fn buffer(&self, sensor: &str) -> Option<&SensorBuffer> {
        self.buffers.get(sensor)
    }

    /// Replace the selection. Every selected sensor starts over with an
    /// empty buffer; buffers of deselected sensors are dropped. Repeated ids
    /// keep their first position. Returns the effective selection.
    pub fn set_selected_sensors(&mut self, ids: &[SensorId]) -> &[SensorId] {
        let mut seen = HashSet::with_capacity(ids.len());
        self.selected = ids
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();
        self.buffers = self
            .selected
            .iter()
            .map(|s| (s.clone(), SensorBuffer::with_capacity(self.capacity)))
            .collect();

        tracing::info!(count = self.selected.len(), "sensor selection changed");
        if let Some(bus) = &self.events {
            let mut evt = DashboardEvent::new(EventKind::SELECTION_CHANGED);
            evt.selection = Some(self.selected.clone());
            bus.publish(evt);
        }
        &self.selected
    }

    /// Empty every buffer, keeping the selection.
    pub fn clear_buffers(&mut self) {
        self.buffers.values_mut().for_each(SensorBuffer::clear);
        if let Some(bus) = &self.events {
            bus.publish(DashboardEvent::new(EventKind::BUFFERS_CLEARED));
        }
    }

    /// Append `(at, value)` to the buffer of every selected sensor present in
    /// `readings`. Unselected sensors and non-finite values are skipped.
    /// Returns the sensors that received a point, in selection order.
    pub fn ingest(&mut self, readings: &HashMap<SensorId, f64>, at: f64) -> Vec<SensorId> {
        let mut updated = Vec::new();
        for sensor in &self.selected {
            let Some(&value) = readings.get(sensor) else {
                continue;
            };
            if !value.is_finite() {
                tracing::debug!(sensor = %sensor, value, "skipping non-finite reading");
                continue;
            }
            if let Some(buffer) = self.buffers.get_mut(sensor) {
                buffer.append(at, value);
                updated.push(sensor.clone());
                if let Some(bus) = &self.events {
                    bus.publish(DashboardEvent::sensor_updated(sensor.clone(), at, value));
                }
            }
        }

        #[cfg(feature = "dispatch_debug")]
        {
            self.ingested += 1;
            tracing::trace!(
                batch = self.ingested,
                readings = readings.len(),
                updated = updated.len(),
                "ingest"
            );
        }
        updated
    }

    /// Ingest every batch currently queued on `rx` without blocking.
    /// Returns the number of batches consumed.
    pub fn drain(&mut self, rx: &Receiver<ReadingBatch>) -> usize {
        let mut batches = 0;
        while let Ok(batch) = rx.try_recv() {
            self.ingest(&batch.readings, batch.timestamp);
            batches += 1;
        }
        batches
    }
}
