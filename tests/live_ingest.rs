use std::collections::HashMap;
use std::time::Duration;

use telemetry_dash::data::buffer::SensorBuffer;
use telemetry_dash::data::sensors::SENSOR_CATALOGUE;
use telemetry_dash::data::status::StatusLevel;
use telemetry_dash::{
    channel_readings, Dashboard, EventFilter, EventKind, ReadingSource, SensorId, SimulatedSource,
    SourceError, SourceRunner, SourceTiming,
};

fn ids(names: &[&str]) -> Vec<SensorId> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn buffer_keeps_last_hundred_points() {
    let mut buf = SensorBuffer::default();
    for t in 0..150 {
        buf.append(t as f64, t as f64 * 2.0);
    }
    let seq = buf.as_sequence();
    assert_eq!(seq.len(), 100);
    assert_eq!(seq.first(), Some(&[50.0, 100.0]));
    assert_eq!(seq.last(), Some(&[149.0, 298.0]));
}

#[test]
fn latest_component_reading_gets_a_status() {
    let mut dash = Dashboard::default();
    dash.set_selected_sensors(&ids(&["combustion_engine_temp", "front_left_tire_temp", "ecu_rpm"]));
    let mut readings = HashMap::new();
    readings.insert("combustion_engine_temp".to_string(), 107.0);
    readings.insert("front_left_tire_temp".to_string(), 80.0);
    readings.insert("ecu_rpm".to_string(), 9000.0);
    dash.ingest(&readings, 1.0);

    let status = |sensor: &str| {
        let [_, value] = dash.dispatcher().buffer(sensor).unwrap().latest().unwrap();
        dash.thresholds().classify(sensor, value)
    };
    assert_eq!(status("combustion_engine_temp"), Some(StatusLevel::Critical));
    assert_eq!(status("front_left_tire_temp"), Some(StatusLevel::Normal));
    assert_eq!(status("ecu_rpm"), None);
}

#[test]
fn readings_for_unselected_sensors_are_not_backfilled() {
    let mut dash = Dashboard::default();
    dash.set_selected_sensors(&ids(&["speed"]));
    let mut readings = HashMap::new();
    readings.insert("speed".to_string(), 100.0);
    readings.insert("ecu_rpm".to_string(), 9000.0);
    dash.ingest(&readings, 1.0);

    dash.set_selected_sensors(&ids(&["speed", "ecu_rpm"]));
    assert!(dash.dispatcher().buffer("ecu_rpm").unwrap().is_empty());
    assert!(dash.dispatcher().buffer("speed").unwrap().is_empty());

    dash.ingest(&readings, 2.0);
    assert_eq!(
        dash.dispatcher().buffer("ecu_rpm").unwrap().as_sequence(),
        vec![[2.0, 9000.0]]
    );
}

#[test]
fn sensor_updates_reach_subscribers() {
    let mut dash = Dashboard::default();
    let rx = dash
        .events()
        .subscribe(EventFilter::only(EventKind::SENSOR_UPDATED));
    dash.set_selected_sensors(&ids(&["a", "b"]));
    let mut readings = HashMap::new();
    readings.insert("a".to_string(), 1.0);
    readings.insert("b".to_string(), f64::INFINITY);
    readings.insert("c".to_string(), 3.0);
    dash.ingest(&readings, 0.5);

    let updated: Vec<SensorId> = rx
        .try_iter()
        .filter_map(|e| e.sensor_update.map(|m| m.sensor))
        .collect();
    assert_eq!(updated, ids(&["a"]));
}

#[test]
fn simulated_source_feeds_the_dashboard() {
    let (sink, rx) = channel_readings();
    let timing = SourceTiming {
        update_rate: Duration::from_millis(1),
        retry_delay: Duration::from_millis(1),
    };
    let mut runner =
        SourceRunner::spawn(SimulatedSource::seeded(SENSOR_CATALOGUE, 3), sink, timing).unwrap();

    let mut dash = Dashboard::default();
    dash.set_selected_sensors(&ids(&["speed"]));
    let batch = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    dash.ingest(&batch.readings, batch.timestamp);
    runner.stop();
    assert!(!runner.is_running());

    let seq = dash.dispatcher().buffer("speed").unwrap().as_sequence();
    assert_eq!(seq.len(), 1);
    assert!(seq[0][0] > 0.0);
}

struct Flaky {
    calls: usize,
}

impl ReadingSource for Flaky {
    fn poll(&mut self) -> Result<HashMap<SensorId, f64>, SourceError> {
        self.calls += 1;
        if self.calls % 2 == 1 {
            return Err(SourceError::Unavailable("link down".into()));
        }
        let mut readings = HashMap::new();
        readings.insert("speed".to_string(), self.calls as f64);
        Ok(readings)
    }
}

#[test]
fn runner_retries_after_errors_and_stops_when_receiver_drops() {
    let (sink, rx) = channel_readings();
    let timing = SourceTiming {
        update_rate: Duration::from_millis(1),
        retry_delay: Duration::from_millis(1),
    };
    let mut runner = SourceRunner::spawn(Flaky { calls: 0 }, sink, timing).unwrap();
    let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first.readings.get("speed"), Some(&2.0));

    drop(rx);
    // the thread exits on its next delivery attempt
    runner.stop();
    assert!(!runner.is_running());
}

struct Down {
    polls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl ReadingSource for Down {
    fn poll(&mut self) -> Result<HashMap<SensorId, f64>, SourceError> {
        self.polls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Err(SourceError::Unavailable("no link".into()))
    }
}

#[test]
fn failing_source_is_paced_even_with_zero_retry_delay() {
    let (sink, _rx) = channel_readings();
    let polls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let timing = SourceTiming {
        update_rate: Duration::ZERO,
        retry_delay: Duration::ZERO,
    };
    let mut runner = SourceRunner::spawn(Down { polls: polls.clone() }, sink, timing).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    runner.stop();

    let n = polls.load(std::sync::atomic::Ordering::Relaxed);
    assert!(n >= 1);
    // 10 ms floor: about ten polls in 100 ms
    assert!(n < 50, "{n} polls in 100 ms");
}
