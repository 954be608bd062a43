//! Reading sources and the background thread that polls them.
//!
//! A [`ReadingSource`] produces one snapshot of every channel it knows per
//! poll. [`SourceRunner`] polls it at a fixed rate on its own thread and
//! pushes each snapshot through a [`ReadingSink`] to the UI thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::sensors::{ChannelKind, ChannelSpec, SENSOR_CATALOGUE};
use crate::error::SourceError;
use crate::sink::{now_seconds, ReadingSink, SensorId};

/// Something that can be asked for the current value of its channels.
pub trait ReadingSource: Send {
    fn poll(&mut self) -> Result<HashMap<SensorId, f64>, SourceError>;
}

/// Random values for every channel of a catalogue.
pub struct SimulatedSource {
    channels: &'static [ChannelSpec],
    rng: StdRng,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(SENSOR_CATALOGUE)
    }
}

impl SimulatedSource {
    pub fn new(channels: &'static [ChannelSpec]) -> Self {
        Self {
            channels,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic simulator, for tests and demos.
    pub fn seeded(channels: &'static [ChannelSpec], seed: u64) -> Self {
        Self {
            channels,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample(&mut self, kind: ChannelKind) -> f64 {
        match kind {
            ChannelKind::Uniform { lo, hi } => self.rng.gen_range(lo..hi),
            ChannelKind::Flag => f64::from(u8::from(self.rng.gen_bool(0.5))),
            ChannelKind::Integer { lo, hi } => self.rng.gen_range(lo..=hi) as f64,
            ChannelKind::Clock => now_seconds(),
        }
    }
}

impl ReadingSource for SimulatedSource {
    fn poll(&mut self) -> Result<HashMap<SensorId, f64>, SourceError> {
        let channels = self.channels;
        Ok(channels
            .iter()
            .map(|c| (c.id.to_string(), self.sample(c.kind)))
            .collect())
    }
}

/// Shortest pause after a failed poll.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Poll pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceTiming {
    /// Pause after a successful poll.
    pub update_rate: Duration,
    /// Pause after a failed poll, never shorter than [`MIN_RETRY_DELAY`].
    pub retry_delay: Duration,
}

impl Default for SourceTiming {
    fn default() -> Self {
        Self {
            update_rate: Duration::from_millis(100),
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl SourceTiming {
    /// Timing from seconds, as found in the configuration file. Negative or
    /// non-finite values become zero, then the retry delay is raised to
    /// [`MIN_RETRY_DELAY`]; pauses are capped at one day.
    pub fn from_secs(update_rate: f64, retry_delay: f64) -> Self {
        let secs = |s: f64| {
            if s.is_finite() && s > 0.0 {
                Duration::from_secs_f64(s.min(86_400.0))
            } else {
                Duration::ZERO
            }
        };
        Self {
            update_rate: secs(update_rate),
            retry_delay: secs(retry_delay).max(MIN_RETRY_DELAY),
        }
    }
}

/// Handle to a running poll thread.
pub struct SourceRunner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SourceRunner {
    /// Start polling `source` on a new thread.
    ///
    /// The thread ends after [`SourceRunner::stop`] or once the receiving
    /// side of `sink` has been dropped.
    pub fn spawn<S>(mut source: S, sink: ReadingSink, timing: SourceTiming) -> std::io::Result<Self>
    where
        S: ReadingSource + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let handle = std::thread::Builder::new()
            .name("reading-source".into())
            .spawn(move || {
                tracing::info!("reading source started");
                while flag.load(Ordering::Relaxed) {
                    match source.poll() {
                        Ok(readings) => {
                            if sink.deliver_now(readings).is_err() {
                                tracing::debug!("reading receiver dropped");
                                break;
                            }
                            std::thread::sleep(timing.update_rate);
                        }
                        Err(e) => {
                            let pause = timing.retry_delay.max(MIN_RETRY_DELAY);
                            tracing::warn!(error = %e, retry_in = ?pause, "source poll failed");
                            std::thread::sleep(pause);
                        }
                    }
                }
                flag.store(false, Ordering::Relaxed);
                tracing::info!("reading source stopped");
            })?;
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask the thread to stop and wait for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("reading source thread panicked");
            }
        }
    }
}

impl Drop for SourceRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sensors::find_channel;

    #[test]
    fn simulated_values_stay_in_range() {
        let mut sim = SimulatedSource::seeded(SENSOR_CATALOGUE, 7);
        for _ in 0..20 {
            let readings = sim.poll().unwrap();
            assert_eq!(readings.len(), SENSOR_CATALOGUE.len());
            for (id, value) in &readings {
                match find_channel(id).unwrap().kind {
                    ChannelKind::Uniform { lo, hi } => assert!(*value >= lo && *value < hi),
                    ChannelKind::Flag => assert!(*value == 0.0 || *value == 1.0),
                    ChannelKind::Integer { lo, hi } => {
                        assert_eq!(value.fract(), 0.0);
                        assert!(*value >= lo as f64 && *value <= hi as f64);
                    }
                    ChannelKind::Clock => assert!(*value > 0.0),
                }
            }
        }
    }

    #[test]
    fn timing_from_config_seconds() {
        let t = SourceTiming::from_secs(0.1, -3.0);
        assert!((t.update_rate.as_secs_f64() - 0.1).abs() < 1e-9);
        assert_eq!(t.retry_delay, MIN_RETRY_DELAY);

        let t = SourceTiming::from_secs(0.0, 0.0);
        assert_eq!(t.update_rate, Duration::ZERO);
        assert_eq!(t.retry_delay, MIN_RETRY_DELAY);

        let t = SourceTiming::from_secs(f64::NAN, 2.5);
        assert_eq!(t.update_rate, Duration::ZERO);
        assert_eq!(t.retry_delay, Duration::from_millis(2500));
    }
}
