//! Error types shared across the dashboard core.
//!
//! Every failure in the core is local and recoverable: operations that fail
//! leave the previous valid state in place and report one of these errors
//! to the caller (usually the UI layer).

use thiserror::Error;

use crate::sink::SensorId;

/// Failures of the grid layout manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Two sensors would occupy overlapping cells.
    #[error("placement conflict: '{first}' overlaps '{second}'")]
    PlacementConflict { first: SensorId, second: SensorId },
    /// Swap/placement references a sensor with no current assignment.
    #[error("unknown sensor '{0}': it has no grid assignment")]
    UnknownSensor(SensorId),
    /// A cell with a zero span, or one whose far edge overflows the grid.
    #[error("invalid cell for '{sensor}': spans must be at least 1 and the cell must fit the grid")]
    InvalidCell { sensor: SensorId },
    /// A persisted layout failed validation.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

/// Failures of a comparison request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("select at least one lap to compare")]
    NoLapsSelected,
    #[error("select at least one sensor to compare")]
    NoSensorsSelected,
}

/// Failures of the setup comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("no setup data: simulate setups before comparing")]
    NoData,
}

/// Failures while loading the dashboard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures while saving or restoring a persisted layout.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("layout file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed layout document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Failures reported by a reading source. The core never sees these; the
/// source runner logs them and retries.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed reading batch: {0}")]
    Malformed(String),
}
