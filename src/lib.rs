//! Telemetry dashboard crate root: re-exports and module wiring.
//!
//! - `sink`: reading types and the channel feeding the UI thread
//! - `source`: reading sources and the background poll thread
//! - `dispatch`: routing readings into rolling per-sensor buffers
//! - `layout`: the sensor → grid cell assignment
//! - `compare`: lap comparison curves and cursor readouts
//! - `data::setups`: car setup sheets and the fastest-setup pick
//! - `dashboard`: the three above behind one owner
//! - `persistence`, `config`: files on disk
//! - `app`: the egui/eframe desktop shell

pub mod app;
pub mod compare;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod layout;
pub mod persistence;
pub mod sink;
pub mod source;

pub use app::{run_dashboard, DashboardApp};
pub use compare::{ComparisonEngine, CursorReadout};
pub use config::{DashboardConfig, SourceConfig};
pub use dashboard::Dashboard;
pub use data::buffer::SensorBuffer;
pub use data::curve::{get_value_at, Curve, CurveKey};
pub use data::grid::{GridAssignment, GridCell};
pub use data::setups::{fastest_setup, simulate_setups, CarSetup};
pub use dispatch::Dispatcher;
pub use error::{
    CompareError, ConfigError, LayoutError, PersistenceError, SetupError, SourceError,
};
pub use events::{DashboardEvent, EventBus, EventFilter, EventKind};
pub use layout::{GridLayoutManager, LayoutRestore};
pub use sink::{channel_readings, ReadingBatch, ReadingSink, SensorId, SensorReading};
pub use source::{ReadingSource, SimulatedSource, SourceRunner, SourceTiming};
