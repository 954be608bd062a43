pub mod buffer;
pub mod curve;
pub mod grid;
pub mod laps;
pub mod sensors;
pub mod setups;
pub mod status;
