//! Dashboard configuration, loaded from a JSON or YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::buffer::DEFAULT_CAPACITY;
use crate::data::status::StatusThresholds;
use crate::error::ConfigError;
use crate::source::SourceTiming;

/// Where readings come from and how often they are polled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub api_endpoint: String,
    /// Seconds between successful polls.
    pub update_rate: f64,
    /// Seconds to wait after a failed poll.
    pub retry_delay: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "YOUR_API_ENDPOINT_HERE".to_string(),
            update_rate: 0.1,
            retry_delay: 1.0,
        }
    }
}

impl SourceConfig {
    pub fn timing(&self) -> SourceTiming {
        SourceTiming::from_secs(self.update_rate, self.retry_delay)
    }
}

/// Top-level configuration of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    /// Points kept per sensor in the live view.
    pub buffer_capacity: usize,
    /// Persisted grid layout, restored on start and written on exit.
    pub layout_path: Option<PathBuf>,
    /// Number of recorded laps offered for comparison.
    pub lap_count: usize,
    pub status_thresholds: StatusThresholds,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            buffer_capacity: DEFAULT_CAPACITY,
            layout_path: Some(PathBuf::from("layout.json")),
            lap_count: 20,
            status_thresholds: StatusThresholds::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse `path`. Files ending in `.yaml`/`.yml` are read as YAML,
    /// everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let txt = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if is_yaml(path) {
            Self::from_yaml(&txt)
        } else {
            Self::from_json(&txt)
        }
    }

    /// Like [`DashboardConfig::load`], but a missing file yields the
    /// defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "configuration not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_json(txt: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(txt)?)
    }

    pub fn from_yaml(txt: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(txt)?)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::status::StatusLevel;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = DashboardConfig::from_json(r#"{"source": {"update_rate": 0.5}}"#).unwrap();
        assert_eq!(cfg.source.update_rate, 0.5);
        assert_eq!(cfg.source.retry_delay, 1.0);
        assert_eq!(cfg.buffer_capacity, 100);
        assert_eq!(cfg.lap_count, 20);
    }

    #[test]
    fn yaml_thresholds() {
        let cfg = DashboardConfig::from_yaml(
            "lap_count: 5\nstatus_thresholds:\n  ecu_oil_temp: [10, 20, 30, 40]\n",
        )
        .unwrap();
        assert_eq!(cfg.lap_count, 5);
        assert_eq!(
            cfg.status_thresholds.thresholds_for("ecu_oil_temp"),
            Some(&[10.0, 20.0, 30.0, 40.0][..])
        );
        assert_eq!(
            cfg.status_thresholds.classify("ecu_oil_temp", 25.0),
            Some(StatusLevel::Warm)
        );
        assert_eq!(cfg.status_thresholds.classify("ecu_rpm", 25.0), None);
    }

    #[test]
    fn extension_picks_format() {
        assert!(is_yaml(Path::new("dash.YML")));
        assert!(!is_yaml(Path::new("dash.json")));
        assert!(!is_yaml(Path::new("dash")));
    }
}
