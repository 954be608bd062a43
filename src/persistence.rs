//! Layout persistence: save and load the grid assignment as JSON.
//!
//! The document is a single object keyed by sensor id:
//!
//! ```json
//! { "speed": { "row": 0, "column": 0, "rowSpan": 1, "colSpan": 2 } }
//! ```

use std::path::Path;

use crate::data::grid::GridAssignment;
use crate::error::{LayoutError, PersistenceError};
use crate::layout::{GridLayoutManager, LayoutRestore};
use crate::sink::SensorId;

/// Serialize an assignment as pretty JSON, keys in sensor order.
pub fn layout_to_json(layout: &GridAssignment) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(layout)?)
}

/// Parse a layout document. Only the shape is checked here; overlap and
/// span validation happen in [`GridLayoutManager::deserialize`].
pub fn layout_from_json(json: &str) -> Result<GridAssignment, PersistenceError> {
    Ok(serde_json::from_str(json)?)
}

/// Write the manager's current assignment to `path`, creating parent
/// directories as needed.
pub fn save_layout_to_path(grid: &GridLayoutManager, path: &Path) -> Result<(), PersistenceError> {
    let txt = layout_to_json(&grid.serialize())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, txt)?;
    tracing::info!(path = %path.display(), sensors = grid.len(), "layout saved");
    Ok(())
}

pub fn load_layout_from_path(path: &Path) -> Result<GridAssignment, PersistenceError> {
    let txt = std::fs::read_to_string(path)?;
    layout_from_json(&txt)
}

/// Restore the layout stored at `path` into `grid`.
///
/// A missing file auto-builds the grid from `fallback`. An unreadable,
/// malformed or inconsistent document is discarded as a whole and the grid
/// is auto-built from `fallback` as well.
pub fn restore_layout_from_path(
    grid: &mut GridLayoutManager,
    path: &Path,
    fallback: &[SensorId],
) -> LayoutRestore {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no saved layout, building default grid");
        grid.rebuild(fallback);
        return LayoutRestore::Fresh;
    }
    match load_layout_from_path(path) {
        Ok(data) => grid.restore_or_rebuild(data, fallback),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read saved layout");
            grid.rebuild(fallback);
            LayoutRestore::FellBack(LayoutError::InvalidLayout(e.to_string()))
        }
    }
}
