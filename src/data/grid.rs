//! Grid placement primitives: cells, the overlap rule and the auto-layout
//! geometry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sink::SensorId;

/// A rectangular region of the display grid.
///
/// Serialized as `{"row", "column", "rowSpan", "colSpan"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl GridCell {
    /// A 1x1 cell.
    pub const fn at(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            col_span: 1,
        }
    }

    pub const fn spanning(row: usize, column: usize, row_span: usize, col_span: usize) -> Self {
        Self {
            row,
            column,
            row_span,
            col_span,
        }
    }

    /// Spans must be at least one and the far edges must be addressable.
    pub fn is_valid(&self) -> bool {
        self.row_span >= 1
            && self.col_span >= 1
            && self.row.checked_add(self.row_span).is_some()
            && self.column.checked_add(self.col_span).is_some()
    }

    /// Exclusive end row, saturating for cells that fail [`Self::is_valid`].
    pub fn row_end(&self) -> usize {
        self.row.saturating_add(self.row_span)
    }

    /// Exclusive end column, saturating like [`Self::row_end`].
    pub fn col_end(&self) -> usize {
        self.column.saturating_add(self.col_span)
    }

    /// Whether two cells share any grid square.
    pub fn overlaps(&self, other: &GridCell) -> bool {
        !(self.row_end() <= other.row
            || other.row_end() <= self.row
            || self.col_end() <= other.column
            || other.col_end() <= self.column)
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        row >= self.row && row < self.row_end() && column >= self.column && column < self.col_end()
    }
}

/// Sensor → cell mapping, ordered by sensor id.
pub type GridAssignment = BTreeMap<SensorId, GridCell>;

/// Auto-layout geometry for `n` plots: `rows = ceil(sqrt(n))`,
/// `cols = ceil(n / rows)`. Returns `(0, 0)` for `n == 0`.
pub fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    // integer ceil(sqrt(n)); float sqrt alone can be off by one for large n
    let mut rows = (n as f64).sqrt() as usize;
    while rows * rows < n {
        rows += 1;
    }
    while rows > 1 && (rows - 1) * (rows - 1) >= n {
        rows -= 1;
    }
    let cols = n.div_ceil(rows);
    (rows, cols)
}

/// Row-major auto placement of `index` in a grid with `cols` columns.
pub fn auto_cell(index: usize, cols: usize) -> GridCell {
    let cols = cols.max(1);
    GridCell::at(index / cols, index % cols)
}

/// First pair of overlapping cells, in iteration order.
pub fn first_conflict<'a, I>(cells: I) -> Option<(SensorId, SensorId)>
where
    I: IntoIterator<Item = (&'a SensorId, &'a GridCell)>,
{
    let cells: Vec<(&SensorId, &GridCell)> = cells.into_iter().collect();
    for (i, (a, ca)) in cells.iter().enumerate() {
        for (b, cb) in cells.iter().skip(i + 1) {
            if ca.overlaps(cb) {
                return Some(((*a).clone(), (*b).clone()));
            }
        }
    }
    None
}

/// Bounding `(rows, cols)` of a set of cells.
pub fn extent<'a, I>(cells: I) -> (usize, usize)
where
    I: IntoIterator<Item = &'a GridCell>,
{
    cells.into_iter().fold((0, 0), |(r, c), cell| {
        (r.max(cell.row_end()), c.max(cell.col_end()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_overlap_detected() {
        let a = GridCell::spanning(0, 0, 1, 2);
        let b = GridCell::at(0, 1);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = GridCell::spanning(0, 0, 2, 2);
        assert!(!a.overlaps(&GridCell::at(0, 2)));
        assert!(!a.overlaps(&GridCell::at(2, 0)));
        assert!(a.overlaps(&GridCell::at(1, 1)));
    }

    #[test]
    fn dims_follow_square_rule() {
        assert_eq!(grid_dims(0), (0, 0));
        assert_eq!(grid_dims(1), (1, 1));
        assert_eq!(grid_dims(2), (2, 1));
        assert_eq!(grid_dims(3), (2, 2));
        assert_eq!(grid_dims(4), (2, 2));
        assert_eq!(grid_dims(5), (3, 2));
        assert_eq!(grid_dims(7), (3, 3));
        assert_eq!(grid_dims(10), (4, 3));
        assert_eq!(grid_dims(16), (4, 4));
        assert_eq!(grid_dims(17), (5, 4));
    }

    #[test]
    fn serde_uses_camel_case_spans() {
        let json = serde_json::to_string(&GridCell::spanning(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"row":1,"column":2,"rowSpan":3,"colSpan":4}"#);
    }

    #[test]
    fn far_edge_must_fit_usize() {
        assert!(GridCell::spanning(usize::MAX - 1, 0, 1, 1).is_valid());
        assert!(!GridCell::spanning(usize::MAX, 0, 1, 1).is_valid());
        assert!(!GridCell::spanning(0, usize::MAX, 1, 2).is_valid());
        assert!(!GridCell::spanning(0, 0, 0, 1).is_valid());

        let huge = GridCell::spanning(usize::MAX, 0, 2, 1);
        assert_eq!(huge.row_end(), usize::MAX);
        assert!(!huge.overlaps(&GridCell::at(0, 0)));
    }

    #[test]
    fn extent_covers_spans() {
        let cells = [GridCell::spanning(0, 0, 1, 3), GridCell::at(2, 0)];
        assert_eq!(extent(cells.iter()), (3, 3));
    }
}
