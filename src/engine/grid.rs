//! Deformed grid-cell geometry for a rectangular world region.

use serde::Serialize;

use crate::geom::Point2;

/// Upper bound on grid lines per axis; the step doubles until the region fits.
pub const MAX_GRID_LINES: usize = 256;

/// Deformed grid nodes over a world rectangle, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCells {
    /// World-space spacing of the undeformed lattice.
    pub step: f64,
    /// Lattice index of the first node along x and y.
    pub first_index: (i64, i64),
    /// Nodes per row.
    pub columns: usize,
    /// Nodes per column.
    pub rows: usize,
    pub points: Vec<Point2>,
}

impl GridCells {
    #[must_use]
    pub fn node(&self, column: usize, row: usize) -> Option<Point2> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.points.get(row * self.columns + column).copied()
    }

    /// Corners of the cell whose lower-left node is `(column, row)`,
    /// counter-clockwise.
    #[must_use]
    pub fn cell(&self, column: usize, row: usize) -> Option<[Point2; 4]> {
        Some([
            self.node(column, row)?,
            self.node(column + 1, row)?,
            self.node(column + 1, row + 1)?,
            self.node(column, row + 1)?,
        ])
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.columns.saturating_sub(1) * self.rows.saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Builds the lattice of multiples of `step` covering `[min, max]` and maps
/// every node through `map`.
pub fn build_grid_cells(min: Point2, max: Point2, step: f64, map: impl Fn(Point2) -> Point2) -> GridCells {
    let empty = GridCells {
        step,
        first_index: (0, 0),
        columns: 0,
        rows: 0,
        points: Vec::new(),
    };
    if !(step.is_finite() && step > 0.0 && min.is_finite() && max.is_finite()) {
        return empty;
    }
    let (lo, hi) = (
        Point2::new(min.x.min(max.x), min.y.min(max.y)),
        Point2::new(min.x.max(max.x), min.y.max(max.y)),
    );

    let mut step = step;
    let (i0, j0, columns, rows) = loop {
        let i0 = (lo.x / step).floor();
        let j0 = (lo.y / step).floor();
        let columns = ((hi.x / step).ceil() - i0) as usize + 1;
        let rows = ((hi.y / step).ceil() - j0) as usize + 1;
        if columns <= MAX_GRID_LINES && rows <= MAX_GRID_LINES {
            break (i0, j0, columns, rows);
        }
        step *= 2.0;
    };

    let mut points = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        let y = (j0 + row as f64) * step;
        for column in 0..columns {
            let x = (i0 + column as f64) * step;
            points.push(map(Point2::new(x, y)));
        }
    }

    GridCells {
        step,
        first_index: (i0 as i64, j0 as i64),
        columns,
        rows,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_region() {
        let grid = build_grid_cells(Point2::new(-15.0, -5.0), Point2::new(15.0, 5.0), 10.0, |p| p);
        assert_eq!(grid.first_index, (-2, -1));
        assert_eq!(grid.columns, 5);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.node(0, 0), Some(Point2::new(-20.0, -10.0)));
        assert_eq!(grid.node(4, 2), Some(Point2::new(20.0, 10.0)));
        assert_eq!(grid.node(5, 0), None);
        assert_eq!(grid.cell_count(), 8);
    }

    #[test]
    fn grid_cell_corners() {
        let grid = build_grid_cells(Point2::ORIGIN, Point2::new(10.0, 10.0), 10.0, |p| p);
        assert_eq!(
            grid.cell(0, 0),
            Some([
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ])
        );
        assert_eq!(grid.cell(1, 0), None);
    }

    #[test]
    fn grid_step_coarsens_for_huge_regions() {
        let grid = build_grid_cells(Point2::ORIGIN, Point2::new(1e5, 1e5), 1.0, |p| p);
        assert!(grid.columns <= MAX_GRID_LINES);
        assert!(grid.rows <= MAX_GRID_LINES);
        assert!(grid.step > 1.0);
    }

    #[test]
    fn grid_rejects_bad_step() {
        assert!(build_grid_cells(Point2::ORIGIN, Point2::new(1.0, 1.0), 0.0, |p| p).is_empty());
        assert!(build_grid_cells(Point2::ORIGIN, Point2::new(1.0, 1.0), f64::NAN, |p| p).is_empty());
    }
}
