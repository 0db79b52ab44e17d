//! Visible window calculation.

use std::ops::Range;

use serde::Serialize;

use super::ViewportState;
use crate::coord::GridCoordinate;

/// Half-open column and row ranges that must be populated this layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct VisibleWindow {
    pub columns: Range<i64>,
    pub rows: Range<i64>,
}

impl VisibleWindow {
    pub fn new(columns: Range<i64>, rows: Range<i64>) -> Self {
        Self { columns, rows }
    }

    pub fn contains(&self, coord: GridCoordinate) -> bool {
        self.columns.contains(&coord.column) && self.rows.contains(&coord.row)
    }

    pub fn column_count(&self) -> usize {
        span(&self.columns)
    }

    pub fn row_count(&self) -> usize {
        span(&self.rows)
    }

    /// Number of coordinates in the window.
    pub fn len(&self) -> usize {
        self.column_count().saturating_mul(self.row_count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every coordinate of the window, row-major.
    pub fn iter(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.rows.clone().flat_map(move |row| {
            self.columns
                .clone()
                .map(move |column| GridCoordinate::new(column, row))
        })
    }
}

fn span(range: &Range<i64>) -> usize {
    usize::try_from(range.end.saturating_sub(range.start)).unwrap_or(0)
}

/// Coordinates that must be on screen for `viewport`, plus `buffer_pixels`
/// of margin on every side.
///
/// The window is anchored on the tile under the top-left pixel and sized from
/// the floored tile size, so its extent depends on pixel size, scale and
/// buffer only. Two extra tiles per axis cover partial tiles at both edges;
/// bounds are always rounded outward.
#[allow(clippy::cast_possible_truncation)]
pub fn compute_window(viewport: &ViewportState, buffer_pixels: f64) -> VisibleWindow {
    let scaled_tile = viewport.scaled_tile_size();
    let buffer = if buffer_pixels.is_finite() {
        buffer_pixels.max(0.0)
    } else {
        0.0
    };
    let extra_tiles = (buffer / scaled_tile).ceil() as i64;

    let (width, height) = viewport.size();
    let top_left = viewport.coord_for(0.0, 0.0);
    let margin = extra_tiles.saturating_add(1).saturating_mul(2);
    let columns = ((width / scaled_tile).ceil() as i64).saturating_add(margin);
    let rows = ((height / scaled_tile).ceil() as i64).saturating_add(margin);

    let first = top_left.offset_by(-extra_tiles, -extra_tiles);

    VisibleWindow {
        columns: first.column..first.column.saturating_add(columns),
        rows: first.row..first.row.saturating_add(rows),
    }
}
