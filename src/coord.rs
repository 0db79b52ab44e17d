//! Integer grid coordinates for the unbounded grid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One cell position in the infinite grid.
///
/// Both axes range over all of `i64`, negative included. Ordering is
/// row-major so sorted collections iterate the way the grid is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub column: i64,
    pub row: i64,
}

impl GridCoordinate {
    /// The cell centred in the viewport when offset is zero.
    pub const ORIGIN: Self = Self { column: 0, row: 0 };

    pub const fn new(column: i64, row: i64) -> Self {
        Self { column, row }
    }

    /// Coordinate shifted by `(d_column, d_row)`, saturating at the `i64` limits.
    #[must_use]
    pub fn offset_by(self, d_column: i64, d_row: i64) -> Self {
        Self {
            column: self.column.saturating_add(d_column),
            row: self.row.saturating_add(d_row),
        }
    }
}

impl Ord for GridCoordinate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for GridCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.column, self.row)
    }
}

impl From<(i64, i64)> for GridCoordinate {
    fn from((column, row): (i64, i64)) -> Self {
        Self { column, row }
    }
}

/// Floor division for a positive divisor.
///
/// `div_euclid` equals floor division whenever the divisor is positive, which
/// is the only case the grid needs (`-25 / 20` is `-2`, not `-1`).
#[inline]
pub fn floor_div(value: i64, divisor: i64) -> i64 {
    value.div_euclid(divisor)
}

/// True modulo for a positive divisor; the result is always in `[0, divisor)`.
#[inline]
pub fn floor_mod(value: i64, divisor: i64) -> i64 {
    value.rem_euclid(divisor)
}
