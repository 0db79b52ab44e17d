//! Sparse, unbounded 2-D store backed by lazily allocated fixed-size segments.
//!
//! The grid is carved into `N×N` segments keyed by
//! `(floor(column / N), floor(row / N))`. A segment is allocated on the first
//! write that lands in it and is never freed; reads of untouched regions
//! return `None` without allocating. Memory is therefore proportional to the
//! number of distinct segments ever written, not to coordinate magnitude.

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::coord::{floor_div, floor_mod, GridCoordinate};
use crate::error::ConfigError;

/// Key of one segment in segment space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub column: i64,
    pub row: i64,
}

/// Position of a coordinate inside its segment; both parts are in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalIndex {
    pub column: usize,
    pub row: usize,
}

/// One `N×N` block of optional payload slots, stored column-major.
struct Segment<T> {
    slots: Box<[Option<T>]>,
}

impl<T> Segment<T> {
    fn empty(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }
}

/// Infinite map from [`GridCoordinate`] to `T`.
pub struct SegmentedGrid<T> {
    segment_size: NonZeroU32,
    segments: HashMap<SegmentKey, Segment<T>>,
}

impl<T> SegmentedGrid<T> {
    /// Create an empty grid with `segment_size × segment_size` segments.
    ///
    /// # Errors
    /// Returns [`ConfigError::SegmentSize`] when `segment_size` is zero.
    pub fn new(segment_size: u32) -> Result<Self, ConfigError> {
        let segment_size = NonZeroU32::new(segment_size).ok_or(ConfigError::SegmentSize)?;
        Ok(Self::with_segment_size(segment_size))
    }

    pub fn with_segment_size(segment_size: NonZeroU32) -> Self {
        Self {
            segment_size,
            segments: HashMap::new(),
        }
    }

    /// Edge length of one segment.
    pub fn segment_size(&self) -> u32 {
        self.segment_size.get()
    }

    /// Number of segments allocated so far.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment containing `coord`, using floor division on both axes.
    pub fn segment_key(&self, coord: GridCoordinate) -> SegmentKey {
        let n = i64::from(self.segment_size.get());
        SegmentKey {
            column: floor_div(coord.column, n),
            row: floor_div(coord.row, n),
        }
    }

    /// Slot of `coord` within its segment, using a true modulo on both axes.
    pub fn local_index(&self, coord: GridCoordinate) -> LocalIndex {
        let n = i64::from(self.segment_size.get());
        // rem_euclid with a positive divisor is in [0, n)
        LocalIndex {
            column: usize::try_from(floor_mod(coord.column, n)).unwrap_or(0),
            row: usize::try_from(floor_mod(coord.row, n)).unwrap_or(0),
        }
    }

    fn slot_offset(&self, local: LocalIndex) -> usize {
        local.column * self.side() + local.row
    }

    fn side(&self) -> usize {
        usize::try_from(self.segment_size.get()).unwrap_or(1)
    }

    /// Value stored at `coord`, if any. Never allocates.
    pub fn get(&self, coord: GridCoordinate) -> Option<&T> {
        let segment = self.segments.get(&self.segment_key(coord))?;
        let offset = self.slot_offset(self.local_index(coord));
        segment.slots.get(offset)?.as_ref()
    }

    /// Whether a value is stored at `coord`.
    pub fn contains(&self, coord: GridCoordinate) -> bool {
        self.get(coord).is_some()
    }

    /// Store `value` at `coord`, allocating the segment if needed.
    /// Returns the previous value.
    pub fn set(&mut self, coord: GridCoordinate, value: T) -> Option<T> {
        self.slot_mut(coord).replace(value)
    }

    /// Clear the slot at `coord`. The segment itself stays allocated.
    pub fn remove(&mut self, coord: GridCoordinate) -> Option<T> {
        let key = self.segment_key(coord);
        let offset = self.slot_offset(self.local_index(coord));
        self.segments
            .get_mut(&key)
            .and_then(|segment| segment.slots.get_mut(offset))
            .and_then(Option::take)
    }

    /// Value at `coord`, inserting the result of `make` first if the slot is empty.
    pub fn get_or_insert_with(
        &mut self,
        coord: GridCoordinate,
        make: impl FnOnce() -> T,
    ) -> &T {
        self.slot_mut(coord).get_or_insert_with(make)
    }

    /// Slot for `coord`, allocating its segment on first touch.
    #[allow(clippy::indexing_slicing)] // Safe: local_index is in [0, N) on both axes
    fn slot_mut(&mut self, coord: GridCoordinate) -> &mut Option<T> {
        let key = self.segment_key(coord);
        let offset = self.slot_offset(self.local_index(coord));
        let len = self.side().saturating_mul(self.side());
        let segment = self
            .segments
            .entry(key)
            .or_insert_with(|| Segment::empty(len));
        &mut segment.slots[offset]
    }
}
