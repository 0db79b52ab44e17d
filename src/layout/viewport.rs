//! Viewport state management for panning and zoom.
//!
//! Gestures are integrated against a frozen baseline: while a pan or pinch is
//! in progress the live value is `committed + delta`, and the baseline only
//! moves when the gesture ends. Deltas are cumulative since the gesture began,
//! so consecutive samples never compound.

use tracing::debug;

use super::PixelRect;
use crate::config::GridConfig;
use crate::coord::GridCoordinate;

/// Viewport state - the pan/zoom transform plus the viewport pixel size.
#[derive(Debug, Clone)]
pub struct ViewportState {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    committed_offset_x: f64,
    committed_offset_y: f64,
    committed_scale: f64,
    width: f64,
    height: f64,
    tile_size: f64,
    min_scale: f64,
    max_scale: f64,
    needs_layout: bool,
}

impl ViewportState {
    /// Create a viewport centred on the origin at scale 1 (clamped into bounds).
    ///
    /// `config` is assumed validated.
    pub fn new(config: &GridConfig) -> Self {
        let scale = 1.0_f64.clamp(config.min_scale, config.max_scale);
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale,
            committed_offset_x: 0.0,
            committed_offset_y: 0.0,
            committed_scale: scale,
            width: 0.0,
            height: 0.0,
            tile_size: config.tile_size,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            needs_layout: true,
        }
    }

    /// Live pan offset in grid space.
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Offset frozen at the end of the last pan gesture.
    pub fn committed_offset(&self) -> (f64, f64) {
        (self.committed_offset_x, self.committed_offset_y)
    }

    /// Live zoom factor, always within `[min_scale, max_scale]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale frozen at the end of the last pinch gesture.
    pub fn committed_scale(&self) -> f64 {
        self.committed_scale
    }

    pub fn scale_bounds(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Viewport size in pixels.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Whether offset, scale or size changed since the last layout pass.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn mark_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    /// Clear the dirty flag, returning its previous value.
    pub fn take_needs_layout(&mut self) -> bool {
        std::mem::replace(&mut self.needs_layout, false)
    }

    /// Resize the viewport. Negative or non-finite sizes collapse to zero.
    pub fn resize(&mut self, width: f64, height: f64) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        if (width - self.width).abs() > f64::EPSILON || (height - self.height).abs() > f64::EPSILON
        {
            self.width = width;
            self.height = height;
            self.needs_layout = true;
        }
    }

    /// Pan gesture update; `translation` is in pixels since the gesture began.
    pub fn on_pan_delta(&mut self, translation_x: f64, translation_y: f64) {
        if !(translation_x.is_finite() && translation_y.is_finite()) {
            debug!(translation_x, translation_y, "ignoring non-finite pan sample");
            return;
        }
        self.offset_x = self.committed_offset_x + translation_x / self.scale;
        self.offset_y = self.committed_offset_y + translation_y / self.scale;
        self.needs_layout = true;
    }

    /// Pan gesture ended (or was cancelled): the live offset becomes the baseline.
    pub fn on_pan_end(&mut self) {
        self.committed_offset_x = self.offset_x;
        self.committed_offset_y = self.offset_y;
    }

    /// Pinch gesture update; `factor` is cumulative since the gesture began.
    pub fn on_zoom_delta(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            debug!(factor, "ignoring invalid pinch factor");
            return;
        }
        self.scale = (self.committed_scale * factor).clamp(self.min_scale, self.max_scale);
        self.needs_layout = true;
    }

    /// Pinch gesture ended: the live scale becomes the baseline.
    pub fn on_zoom_end(&mut self) {
        self.committed_scale = self.scale;
    }

    /// Jump so `coord` sits in the middle of the viewport. Commits immediately.
    #[allow(clippy::cast_precision_loss)]
    pub fn center_on(&mut self, coord: GridCoordinate) {
        self.offset_x = -self.tile_size * coord.column as f64;
        self.offset_y = -self.tile_size * coord.row as f64;
        self.committed_offset_x = self.offset_x;
        self.committed_offset_y = self.offset_y;
        self.needs_layout = true;
    }

    /// Back to the origin at scale 1 (clamped). Commits immediately.
    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.committed_offset_x = 0.0;
        self.committed_offset_y = 0.0;
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
        self.committed_scale = self.scale;
        self.needs_layout = true;
    }

    /// Tile edge length in whole pixels at the current scale, at least 1.
    ///
    /// Never larger than any rect width from [`Self::rect_for`], so windows
    /// sized from it cannot under-cover.
    pub fn scaled_tile_size(&self) -> f64 {
        (self.tile_size * self.scale).floor().max(1.0)
    }

    /// Pixel rectangle of `coord`.
    ///
    /// Column/row 0 is centred on the viewport centre when the offset is zero.
    /// Both edges are floored from the same transform, so a tile's right edge
    /// is its neighbour's left edge and widths vary by at most one pixel.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rect_for(&self, coord: GridCoordinate) -> PixelRect {
        let left = self.edge_x(coord.column);
        let top = self.edge_y(coord.row);
        let right = self.edge_x(coord.column.saturating_add(1));
        let bottom = self.edge_y(coord.row.saturating_add(1));

        PixelRect::new(
            left as i64,
            top as i64,
            (right - left) as i64,
            (bottom - top) as i64,
        )
    }

    /// Floored pixel x of the left edge of `column`.
    #[allow(clippy::cast_precision_loss)]
    fn edge_x(&self, column: i64) -> f64 {
        let absolute = self.tile_size * (column as f64 - 0.5);
        ((absolute + self.offset_x) * self.scale + self.width * 0.5).floor()
    }

    /// Floored pixel y of the top edge of `row`.
    #[allow(clippy::cast_precision_loss)]
    fn edge_y(&self, row: i64) -> f64 {
        let absolute = self.tile_size * (row as f64 - 0.5);
        ((absolute + self.offset_y) * self.scale + self.height * 0.5).floor()
    }

    /// Coordinate of the tile containing the pixel `(x, y)`; inverse of [`Self::rect_for`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn coord_for(&self, x: f64, y: f64) -> GridCoordinate {
        let grid_x = (x - self.width * 0.5) / self.scale - self.offset_x;
        let grid_y = (y - self.height * 0.5) / self.scale - self.offset_y;

        GridCoordinate::new(
            (grid_x / self.tile_size + 0.5).floor() as i64,
            (grid_y / self.tile_size + 0.5).floor() as i64,
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn viewport() -> ViewportState {
        let mut vp = ViewportState::new(&GridConfig::default());
        vp.resize(800.0, 600.0);
        vp
    }

    #[test]
    fn test_origin_is_centred() {
        let vp = viewport();
        assert_eq!(vp.rect_for(GridCoordinate::ORIGIN), PixelRect::new(350, 250, 100, 100));
        assert_eq!(vp.coord_for(400.0, 300.0), GridCoordinate::ORIGIN);
    }

    #[test]
    fn test_pan_composes_without_drift() {
        let mut vp = viewport();
        vp.on_pan_delta(10.0, 0.0);
        vp.on_pan_delta(20.0, 0.0);
        vp.on_pan_delta(30.0, 5.0);
        vp.on_pan_end();
        assert_eq!(vp.offset(), (30.0, 5.0));

        vp.on_pan_delta(-10.0, 0.0);
        assert_eq!(vp.offset(), (20.0, 5.0));
        assert_eq!(vp.committed_offset(), (30.0, 5.0));
    }

    #[test]
    fn test_pan_translation_is_divided_by_scale() {
        let mut vp = viewport();
        vp.on_zoom_delta(2.0);
        vp.on_zoom_end();
        vp.on_pan_delta(100.0, -50.0);
        assert_eq!(vp.offset(), (50.0, -25.0));
    }

    #[test]
    fn test_zoom_clamps_and_commits() {
        let mut vp = viewport();
        vp.on_zoom_delta(10.0);
        assert_eq!(vp.scale(), 4.0);
        vp.on_zoom_end();
        vp.on_zoom_delta(0.01);
        assert_eq!(vp.scale(), 0.5);
        assert_eq!(vp.committed_scale(), 4.0);
    }

    #[test]
    fn test_invalid_samples_are_ignored() {
        let mut vp = viewport();
        vp.take_needs_layout();
        vp.on_zoom_delta(f64::NAN);
        vp.on_zoom_delta(-1.0);
        vp.on_pan_delta(f64::INFINITY, 0.0);
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.offset(), (0.0, 0.0));
        assert!(!vp.needs_layout());
    }

    #[test]
    fn test_center_on() {
        let mut vp = viewport();
        let target = GridCoordinate::new(-12, 40);
        vp.center_on(target);
        assert_eq!(vp.coord_for(400.0, 300.0), target);
    }
}
