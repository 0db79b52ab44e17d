//! Integer pixel rectangles handed to the presentation surface.

use serde::{Deserialize, Serialize};

/// Rectangle in viewport pixels. Edges are half-open: `[x, x + width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    /// X position (left edge)
    pub x: i64,
    /// Y position (top edge)
    pub y: i64,
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl PixelRect {
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.height)
    }

    /// Centre point in fractional pixels.
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 * 0.5,
            self.y as f64 + self.height as f64 * 0.5,
        )
    }

    pub fn contains_point(&self, x: i64, y: i64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// True when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_half_open() {
        let rect = PixelRect::new(-10, 5, 20, 10);
        assert!(rect.contains_point(-10, 5));
        assert!(rect.contains_point(9, 14));
        assert!(!rect.contains_point(10, 5));
        assert!(!rect.contains_point(0, 15));
        assert_eq!(rect.center(), (0.0, 10.0));
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let left = PixelRect::new(0, 0, 100, 100);
        let right = PixelRect::new(100, 0, 100, 100);
        assert!(!left.intersects(&right));
        assert!(left.intersects(&PixelRect::new(99, 99, 5, 5)));
    }
}
