//! Layout engine for the infinite grid.
//!
//! This module handles:
//! - Viewport state (pan offset, zoom scale, committed gesture baselines)
//! - Converting grid coordinates to pixel rectangles and back
//! - Computing the window of coordinates that must be on screen

mod rect;
mod viewport;
mod window;

pub use rect::PixelRect;
pub use viewport::ViewportState;
pub use window::{compute_window, VisibleWindow};
