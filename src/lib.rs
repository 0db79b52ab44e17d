//! infigrid - an infinite, pannable, zoomable grid of remotely loaded tiles
//!
//! Only the tiles near the viewport are ever materialised:
//! - a pan/zoom transform maps integer grid coordinates to pixel rectangles
//! - a visible window (plus a pixel buffer) decides which coordinates must exist
//! - a recycling pool keeps as many display cells as the window needs, reusing
//!   cells that scrolled away instead of allocating new ones
//! - every bind starts an async fetch tagged with a token, so late results for
//!   a cell that has since moved are dropped
//! - a segmented sparse store assigns each coordinate a stable identity
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use infigrid::{GridConfig, GridViewer, SyntheticFetcher};
//!
//! # async fn run() -> infigrid::Result<()> {
//! let fetcher = Arc::new(SyntheticFetcher::default());
//! let runtime = tokio::runtime::Handle::current();
//! let mut viewer = GridViewer::new(GridConfig::default(), fetcher, runtime)?;
//! viewer.resize(800.0, 600.0);
//! viewer.layout();
//! viewer.settle().await;
//! for frame in viewer.frames() {
//!     println!("{} at {:?}", frame.coordinate, frame.rect);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod coord;
pub mod error;
pub mod identity;
pub mod layout;
pub mod pool;
pub mod segmented;
pub mod viewer;

pub use config::GridConfig;
pub use content::{ContentToken, FetchRequest, FetchedResource, ImageFetcher, SyntheticFetcher};
pub use coord::GridCoordinate;
pub use error::{ConfigError, FetchError, GridError, Result};
pub use identity::{Identity, IdentitySource, StableIdentitySource};
pub use layout::{compute_window, PixelRect, ViewportState, VisibleWindow};
pub use pool::{Cell, CellId, CellPool, LoadState};
pub use segmented::SegmentedGrid;
pub use viewer::{CellFrame, GestureEvent, GridViewer, LayoutReport, PumpReport, ViewerStats};

/// Version of the library.
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
