//! Per-cell asynchronous content loading.
//!
//! Every bind (or explicit reload) of a cell mints a fresh [`ContentToken`].
//! The loader captures that token when it issues the fetch and hands it back
//! inside the [`Completion`]; the pool applies a completion only when the
//! cell still carries the same token. Anything else is stale and dropped,
//! whether or not the transport honoured the cancellation.

mod fetch;
mod loader;
mod synthetic;

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::coord::GridCoordinate;
use crate::error::FetchError;
use crate::pool::CellId;

pub use fetch::{decode_resource, FetchRequest, FetchedResource, ImageFetcher};
pub use loader::ContentLoader;
pub use synthetic::{SyntheticFetcher, DEFAULT_SYNTHETIC_TILE_PIXELS};

/// Decoded tile content, shared between the loader and the cell.
pub type TileImage = Arc<RgbaImage>;

/// Identifies one binding of one cell. Strictly increasing per pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentToken(pub(crate) u64);

impl ContentToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A load the pool wants issued for a freshly (re)bound cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub cell: CellId,
    pub coordinate: GridCoordinate,
    pub token: ContentToken,
}

/// Result of one fetch, tagged with the token captured at issuance.
#[derive(Debug)]
pub struct Completion {
    pub cell: CellId,
    pub token: ContentToken,
    pub result: Result<TileImage, FetchError>,
}

/// What applying a [`Completion`] did to its cell.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// Token matched and the image is now displayed.
    Applied,
    /// Token matched but the load failed; the cell shows its blank state.
    Failed(FetchError),
    /// The cell was rebound or removed since issuance; nothing changed.
    Stale,
}
