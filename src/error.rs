//! Structured error types for infigrid.
//!
//! Three concerns, three enums:
//! - [`ConfigError`]: invalid construction parameters, fatal to setup only
//! - [`FetchError`]: per-cell content load failures, always handled locally
//! - [`GridError`]: crate-level wrapper used by fallible entry points

use std::time::Duration;

/// Invalid configuration detected while constructing a viewer or store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Tile edge length must be finite and strictly positive.
    #[error("tile size must be finite and > 0, got {0}")]
    TileSize(f64),

    /// Scale bounds must satisfy `0 < min <= max`.
    #[error("scale bounds must satisfy 0 < min <= max, got min={min} max={max}")]
    ScaleBounds { min: f64, max: f64 },

    /// Tiles must stay at least two pixels wide at the lowest zoom.
    #[error("tile_size * min_scale must be >= 2 pixels, got {0}")]
    TileTooSmall(f64),

    /// Segments need at least one slot per side.
    #[error("segment size must be > 0")]
    SegmentSize,

    /// Buffer margin must be finite and non-negative.
    #[error("buffer pixels must be finite and >= 0, got {0}")]
    BufferPixels(f64),

    /// Every fetch needs a positive upper bound.
    #[error("fetch timeout must be > 0")]
    FetchTimeout,
}

/// Why a cell ended up without an image.
///
/// None of these are fatal: the content loader swallows them and the cell
/// falls back to its blank state.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Response status outside `200..300`.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Response was not labelled as an image.
    #[error("unexpected content type {0:?}")]
    ContentType(Option<String>),

    /// Bytes could not be decoded as an image.
    #[error("image decode: {0}")]
    Decode(#[from] image::ImageError),

    /// Fetch did not finish within the configured bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure reported by the fetcher.
    #[error("transport: {0}")]
    Transport(String),

    /// The fetcher observed cancellation before producing a result.
    #[error("cancelled")]
    Cancelled,
}

/// All errors surfaced by infigrid's fallible entry points.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Invalid configuration.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// I/O error (reading config or script files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;
