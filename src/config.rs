//! Viewer configuration.
//!
//! Every field has a default so a JSON config file only needs to name the
//! values it overrides. Call [`GridConfig::validate`] (done by
//! `GridViewer::new`) before using a hand-built config.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default tile edge length in logical pixels.
pub const DEFAULT_TILE_SIZE: f64 = 100.0;

/// Default lower zoom bound.
pub const DEFAULT_MIN_SCALE: f64 = 0.5;

/// Default upper zoom bound.
pub const DEFAULT_MAX_SCALE: f64 = 4.0;

/// Smallest on-screen tile edge, in pixels, a config may produce.
///
/// Below two pixels a floored rect can no longer contain its own centre.
pub const MIN_SCALED_TILE_PIXELS: f64 = 2.0;

/// Default segment edge length for the sparse grid store.
pub const DEFAULT_SEGMENT_SIZE: u32 = 20;

/// Default fetch upper bound in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Default locator template, `{id}` is replaced with the cell identity.
pub const DEFAULT_URL_TEMPLATE: &str = "https://picsum.photos/seed/{id}/100";

/// Tunables for a grid viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tile edge length in logical pixels at scale 1.
    pub tile_size: f64,
    /// Lower zoom bound.
    pub min_scale: f64,
    /// Upper zoom bound.
    pub max_scale: f64,
    /// Edge length of one sparse store segment.
    pub segment_size: u32,
    /// Extra margin, in pixels, kept populated around the viewport.
    pub buffer_pixels: f64,
    /// Upper bound for a single fetch.
    pub fetch_timeout_ms: u64,
    /// Locator template handed to the fetcher.
    pub url_template: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            segment_size: DEFAULT_SEGMENT_SIZE,
            buffer_pixels: 0.0,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl GridConfig {
    /// Parse a JSON document and validate it.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values are out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails [`Self::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every bound.
    ///
    /// # Errors
    /// Returns the first violated bound.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::TileSize(self.tile_size));
        }
        let scales_ok = self.min_scale.is_finite()
            && self.max_scale.is_finite()
            && self.min_scale > 0.0
            && self.min_scale <= self.max_scale;
        if !scales_ok {
            return Err(ConfigError::ScaleBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        let smallest_tile = self.tile_size * self.min_scale;
        if smallest_tile < MIN_SCALED_TILE_PIXELS {
            return Err(ConfigError::TileTooSmall(smallest_tile));
        }
        if self.segment_size == 0 {
            return Err(ConfigError::SegmentSize);
        }
        if !(self.buffer_pixels.is_finite() && self.buffer_pixels >= 0.0) {
            return Err(ConfigError::BufferPixels(self.buffer_pixels));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::FetchTimeout);
        }
        Ok(())
    }

    /// Fetch upper bound as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
