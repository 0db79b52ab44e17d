//! In-process fetcher that fabricates solid-colour PNG tiles.
//!
//! Stands in for the network collaborator in the CLI, benches and tests.
//! The colour is a pure function of the identity, so a decoded tile tells
//! you which request produced it.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use image::{ImageFormat, Rgba, RgbaImage};

use super::{FetchRequest, FetchedResource, ImageFetcher};
use crate::error::FetchError;
use crate::identity::Identity;

/// Edge length, in pixels, of generated tiles unless overridden.
pub const DEFAULT_SYNTHETIC_TILE_PIXELS: u32 = 16;

#[derive(Debug)]
pub struct SyntheticFetcher {
    tile_pixels: u32,
    latency: Duration,
    requests: AtomicU64,
}

impl Default for SyntheticFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_TILE_PIXELS)
    }
}

impl SyntheticFetcher {
    pub fn new(tile_pixels: u32) -> Self {
        Self {
            tile_pixels: tile_pixels.max(1),
            latency: Duration::ZERO,
            requests: AtomicU64::new(0),
        }
    }

    /// Delay every response by `latency` (tokio time).
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of fetches started so far.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Fill colour of the tile generated for `identity`.
    pub fn color_for(identity: Identity) -> [u8; 4] {
        let [r, g, b, ..] = identity.0.wrapping_mul(0x9E37_79B9_7F4A_7C15).to_le_bytes();
        [r, g, b, 255]
    }

    /// PNG bytes of the tile for `identity`.
    ///
    /// # Errors
    /// Propagates encoder failures as [`FetchError::Decode`].
    pub fn encode_tile(identity: Identity, tile_pixels: u32) -> Result<Vec<u8>, FetchError> {
        let fill = Rgba(Self::color_for(identity));
        let tile = RgbaImage::from_pixel(tile_pixels, tile_pixels, fill);
        let mut out = Cursor::new(Vec::new());
        tile.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

impl ImageFetcher for SyntheticFetcher {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> BoxFuture<'static, Result<FetchedResource, FetchError>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let latency = self.latency;
        let tile_pixels = self.tile_pixels;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Self::encode_tile(request.identity, tile_pixels)
                .map(|body| FetchedResource::ok("image/png", body))
        }
        .boxed()
    }
}
