//! Common test utilities.
//!
//! Provides a scriptable fetcher and viewer constructors shared by the
//! integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use infigrid::{
    FetchError, FetchRequest, FetchedResource, GridConfig, GridCoordinate, GridViewer, Identity,
    ImageFetcher, SyntheticFetcher,
};

/// Edge length of tiles produced by [`ScriptedFetcher`].
pub const TILE_PIXELS: u32 = 4;

/// How a [`ScriptedFetcher`] answers one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// A valid PNG in the synthetic colour of the identity, after `delay`.
    Image { delay: Duration },
    /// A valid PNG with a non-success status.
    Status(u16),
    /// A valid PNG labelled with the given content type.
    ContentType(Option<String>),
    /// Bytes that are not an image, labelled `image/png`.
    Garbage,
    Transport(String),
    Cancelled,
    /// Never resolves; only the loader's timeout ends it.
    Hang,
}

impl Behavior {
    pub fn image() -> Self {
        Self::Image {
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(millis: u64) -> Self {
        Self::Image {
            delay: Duration::from_millis(millis),
        }
    }
}

/// Fetcher whose answers are chosen per identity, with a fallback.
#[derive(Debug)]
pub struct ScriptedFetcher {
    fallback: Behavior,
    overrides: Mutex<HashMap<Identity, Behavior>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new(fallback: Behavior) -> Arc<Self> {
        Arc::new(Self {
            fallback,
            overrides: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, identity: Identity, behavior: Behavior) {
        self.overrides.lock().unwrap().insert(identity, behavior);
    }

    /// Every request seen so far, in issue order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn behavior_for(&self, identity: Identity) -> Behavior {
        self.overrides
            .lock()
            .unwrap()
            .get(&identity)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

fn png_for(identity: Identity) -> Vec<u8> {
    SyntheticFetcher::encode_tile(identity, TILE_PIXELS).unwrap()
}

impl ImageFetcher for ScriptedFetcher {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> BoxFuture<'static, Result<FetchedResource, FetchError>> {
        let identity = request.identity;
        let behavior = self.behavior_for(identity);
        self.requests.lock().unwrap().push(request);

        async move {
            match behavior {
                Behavior::Image { delay } => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(FetchedResource::ok("image/png", png_for(identity)))
                }
                Behavior::Status(status) => Ok(FetchedResource {
                    status,
                    content_type: Some("image/png".to_string()),
                    body: png_for(identity),
                }),
                Behavior::ContentType(content_type) => Ok(FetchedResource {
                    status: 200,
                    content_type,
                    body: png_for(identity),
                }),
                Behavior::Garbage => Ok(FetchedResource::ok("image/png", b"<html>".to_vec())),
                Behavior::Transport(message) => Err(FetchError::Transport(message)),
                Behavior::Cancelled => Err(FetchError::Cancelled),
                Behavior::Hang => futures::future::pending().await,
            }
        }
        .boxed()
    }
}

/// Default configuration with the given buffer margin.
pub fn config_with_buffer(buffer_pixels: f64) -> GridConfig {
    GridConfig {
        buffer_pixels,
        ..GridConfig::default()
    }
}

/// Viewer of `width x height` pixels on the current tokio runtime.
pub fn viewer(
    config: GridConfig,
    fetcher: Arc<dyn ImageFetcher>,
    width: f64,
    height: f64,
) -> GridViewer {
    let mut viewer = GridViewer::new(config, fetcher, tokio::runtime::Handle::current()).unwrap();
    viewer.resize(width, height);
    viewer
}

/// Colour of pixel (0, 0) of the image shown at `coord`, if any.
pub fn shown_color(viewer: &GridViewer, coord: GridCoordinate) -> Option<[u8; 4]> {
    let image = viewer.pool().cell_at(coord)?.image()?;
    Some(image.get_pixel(0, 0).0)
}

/// Colour the synthetic tile for `coord` must have, given the viewer's identities.
pub fn expected_color(viewer: &GridViewer, coord: GridCoordinate) -> Option<[u8; 4]> {
    viewer
        .identities()
        .peek(coord)
        .map(SyntheticFetcher::color_for)
}
