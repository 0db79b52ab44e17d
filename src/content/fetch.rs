//! Fetcher contract and response validation.

use futures::future::BoxFuture;
use image::RgbaImage;

use crate::error::FetchError;
use crate::identity::Identity;

/// What the loader asks the network collaborator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub identity: Identity,
    /// Locator produced by the identity source (a URL for HTTP fetchers).
    pub locator: String,
}

/// Raw response from a fetcher, validated by [`decode_resource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// A `200` response with the given content type.
    pub fn ok(content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body,
        }
    }
}

/// Network collaborator: resolves a request to raw bytes.
///
/// Implementations run on the loader's tokio runtime and must not touch
/// layout state. Dropping the returned future is the cancellation signal;
/// honouring it promptly is optional.
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> BoxFuture<'static, Result<FetchedResource, FetchError>>;
}

/// Check status and content type, then decode the body into RGBA pixels.
///
/// # Errors
/// [`FetchError::Status`] outside `200..300`, [`FetchError::ContentType`] when
/// the type is missing or not `image/*`, [`FetchError::Decode`] when the bytes
/// are not a supported image.
pub fn decode_resource(resource: &FetchedResource) -> Result<RgbaImage, FetchError> {
    if !(200..300).contains(&resource.status) {
        return Err(FetchError::Status(resource.status));
    }
    let is_image = resource
        .content_type
        .as_deref()
        .is_some_and(|mime| mime.trim_start().to_ascii_lowercase().starts_with("image"));
    if !is_image {
        return Err(FetchError::ContentType(resource.content_type.clone()));
    }
    Ok(image::load_from_memory(&resource.body)?.to_rgba8())
}
