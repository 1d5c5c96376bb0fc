//! Resource fetching for poster frames.
//!
//! The cloner only sees the [`BlobFetcher`] trait. The HTTP implementation is
//! gated behind the "fetch" feature flag; [`OfflineFetcher`] serves `data:`
//! URLs only.

#[cfg(feature = "fetch")]
mod http;

#[cfg(feature = "fetch")]
pub use http::HttpBlobFetcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::resource::{is_data_url, parse_data_url};

/// Passthrough settings for the fetch collaborator. The cloning core never
/// reads these itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// User-Agent header.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Append a timestamp query parameter to defeat HTTP caches.
    pub cache_bust: bool,
    /// Data URL served instead of a failed fetch.
    pub image_placeholder: Option<String>,
    /// Responses larger than this are rejected.
    pub max_response_bytes: usize,
    /// Document URL that relative resource URLs are resolved against.
    pub base_url: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("domshot/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            cache_bust: false,
            image_placeholder: None,
            max_response_bytes: 16 * 1024 * 1024,
            base_url: None,
        }
    }
}

impl FetchOptions {
    /// Load options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Raw bytes of a fetched resource plus the content type the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Fetches a resource as a blob. Errors propagate to the clone caller as-is.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch_blob(&self, url: &str, options: &FetchOptions) -> Result<FetchedBlob, FetchError>;
}

/// Fetcher without network access. Only `data:` URLs resolve.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

#[async_trait]
impl BlobFetcher for OfflineFetcher {
    async fn fetch_blob(&self, url: &str, options: &FetchOptions) -> Result<FetchedBlob, FetchError> {
        if is_data_url(url) {
            return blob_from_data_url(url);
        }
        match &options.image_placeholder {
            Some(placeholder) => blob_from_data_url(placeholder),
            None => Err(FetchError::Network(format!(
                "network access disabled, cannot fetch {}",
                url
            ))),
        }
    }
}

pub(crate) fn blob_from_data_url(url: &str) -> Result<FetchedBlob, FetchError> {
    let decoded = parse_data_url(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    Ok(FetchedBlob {
        bytes: decoded.bytes,
        content_type: decoded.mime,
    })
}
