//! HTTP blob fetching via reqwest.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::{ParseError, Url};

use super::{blob_from_data_url, BlobFetcher, FetchOptions, FetchedBlob};
use crate::error::FetchError;
use crate::resource::is_data_url;

/// Fallback when the server sends no Content-Type.
const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Fetches resources over HTTP(S). `data:` URLs are decoded locally.
#[derive(Debug, Clone, Default)]
pub struct HttpBlobFetcher {
    client: Option<Client>,
}

impl HttpBlobFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a preconfigured client. Its settings take precedence over
    /// `user_agent` and `timeout_secs` in [`FetchOptions`].
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client_for(&self, options: &FetchOptions) -> Result<Client, FetchError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        Client::builder()
            .user_agent(&options.user_agent)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    async fn fetch_remote(&self, url: &str, options: &FetchOptions) -> Result<FetchedBlob, FetchError> {
        let mut parsed = resolve_url(url, options.base_url.as_deref())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }
        if options.cache_bust {
            cache_bust(&mut parsed);
        }

        let response = self
            .client_for(options)?
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpError(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string());

        let limit = options.max_response_bytes;
        if let Some(len) = response.content_length() {
            if len as usize > limit {
                return Err(FetchError::TooLarge {
                    size: len as usize,
                    limit,
                });
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if bytes.len() > limit {
            return Err(FetchError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }

        Ok(FetchedBlob {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

/// Parse `url`, joining it onto `base` when it is relative.
fn resolve_url(url: &str, base: Option<&str>) -> Result<Url, FetchError> {
    match Url::parse(url) {
        Ok(parsed) => Ok(parsed),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                FetchError::InvalidUrl(format!("relative URL without a base: {}", url))
            })?;
            Url::parse(base)
                .and_then(|b| b.join(url))
                .map_err(|e| FetchError::InvalidUrl(e.to_string()))
        }
        Err(e) => Err(FetchError::InvalidUrl(e.to_string())),
    }
}

/// Append a timestamp to the query. The fragment is left where it was.
fn cache_bust(url: &mut Url) {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let query = match url.query() {
        Some(q) if !q.is_empty() => format!("{}&{}", q, stamp),
        _ => stamp.to_string(),
    };
    url.set_query(Some(&query));
}

#[async_trait]
impl BlobFetcher for HttpBlobFetcher {
    async fn fetch_blob(&self, url: &str, options: &FetchOptions) -> Result<FetchedBlob, FetchError> {
        if is_data_url(url) {
            return blob_from_data_url(url);
        }

        match self.fetch_remote(url, options).await {
            Ok(blob) => Ok(blob),
            Err(err) => match &options.image_placeholder {
                Some(placeholder) => {
                    tracing::warn!(url, error = %err, "fetch failed, using placeholder");
                    blob_from_data_url(placeholder)
                }
                None => Err(err),
            },
        }
    }
}
