//! Test doubles for the cloning collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use domshot_core::css::{ComputedStyle, ComputedStyleProvider, PseudoElement, StyleDeclaration};
use domshot_core::dom::SourceNode;
use domshot_core::error::{DecodeError, FetchError};
use domshot_core::fetch::{BlobFetcher, FetchOptions, FetchedBlob};
use domshot_core::resource::{DataUrlImageDecoder, ImageDecoder};
use domshot_core::{ClonedNode, Cloner};

/// Computed styles keyed by the node's `id` attribute.
#[derive(Default)]
pub struct StylesById {
    styles: HashMap<String, ComputedStyle>,
}

impl StylesById {
    pub fn with(mut self, id: &str, style: ComputedStyle) -> Self {
        self.styles.insert(id.to_string(), style);
        self
    }
}

impl ComputedStyleProvider for StylesById {
    fn computed_style(&self, node: &SourceNode, pseudo: Option<PseudoElement>) -> ComputedStyle {
        if pseudo.is_some() {
            return ComputedStyle::default();
        }
        node.get_attr("id")
            .and_then(|id| self.styles.get(id))
            .cloned()
            .unwrap_or_default()
    }
}

pub fn properties(css: &str) -> ComputedStyle {
    ComputedStyle::from_properties(StyleDeclaration::parse(css))
}

pub fn serialized(text: &str, props: &str) -> ComputedStyle {
    ComputedStyle {
        css_text: Some(text.to_string()),
        properties: StyleDeclaration::parse(props),
    }
}

/// Decoder that sleeps per data URL and records how many decodes overlap.
#[derive(Default)]
pub struct SlowDecoder {
    delays: HashMap<String, u64>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub finished: Mutex<Vec<String>>,
}

impl SlowDecoder {
    pub fn delay(mut self, data_url: &str, millis: u64) -> Self {
        self.delays.insert(data_url.to_string(), millis);
        self
    }
}

#[async_trait]
impl ImageDecoder for SlowDecoder {
    async fn decode(&self, data_url: &str) -> Result<ClonedNode, DecodeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let millis = self.delays.get(data_url).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(millis)).await;

        self.finished.lock().unwrap().push(data_url.to_string());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        DataUrlImageDecoder.decode(data_url).await
    }
}

/// Decoder that always fails.
pub struct BrokenDecoder;

#[async_trait]
impl ImageDecoder for BrokenDecoder {
    async fn decode(&self, _data_url: &str) -> Result<ClonedNode, DecodeError> {
        Err(DecodeError::invalid("corrupt image"))
    }
}

/// Fetcher serving one fixed blob and recording requested URLs.
pub struct StaticFetcher {
    blob: FetchedBlob,
    pub requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(bytes: &[u8], content_type: &str) -> Self {
        Self {
            blob: FetchedBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BlobFetcher for StaticFetcher {
    async fn fetch_blob(&self, url: &str, _options: &FetchOptions) -> Result<FetchedBlob, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self.blob.clone())
    }
}

/// Fetcher that always answers with an HTTP error.
pub struct FailingFetcher(pub u16);

#[async_trait]
impl BlobFetcher for FailingFetcher {
    async fn fetch_blob(&self, _url: &str, _options: &FetchOptions) -> Result<FetchedBlob, FetchError> {
        Err(FetchError::HttpError(self.0))
    }
}

/// Cloner with deterministic collaborators: no styles, no network.
pub fn quiet_cloner() -> Cloner {
    Cloner::new()
        .with_style_provider(Arc::new(StylesById::default()))
        .with_pseudo_cloner(Arc::new(domshot_core::css::NoPseudoElements))
        .with_fetcher(Arc::new(domshot_core::fetch::OfflineFetcher))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
