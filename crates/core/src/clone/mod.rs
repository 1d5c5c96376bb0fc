//! The recursive cloning pipeline.
//!
//! For every node: filter check, then a kind-specific shallow clone, then the
//! children in source order, then decoration (computed style, pseudo-element
//! content, live form values). Collaborators are injected into [`Cloner`].

mod children;
mod decorate;
mod shallow;
mod value;

pub use children::effective_children;
pub use shallow::structural_clone;
pub use value::materialize_value;

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

use crate::css::{ComputedStyleProvider, GeneratedContentCloner, InlineStyleProvider, PseudoElementCloner};
use crate::dom::SourceNode;
use crate::error::CloneResult;
use crate::fetch::{BlobFetcher, FetchOptions};
use crate::output::ClonedNode;
use crate::resource::{DataUrlImageDecoder, ImageDecoder};

/// Pruning predicate. Returning `false` drops the node and its whole subtree.
pub type NodeFilter = Arc<dyn Fn(&SourceNode) -> bool + Send + Sync>;

/// Per-call configuration.
#[derive(Clone, Default)]
pub struct CloneOptions {
    /// Never applied to the root of a call.
    pub filter: Option<NodeFilter>,
    /// Handed to the blob fetcher untouched.
    pub fetch: FetchOptions,
}

impl CloneOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&SourceNode) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_fetch_options(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    fn accepts(&self, node: &SourceNode) -> bool {
        self.filter.as_ref().map_or(true, |f| f(node))
    }
}

impl fmt::Debug for CloneOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneOptions")
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("fetch", &self.fetch)
            .finish()
    }
}

/// Clones live subtrees into detached static replicas.
#[derive(Clone)]
pub struct Cloner {
    styles: Arc<dyn ComputedStyleProvider>,
    pseudo: Arc<dyn PseudoElementCloner>,
    fetcher: Arc<dyn BlobFetcher>,
    images: Arc<dyn ImageDecoder>,
    /// Set once a pseudo cloner is injected; until then it follows `styles`.
    custom_pseudo: bool,
}

impl Default for Cloner {
    fn default() -> Self {
        let styles: Arc<dyn ComputedStyleProvider> = Arc::new(InlineStyleProvider::new());
        Self {
            pseudo: Arc::new(GeneratedContentCloner::new(Arc::clone(&styles))),
            styles,
            fetcher: default_fetcher(),
            images: Arc::new(DataUrlImageDecoder),
            custom_pseudo: false,
        }
    }
}

#[cfg(feature = "fetch")]
fn default_fetcher() -> Arc<dyn BlobFetcher> {
    Arc::new(crate::fetch::HttpBlobFetcher::new())
}

#[cfg(not(feature = "fetch"))]
fn default_fetcher() -> Arc<dyn BlobFetcher> {
    Arc::new(crate::fetch::OfflineFetcher)
}

impl Cloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the computed style oracle. Unless a pseudo cloner was injected,
    /// pseudo-element content is read from the new provider too.
    pub fn with_style_provider(mut self, styles: Arc<dyn ComputedStyleProvider>) -> Self {
        if !self.custom_pseudo {
            self.pseudo = Arc::new(GeneratedContentCloner::new(Arc::clone(&styles)));
        }
        self.styles = styles;
        self
    }

    pub fn with_pseudo_cloner(mut self, pseudo: Arc<dyn PseudoElementCloner>) -> Self {
        self.pseudo = pseudo;
        self.custom_pseudo = true;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn BlobFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_image_decoder(mut self, images: Arc<dyn ImageDecoder>) -> Self {
        self.images = images;
        self
    }

    /// Clone `node` and its subtree.
    ///
    /// Returns `Ok(None)` when a non-root node is rejected by the filter; none
    /// of its descendants are visited. Any fetch or decode failure anywhere in
    /// the subtree fails the whole call.
    pub fn clone_node<'a>(
        &'a self,
        node: &'a SourceNode,
        options: &'a CloneOptions,
        is_root: bool,
    ) -> BoxFuture<'a, CloneResult<Option<ClonedNode>>> {
        Box::pin(async move {
            if !is_root && !options.accepts(node) {
                tracing::debug!(tag = %node.tag, "node pruned by filter");
                return Ok(None);
            }
            self.clone_subtree(node, options).await.map(Some)
        })
    }

    /// Clone the root of a capture. The filter is not consulted for `node`.
    pub async fn clone_root(&self, node: &SourceNode, options: &CloneOptions) -> CloneResult<ClonedNode> {
        self.clone_subtree(node, options).await
    }

    async fn clone_subtree(&self, node: &SourceNode, options: &CloneOptions) -> CloneResult<ClonedNode> {
        tracing::trace!(tag = %node.tag, kind = ?node.kind.tag(), "cloning node");
        let shallow = self.clone_shallow(node, options).await?;
        let assembled = self.clone_children(node, shallow, options).await?;
        Ok(self.decorate(node, assembled))
    }
}
