//! Childless clone of a single node.

use super::{CloneOptions, Cloner};
use crate::css::StyleDeclaration;
use crate::dom::kind::ShallowStrategy;
use crate::dom::{NodeKind, SourceNode, EMPTY_CANVAS_DATA_URL};
use crate::error::CloneResult;
use crate::output::ClonedNode;
use crate::resource::{make_data_url, mime_type_for_url};

impl Cloner {
    pub(super) async fn clone_shallow(&self, node: &SourceNode, options: &CloneOptions) -> CloneResult<ClonedNode> {
        match node.kind.capabilities().shallow {
            ShallowStrategy::Structural => Ok(structural_clone(node)),
            ShallowStrategy::CanvasExport => self.clone_canvas(node).await,
            ShallowStrategy::PosterCapture => match poster_of(node) {
                Some(poster) => self.clone_poster(poster, options).await,
                None => Ok(structural_clone(node)),
            },
        }
    }

    async fn clone_canvas(&self, node: &SourceNode) -> CloneResult<ClonedNode> {
        let data_url = match &node.kind {
            NodeKind::Canvas(surface) => surface.to_data_url(),
            _ => EMPTY_CANVAS_DATA_URL.to_string(),
        };
        if data_url == EMPTY_CANVAS_DATA_URL {
            tracing::debug!("blank canvas, cloning structurally");
            return Ok(structural_clone(node));
        }
        Ok(self.images.decode(&data_url).await?)
    }

    async fn clone_poster(&self, poster: &str, options: &CloneOptions) -> CloneResult<ClonedNode> {
        tracing::debug!(poster, "capturing video poster");
        let blob = self.fetcher.fetch_blob(poster, &options.fetch).await?;
        let mime = match mime_type_for_url(poster) {
            Some(declared) => declared.to_string(),
            None => blob.content_type,
        };
        let data_url = make_data_url(&blob.bytes, &mime);
        Ok(self.images.decode(&data_url).await?)
    }
}

fn poster_of(node: &SourceNode) -> Option<&str> {
    match &node.kind {
        NodeKind::Video { poster: Some(poster) } if !poster.trim().is_empty() => Some(poster),
        _ => None,
    }
}

/// Attributes-only copy with no children. The `style` attribute becomes the
/// clone's structured style surface.
pub fn structural_clone(node: &SourceNode) -> ClonedNode {
    match &node.kind {
        NodeKind::Text(text) => ClonedNode::new_text(text),
        NodeKind::Comment(text) => ClonedNode::new_comment(text),
        _ => {
            let mut clone = ClonedNode::new_element(&node.tag);
            for (name, value) in &node.attributes {
                if name == "style" {
                    clone.style = StyleDeclaration::parse(value);
                } else {
                    clone.set_attr(name, value);
                }
            }
            clone
        }
    }
}
