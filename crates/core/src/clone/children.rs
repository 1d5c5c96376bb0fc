//! Ordered child traversal across shadow and slot boundaries.

use std::sync::Arc;

use super::{CloneOptions, Cloner};
use crate::dom::kind::ChildSource;
use crate::dom::SourceNode;
use crate::error::CloneResult;
use crate::output::ClonedNode;

/// Children rendered for `source`: assigned nodes of a slot, else the shadow
/// root's children, else the literal children. Never a mix.
pub fn effective_children(source: &SourceNode) -> &[Arc<SourceNode>] {
    match source.kind.capabilities().children {
        ChildSource::Opaque => &[],
        ChildSource::Assigned => source.assigned_nodes(),
        ChildSource::ShadowOrLiteral => match &source.shadow_root {
            Some(root) => &root.children,
            None => &source.children,
        },
    }
}

impl Cloner {
    /// Clone each child in turn and append it. Child `i + 1` is not started
    /// until child `i` is fully cloned and appended.
    pub(super) async fn clone_children(
        &self,
        source: &SourceNode,
        mut clone: ClonedNode,
        options: &CloneOptions,
    ) -> CloneResult<ClonedNode> {
        let children = effective_children(source);
        if children.is_empty() {
            return Ok(clone);
        }

        for child in children {
            if let Some(cloned) = self.clone_node(child, options, false).await? {
                clone.append_child(cloned);
            }
        }
        Ok(clone)
    }
}
