use super::{materialize_value, Cloner};
use crate::css::snapshot_style;
use crate::dom::SourceNode;
use crate::output::ClonedNode;

impl Cloner {
    /// Style snapshot, then pseudo-element content, then live values.
    /// Text and comment clones pass through untouched.
    pub(super) fn decorate(&self, source: &SourceNode, mut clone: ClonedNode) -> ClonedNode {
        if !clone.is_element() {
            return clone;
        }
        snapshot_style(self.styles.as_ref(), source, &mut clone);
        self.pseudo.clone_pseudo_elements(source, &mut clone);
        materialize_value(source, &mut clone);
        clone
    }
}
