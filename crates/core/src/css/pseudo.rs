//! Replication of `::before` / `::after` generated content.
//!
//! Pseudo-elements are not nodes, so the clone cannot carry them directly.
//! They are re-expressed as a scoped `<style>` child that targets a unique
//! class added to the clone.

use std::sync::Arc;

use super::{ComputedStyle, ComputedStyleProvider, PseudoElement};
use crate::dom::SourceNode;
use crate::output::ClonedNode;

/// Adds pseudo-element representations to a clone in place.
///
/// Must not fail for nodes without generated content.
pub trait PseudoElementCloner: Send + Sync {
    fn clone_pseudo_elements(&self, source: &SourceNode, clone: &mut ClonedNode);
}

/// Leaves clones untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPseudoElements;

impl PseudoElementCloner for NoPseudoElements {
    fn clone_pseudo_elements(&self, _source: &SourceNode, _clone: &mut ClonedNode) {}
}

/// Reads pseudo-element computed style and writes it back as a `<style>` rule.
pub struct GeneratedContentCloner {
    styles: Arc<dyn ComputedStyleProvider>,
}

impl GeneratedContentCloner {
    pub fn new(styles: Arc<dyn ComputedStyleProvider>) -> Self {
        Self { styles }
    }
}

impl PseudoElementCloner for GeneratedContentCloner {
    fn clone_pseudo_elements(&self, source: &SourceNode, clone: &mut ClonedNode) {
        if !clone.is_element() {
            return;
        }
        for pseudo in PseudoElement::ALL {
            let style = self.styles.computed_style(source, Some(pseudo));
            let content = style.get_property_value("content");
            if content.is_empty() || content == "none" || content == "normal" {
                continue;
            }

            let class_name = format!("u{}", uuid::Uuid::new_v4().simple());
            clone.add_class(&class_name);

            let rule = format!(".{}{}{{{}}}", class_name, pseudo.selector(), format_style(&style));
            let mut style_el = ClonedNode::new_element("style");
            style_el.append_child(ClonedNode::new_text(&rule));
            clone.append_child(style_el);
        }
    }
}

fn format_style(style: &ComputedStyle) -> String {
    match style.serialized() {
        Some(text) => {
            let content = style.get_property_value("content").replace(['\'', '"'], "");
            format!("{} content: '{}';", text, content)
        }
        None => style
            .properties
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.name, d.value)
                } else {
                    format!("{}: {};", d.name, d.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
