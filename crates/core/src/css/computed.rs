//! Computed style oracle.
//!
//! No cascade is implemented here. Hosts that render the live document supply
//! a [`ComputedStyleProvider`]; [`InlineStyleProvider`] is a minimal one that
//! resolves UA defaults plus the inline `style` attribute.

use super::StyleDeclaration;
use crate::dom::SourceNode;

/// Pseudo-elements whose generated content is replicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    Before,
    After,
}

impl PseudoElement {
    pub const ALL: [PseudoElement; 2] = [PseudoElement::Before, PseudoElement::After];

    /// Selector suffix, e.g. `::before`.
    pub fn selector(self) -> &'static str {
        match self {
            PseudoElement::Before => "::before",
            PseudoElement::After => "::after",
        }
    }
}

/// Live, fully resolved style of one node (or one of its pseudo-elements).
///
/// Short-lived: it is read during decoration and then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    /// Serialized style text, when the host exposes it.
    pub css_text: Option<String>,
    /// Every resolved property with its value and priority.
    pub properties: StyleDeclaration,
}

impl ComputedStyle {
    pub fn from_properties(properties: StyleDeclaration) -> Self {
        Self {
            css_text: None,
            properties,
        }
    }

    /// Resolved value, or `""` when the host does not report the property.
    pub fn get_property_value(&self, name: &str) -> &str {
        self.properties.get_property_value(name)
    }

    /// Serialized text if the host exposes a non-empty one.
    pub fn serialized(&self) -> Option<&str> {
        self.css_text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Host query for computed style.
pub trait ComputedStyleProvider: Send + Sync {
    fn computed_style(&self, node: &SourceNode, pseudo: Option<PseudoElement>) -> ComputedStyle;
}

/// Provider resolving per-tag UA defaults overlaid with the inline `style`
/// attribute. Pseudo-elements resolve to an empty style.
#[derive(Debug, Clone, Default)]
pub struct InlineStyleProvider {
    expose_css_text: bool,
}

impl InlineStyleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report the serialized css text, like engines that populate
    /// `cssText` on computed styles.
    pub fn with_css_text(mut self, expose: bool) -> Self {
        self.expose_css_text = expose;
        self
    }
}

impl ComputedStyleProvider for InlineStyleProvider {
    fn computed_style(&self, node: &SourceNode, pseudo: Option<PseudoElement>) -> ComputedStyle {
        if pseudo.is_some() || !node.is_element() {
            return ComputedStyle::default();
        }

        let mut properties = default_style_for_tag(&node.tag);
        if let Some(inline) = node.get_attr("style") {
            for decl in StyleDeclaration::parse(inline).iter() {
                let priority = if decl.important { "important" } else { "" };
                properties.set_property(&decl.name, &decl.value, priority);
            }
        }
        if node.attributes.contains_key("hidden") {
            properties.set_property("display", "none", "");
        }

        let css_text = self.expose_css_text.then(|| properties.css_text());
        ComputedStyle {
            css_text,
            properties,
        }
    }
}

/// UA defaults for a tag.
fn default_style_for_tag(tag: &str) -> StyleDeclaration {
    let display = match tag {
        "a" | "span" | "strong" | "em" | "b" | "i" | "u" | "small" | "sub" | "sup" | "label"
        | "abbr" | "cite" | "code" | "kbd" | "mark" | "q" | "s" | "samp" | "time" | "var"
        | "slot" => "inline",
        "button" | "select" | "textarea" | "input" | "img" | "canvas" | "video" => "inline-block",
        "head" | "meta" | "link" | "title" | "script" | "style" | "noscript" | "template" => "none",
        "li" => "list-item",
        "table" => "table",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        _ => "block",
    };

    let mut style = StyleDeclaration::default();
    style.set_property("display", display, "");
    style.set_property("-webkit-background-clip", "border-box", "");
    style.set_property("align-items", "normal", "");
    style.set_property("perspective", "none", "");

    match tag {
        "h1" => {
            style.set_property("font-size", "32px", "");
            style.set_property("margin", "21px 0px", "");
        }
        "h2" => {
            style.set_property("font-size", "24px", "");
            style.set_property("margin", "19px 0px", "");
        }
        "h3" => {
            style.set_property("font-size", "18.72px", "");
            style.set_property("margin", "18px 0px", "");
        }
        "p" => style.set_property("margin", "16px 0px", ""),
        "body" => style.set_property("margin", "8px", ""),
        _ => {}
    }
    style
}
