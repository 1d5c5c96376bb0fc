//! The detached replica produced by a clone.

use crate::css::StyleDeclaration;
use serde::Serialize;
use std::collections::BTreeMap;

/// A node of the static replica. Owns its subtree and keeps no link to the
/// live document it was cloned from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClonedNode {
    pub node_type: ClonedType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Inline style surface. Serialized as the `style` attribute.
    #[serde(skip_serializing_if = "StyleDeclaration::is_empty")]
    pub style: StyleDeclaration,
    /// Character data of text and comment nodes.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ClonedNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClonedType {
    Element,
    Text,
    Comment,
}

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is written without escaping.
const RAW_TEXT_TAGS: &[&str] = &["style", "script"];

impl ClonedNode {
    pub fn new_element(tag: &str) -> Self {
        Self {
            node_type: ClonedType::Element,
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: StyleDeclaration::default(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn new_text(text: &str) -> Self {
        Self {
            node_type: ClonedType::Text,
            tag: String::new(),
            attributes: BTreeMap::new(),
            style: StyleDeclaration::default(),
            text: text.to_string(),
            children: Vec::new(),
        }
    }

    pub fn new_comment(text: &str) -> Self {
        Self {
            node_type: ClonedType::Comment,
            ..Self::new_text(text)
        }
    }

    /// An `<img>` whose source is `src`.
    pub fn image(src: &str) -> Self {
        let mut img = Self::new_element("img");
        img.set_attr("src", src);
        img
    }

    pub fn is_element(&self) -> bool {
        self.node_type == ClonedType::Element
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Append a class name to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        let joined = match self.get_attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", &joined);
    }

    pub fn append_child(&mut self, child: ClonedNode) {
        self.children.push(child);
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.node_type {
            ClonedType::Text => out.push_str(&self.text),
            ClonedType::Comment => {}
            ClonedType::Element => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Replace all children with a single text node, as DOM `textContent` does.
    pub fn set_text_content(&mut self, text: &str) {
        match self.node_type {
            ClonedType::Element => {
                self.children.clear();
                if !text.is_empty() {
                    self.children.push(ClonedNode::new_text(text));
                }
            }
            _ => self.text = text.to_string(),
        }
    }

    /// All descendant elements (and self) with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&ClonedNode> {
        let mut out = Vec::new();
        self.collect_tag(tag, &mut out);
        out
    }

    fn collect_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a ClonedNode>) {
        if self.is_element() && self.tag == tag {
            out.push(self);
        }
        for child in &self.children {
            child.collect_tag(tag, out);
        }
    }

    /// Serialize to HTML markup, ready to embed in an SVG `foreignObject`.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self.node_type {
            ClonedType::Text => {
                if raw_text {
                    out.push_str(&self.text);
                } else {
                    out.push_str(&escape_text(&self.text));
                }
            }
            ClonedType::Comment => {
                out.push_str("<!--");
                out.push_str(&self.text);
                out.push_str("-->");
            }
            ClonedType::Element => {
                out.push('<');
                out.push_str(&self.tag);
                for (name, value) in &self.attributes {
                    if name == "style" {
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
                }
                let css = self.style.css_text();
                if !css.is_empty() {
                    out.push_str(&format!(" style=\"{}\"", escape_attr(&css)));
                }
                out.push('>');

                if VOID_TAGS.contains(&self.tag.as_str()) {
                    return;
                }

                let raw = RAW_TEXT_TAGS.contains(&self.tag.as_str());
                for child in &self.children {
                    child.write_html(out, raw);
                }
                out.push_str("</");
                out.push_str(&self.tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
