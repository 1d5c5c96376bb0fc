//! Live document model: the read-only source side of a clone.
//!
//! A [`SourceNode`] carries markup (tag, attributes, children) together with
//! the runtime state that markup alone does not describe: canvas bitmaps,
//! live form values, attached shadow roots and slot assignments.

pub mod kind;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

pub use kind::{CanvasSurface, Capabilities, KindTag, NodeKind, EMPTY_CANVAS_DATA_URL};

/// A node in the live document tree.
#[derive(Debug, Clone)]
pub struct SourceNode {
    /// Lowercase tag name. Empty for text and comment nodes.
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub kind: NodeKind,
    pub children: Vec<Arc<SourceNode>>,
    pub shadow_root: Option<ShadowRoot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

/// Encapsulated subtree attached to a host element.
#[derive(Debug, Clone)]
pub struct ShadowRoot {
    pub mode: ShadowRootMode,
    pub children: Vec<Arc<SourceNode>>,
}

impl SourceNode {
    /// Create an element whose live kind follows from its tag.
    pub fn element(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        Self {
            kind: NodeKind::for_tag(&tag),
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
            shadow_root: None,
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            kind: NodeKind::Text(text.to_string()),
            children: Vec::new(),
            shadow_root: None,
        }
    }

    pub fn comment(text: &str) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            kind: NodeKind::Comment(text.to_string()),
            children: Vec::new(),
            shadow_root: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        if name == "poster" {
            if let NodeKind::Video { poster } = &mut self.kind {
                *poster = Some(value.to_string());
            }
        }
        self
    }

    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_shared_child(mut self, child: Arc<SourceNode>) -> Self {
        self.children.push(child);
        self
    }

    /// Attach an open shadow root holding `children`.
    pub fn with_shadow_root(mut self, children: Vec<SourceNode>) -> Self {
        self.shadow_root = Some(ShadowRoot {
            mode: ShadowRootMode::Open,
            children: children.into_iter().map(Arc::new).collect(),
        });
        self
    }

    /// Set the nodes assigned to a slot. No effect on other kinds.
    pub fn with_assigned(mut self, nodes: Vec<Arc<SourceNode>>) -> Self {
        if let NodeKind::Slot { assigned } = &mut self.kind {
            *assigned = nodes;
        }
        self
    }

    /// Set the live value of a textarea, input or select.
    pub fn with_live_value(mut self, live: &str) -> Self {
        self.set_live_value(live);
        self
    }

    fn set_live_value(&mut self, live: &str) {
        match &mut self.kind {
            NodeKind::Textarea { value } | NodeKind::Input { value } | NodeKind::Select { value } => {
                *value = live.to_string();
            }
            _ => {}
        }
    }

    /// Replace the bitmap of a canvas. No effect on other kinds.
    pub fn with_canvas(mut self, surface: CanvasSurface) -> Self {
        if let NodeKind::Canvas(current) = &mut self.kind {
            *current = surface;
        }
        self
    }

    pub fn into_shared(self) -> Arc<SourceNode> {
        Arc::new(self)
    }

    pub fn is_element(&self) -> bool {
        self.kind.capabilities().element
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Live value of a form control, if this node is one.
    pub fn live_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Textarea { value } | NodeKind::Input { value } | NodeKind::Select { value } => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Nodes assigned to this slot. Empty for non-slots.
    pub fn assigned_nodes(&self) -> &[Arc<SourceNode>] {
        match &self.kind {
            NodeKind::Slot { assigned } => assigned,
            _ => &[],
        }
    }

    /// Concatenated text of this node and its literal descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) => {}
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// First descendant (or self) with the given tag, in document order.
    /// Shadow trees are not searched.
    pub fn find_first(self: &Arc<Self>, tag: &str) -> Option<Arc<SourceNode>> {
        if self.tag == tag {
            return Some(Arc::clone(self));
        }
        self.children.iter().find_map(|c| c.find_first(tag))
    }
}

/// Parse an HTML string into a live tree rooted at the document element.
///
/// Declarative shadow roots (`<template shadowrootmode>`) are attached to their
/// host and the host's light children are assigned to slots by name.
/// Text is kept as written, whitespace included, except for blank runs
/// directly under `<html>` and `<head>`.
pub fn parse_html(html: &str) -> Arc<SourceNode> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .unwrap_or_default();

    let root = dom
        .document
        .children
        .borrow()
        .iter()
        .filter(|h| matches!(h.data, NodeData::Element { .. }))
        .find_map(|h| convert_node(h, None));

    root.unwrap_or_else(|| SourceNode::element("html").into_shared())
}

/// Light-DOM nodes of a shadow host, grouped by slot name ("" = default slot).
///
/// Each group goes to the first slot with that name in tree order; later
/// slots with the same name get nothing.
#[derive(Default)]
struct SlotAssignment {
    by_name: RefCell<HashMap<String, Vec<Arc<SourceNode>>>>,
}

impl SlotAssignment {
    fn from_light_children(children: &[Arc<SourceNode>]) -> Self {
        let mut by_name: HashMap<String, Vec<Arc<SourceNode>>> = HashMap::new();
        for child in children {
            let name = match child.kind {
                NodeKind::Comment(_) => continue,
                NodeKind::Text(_) => "",
                _ => child.get_attr("slot").unwrap_or(""),
            };
            by_name.entry(name.to_string()).or_default().push(Arc::clone(child));
        }
        SlotAssignment {
            by_name: RefCell::new(by_name),
        }
    }

    fn take(&self, name: &str) -> Vec<Arc<SourceNode>> {
        self.by_name.borrow_mut().remove(name).unwrap_or_default()
    }
}

fn convert_node(handle: &Handle, slots: Option<&SlotAssignment>) -> Option<Arc<SourceNode>> {
    match &handle.data {
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let mut node = SourceNode::element(&name.local);
            for attr in attrs.borrow().iter() {
                node = node.with_attr(&attr.name.local, &attr.value);
            }
            // Assign before descending so an outer slot wins over a nested one.
            if let Some(slots) = slots {
                assign_slot(&mut node, slots);
            }
            let skip_blank_text = matches!(node.tag.as_str(), "html" | "head");

            let mut shadow = None;
            let mut light = Vec::new();
            for child in handle.children.borrow().iter() {
                if shadow.is_none() && shadow_template_mode(child).is_some() {
                    shadow = Some(Handle::clone(child));
                    continue;
                }
                if skip_blank_text && is_blank_text(child) {
                    continue;
                }
                light.extend(convert_node(child, slots));
            }

            // Template content lives in a separate fragment, not in children.
            if node.tag == "template" {
                if let Some(contents) = template_contents.borrow().as_ref() {
                    light = convert_children(contents, slots);
                }
            }

            if let Some(template) = shadow {
                let assignment = SlotAssignment::from_light_children(&light);
                let mode = shadow_template_mode(&template).unwrap_or(ShadowRootMode::Open);
                let children = match &template.data {
                    NodeData::Element {
                        template_contents, ..
                    } => match template_contents.borrow().as_ref() {
                        Some(contents) => convert_children(contents, Some(&assignment)),
                        None => convert_children(&template, Some(&assignment)),
                    },
                    _ => Vec::new(),
                };
                node.shadow_root = Some(ShadowRoot { mode, children });
            }

            node.children = light;
            apply_initial_live_state(&mut node);
            Some(Arc::new(node))
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            Some(Arc::new(SourceNode::text(&text)))
        }
        NodeData::Comment { contents } => Some(Arc::new(SourceNode::comment(contents))),
        _ => None,
    }
}

fn convert_children(handle: &Handle, slots: Option<&SlotAssignment>) -> Vec<Arc<SourceNode>> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(|c| convert_node(c, slots))
        .collect()
}

/// Whitespace-only text. Only dropped where it cannot render.
fn is_blank_text(handle: &Handle) -> bool {
    match &handle.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        _ => false,
    }
}

fn shadow_template_mode(handle: &Handle) -> Option<ShadowRootMode> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };
    if &*name.local != "template" {
        return None;
    }
    let attrs = attrs.borrow();
    let mode = attrs
        .iter()
        .find(|a| &*a.name.local == "shadowrootmode")?
        .value
        .to_ascii_lowercase();
    match mode.as_str() {
        "open" => Some(ShadowRootMode::Open),
        "closed" => Some(ShadowRootMode::Closed),
        _ => None,
    }
}

/// Seed live state from markup the way a freshly loaded page would.
fn apply_initial_live_state(node: &mut SourceNode) {
    let initial = match &node.kind {
        NodeKind::Textarea { .. } => Some(node.text_content()),
        NodeKind::Input { .. } => Some(node.get_attr("value").unwrap_or("").to_string()),
        NodeKind::Select { .. } => Some(initial_select_value(node)),
        _ => None,
    };
    if let Some(value) = initial {
        node.set_live_value(&value);
    }
}

fn assign_slot(node: &mut SourceNode, slots: &SlotAssignment) {
    if let NodeKind::Slot { assigned } = &mut node.kind {
        let name = node.attributes.get("name").map(String::as_str).unwrap_or("");
        *assigned = slots.take(name);
    }
}

fn initial_select_value(select: &SourceNode) -> String {
    let mut options = Vec::new();
    collect_options(select, &mut options);
    options
        .iter()
        .find(|o| o.attributes.contains_key("selected"))
        .or_else(|| options.first())
        .map(|o| option_value(o))
        .unwrap_or_default()
}

fn collect_options<'a>(node: &'a SourceNode, out: &mut Vec<&'a SourceNode>) {
    for child in &node.children {
        if child.tag == "option" {
            out.push(child);
        } else if child.tag == "optgroup" {
            collect_options(child, out);
        }
    }
}

/// Value an `<option>` submits: its `value` attribute, else its trimmed text.
pub fn option_value(option: &SourceNode) -> String {
    match option.get_attr("value") {
        Some(v) => v.to_string(),
        None => option.text_content().trim().to_string(),
    }
}
