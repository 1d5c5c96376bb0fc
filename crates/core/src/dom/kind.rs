//! Node kinds and the per-kind capability table.
//!
//! How a node is shallow-cloned, where its children come from, and which live
//! state it carries is read from [`Capabilities`], looked up by [`KindTag`].
//! Tag names still matter in two narrower places: the `<p>` width patch in
//! the style snapshot and the `<option>`/`<optgroup>` walk of a select.

use std::sync::Arc;

use super::SourceNode;

/// Sentinel returned by a canvas export when there is nothing to export.
pub const EMPTY_CANVAS_DATA_URL: &str = "data:,";

/// Live kind of a source node, carrying the runtime state the kind needs.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Any element without special handling.
    Element,
    Canvas(CanvasSurface),
    Video {
        /// Poster URL as written. Relative URLs are resolved by the fetcher
        /// against `FetchOptions::base_url`.
        poster: Option<String>,
    },
    /// Projection point. `assigned` holds the light-DOM nodes rendered in its place.
    Slot { assigned: Vec<Arc<SourceNode>> },
    Textarea { value: String },
    Input { value: String },
    Select { value: String },
    Text(String),
    Comment(String),
}

/// Fieldless discriminant of [`NodeKind`], used as the capability table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Element = 0,
    Canvas = 1,
    Video = 2,
    Slot = 3,
    Textarea = 4,
    Input = 5,
    Select = 6,
    Text = 7,
    Comment = 8,
}

/// How the childless clone of a node is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShallowStrategy {
    /// Attributes-only copy.
    Structural,
    /// Export the pixel buffer and decode it into an image.
    CanvasExport,
    /// Fetch the poster frame and decode it into an image.
    PosterCapture,
}

/// Where the children to clone come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSource {
    /// Shadow root children when attached, literal children otherwise.
    ShadowOrLiteral,
    /// Nodes assigned to the projection point.
    Assigned,
    /// Children are never cloned.
    Opaque,
}

/// Which piece of live form state is written into the clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveValueTarget {
    None,
    TextContent,
    ValueAttribute,
    SelectedOption,
}

/// Static per-kind behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub shallow: ShallowStrategy,
    pub children: ChildSource,
    pub live_value: LiveValueTarget,
    /// Whether the kind is a full element (styleable, decoratable).
    pub element: bool,
}

const fn caps(
    shallow: ShallowStrategy,
    children: ChildSource,
    live_value: LiveValueTarget,
    element: bool,
) -> Capabilities {
    Capabilities {
        shallow,
        children,
        live_value,
        element,
    }
}

/// Indexed by `KindTag as usize`.
static CAPABILITY_TABLE: [Capabilities; 9] = [
    // Element
    caps(ShallowStrategy::Structural, ChildSource::ShadowOrLiteral, LiveValueTarget::None, true),
    // Canvas
    caps(ShallowStrategy::CanvasExport, ChildSource::ShadowOrLiteral, LiveValueTarget::None, true),
    // Video
    caps(ShallowStrategy::PosterCapture, ChildSource::Opaque, LiveValueTarget::None, true),
    // Slot
    caps(ShallowStrategy::Structural, ChildSource::Assigned, LiveValueTarget::None, true),
    // Textarea
    caps(ShallowStrategy::Structural, ChildSource::ShadowOrLiteral, LiveValueTarget::TextContent, true),
    // Input
    caps(ShallowStrategy::Structural, ChildSource::ShadowOrLiteral, LiveValueTarget::ValueAttribute, true),
    // Select
    caps(ShallowStrategy::Structural, ChildSource::ShadowOrLiteral, LiveValueTarget::SelectedOption, true),
    // Text
    caps(ShallowStrategy::Structural, ChildSource::ShadowOrLiteral, LiveValueTarget::None, false),
    // Comment
    caps(ShallowStrategy::Structural, ChildSource::ShadowOrLiteral, LiveValueTarget::None, false),
];

impl KindTag {
    pub fn capabilities(self) -> &'static Capabilities {
        &CAPABILITY_TABLE[self as usize]
    }
}

impl NodeKind {
    pub fn tag(&self) -> KindTag {
        match self {
            NodeKind::Element => KindTag::Element,
            NodeKind::Canvas(_) => KindTag::Canvas,
            NodeKind::Video { .. } => KindTag::Video,
            NodeKind::Slot { .. } => KindTag::Slot,
            NodeKind::Textarea { .. } => KindTag::Textarea,
            NodeKind::Input { .. } => KindTag::Input,
            NodeKind::Select { .. } => KindTag::Select,
            NodeKind::Text(_) => KindTag::Text,
            NodeKind::Comment(_) => KindTag::Comment,
        }
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.tag().capabilities()
    }

    /// Default live kind for an element tag, before any runtime state is applied.
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "canvas" => NodeKind::Canvas(CanvasSurface::default()),
            "video" => NodeKind::Video { poster: None },
            "slot" => NodeKind::Slot {
                assigned: Vec::new(),
            },
            "textarea" => NodeKind::Textarea {
                value: String::new(),
            },
            "input" => NodeKind::Input {
                value: String::new(),
            },
            "select" => NodeKind::Select {
                value: String::new(),
            },
            _ => NodeKind::Element,
        }
    }
}

/// Backing store of a canvas element.
///
/// `png` stays `None` until something is drawn; hosts hand over an encoded
/// PNG of the current bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSurface {
    pub width: u32,
    pub height: u32,
    pub png: Option<Vec<u8>>,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        // HTML default canvas size
        Self {
            width: 300,
            height: 150,
            png: None,
        }
    }
}

impl CanvasSurface {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            png: None,
        }
    }

    pub fn drawn(width: u32, height: u32, png: Vec<u8>) -> Self {
        Self {
            width,
            height,
            png: Some(png),
        }
    }

    /// Export the current pixels, or [`EMPTY_CANVAS_DATA_URL`] for a
    /// zero-sized or never-drawn surface.
    pub fn to_data_url(&self) -> String {
        match &self.png {
            Some(png) if self.width > 0 && self.height > 0 && !png.is_empty() => {
                crate::resource::make_data_url(png, "image/png")
            }
            _ => EMPTY_CANVAS_DATA_URL.to_string(),
        }
    }
}
