//! Copy computed style onto a clone and patch properties that do not survive
//! serialization reliably.

use super::{ComputedStyle, ComputedStyleProvider};
use crate::dom::SourceNode;
use crate::output::ClonedNode;

const DEFAULT_BACKGROUND_CLIP: &str = "border-box";
/// Kerning-only feature settings.
const DEFAULT_FONT_FEATURE_SETTINGS: &str = "\"kern\"";
const DEFAULT_ALIGN_ITEMS: &str = "normal";
const DEFAULT_PERSPECTIVE: &str = "none";

/// Snapshot the computed style of `source` onto `clone`.
pub fn snapshot_style(provider: &dyn ComputedStyleProvider, source: &SourceNode, clone: &mut ClonedNode) {
    let computed = provider.computed_style(source, None);

    match computed.serialized() {
        Some(text) => clone.style.set_css_text(text),
        None => {
            for decl in computed.properties.iter() {
                let priority = if decl.important { "important" } else { "" };
                clone.style.set_property(&decl.name, &decl.value, priority);
            }
        }
    }

    let patches = quirk_patches(source, &computed);
    if !patches.is_empty() {
        tracing::trace!(tag = %source.tag, patches = %patches, "applying style patches");
        clone.style.append_css_text(&patches);
    }
}

/// Extra inline declarations, in fixed order. Later entries win when two
/// touch the same property.
fn quirk_patches(source: &SourceNode, computed: &ComputedStyle) -> String {
    let mut out = Vec::new();

    let clip = computed.get_property_value("-webkit-background-clip");
    if !clip.is_empty() && clip != DEFAULT_BACKGROUND_CLIP {
        out.push(format!("-webkit-background-clip: {};", clip));
    }

    let features = computed.get_property_value("font-feature-settings");
    if !features.is_empty() && features != DEFAULT_FONT_FEATURE_SETTINGS {
        out.push(format!("font-feature-settings: {};", features));
    }

    if source.tag == "p" {
        if let Some(width) = rounded_width(computed.get_property_value("width")) {
            out.push(format!("width: {};", width));
        }
    }

    let align = computed.get_property_value("align-items");
    if !align.is_empty() && align != DEFAULT_ALIGN_ITEMS {
        out.push(format!("align-items: {};", align));
    }

    let perspective = computed.get_property_value("perspective");
    if !perspective.is_empty() && perspective != DEFAULT_PERSPECTIVE {
        out.push(format!("perspective: {};", perspective));
    }

    out.join(" ")
}

/// Whole-pixel width for a fractional `px` width; `None` when already whole
/// or not in pixels.
fn rounded_width(width: &str) -> Option<String> {
    let px: f64 = width.trim().strip_suffix("px")?.trim().parse().ok()?;
    if !px.is_finite() || px.fract() == 0.0 {
        return None;
    }
    // Any fractional part rounds up, however small.
    Some(format!("{}px", px.ceil()))
}
