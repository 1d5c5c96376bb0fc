//! Live form state into static markup.

use crate::dom::kind::LiveValueTarget;
use crate::dom::SourceNode;
use crate::output::ClonedNode;

/// Write the live value of a form control into its clone. Other kinds are
/// left alone.
pub fn materialize_value(source: &SourceNode, clone: &mut ClonedNode) {
    let Some(value) = source.live_value() else {
        return;
    };
    match source.kind.capabilities().live_value {
        LiveValueTarget::TextContent => clone.set_text_content(value),
        LiveValueTarget::ValueAttribute => clone.set_attr("value", value),
        LiveValueTarget::SelectedOption => select_option(clone, value),
        LiveValueTarget::None => {}
    }
}

/// Mark the first option whose value matches; clear `selected` elsewhere.
fn select_option(select: &mut ClonedNode, value: &str) {
    let mut found = false;
    for_each_option(select, &mut |option| {
        let option_value = match option.get_attr("value") {
            Some(v) => v.to_string(),
            None => option.text_content().trim().to_string(),
        };
        if !found && option_value == value {
            option.set_attr("selected", "");
            found = true;
        } else {
            option.remove_attr("selected");
        }
    });
}

fn for_each_option(node: &mut ClonedNode, f: &mut dyn FnMut(&mut ClonedNode)) {
    for child in node.children.iter_mut() {
        if child.tag == "option" {
            f(child);
        } else if child.tag == "optgroup" {
            for_each_option(child, f);
        }
    }
}
