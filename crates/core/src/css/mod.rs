//! Inline style surface and computed style capture.
//!
//! [`StyleDeclaration`] is the structured `style` of a cloned element: an
//! ordered list of declarations with CSSOM-like accessors. Computed style
//! itself comes from a host [`ComputedStyleProvider`].

pub mod computed;
pub mod pseudo;
pub mod snapshot;

pub use computed::{ComputedStyle, ComputedStyleProvider, InlineStyleProvider, PseudoElement};
pub use pseudo::{GeneratedContentCloner, NoPseudoElements, PseudoElementCloner};
pub use snapshot::snapshot_style;

use serde::Serialize;

/// One `name: value [!important]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
}

/// Ordered declaration block, the inline style of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleDeclaration {
    declarations: Vec<Declaration>,
}

impl StyleDeclaration {
    /// Parse a declaration block such as the value of a `style` attribute.
    pub fn parse(css: &str) -> Self {
        let mut style = StyleDeclaration::default();
        style.apply_css_text(css);
        style
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Set a property. An existing entry is updated in place, keeping its position.
    /// A priority of `"important"` marks the declaration `!important`.
    pub fn set_property(&mut self, name: &str, value: &str, priority: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            self.remove_property(&name);
            return;
        }
        let important = priority.trim().eq_ignore_ascii_case("important");
        match self.declarations.iter_mut().find(|d| d.name == name) {
            Some(existing) => {
                existing.value = value.to_string();
                existing.important = important;
            }
            None => self.declarations.push(Declaration {
                name,
                value: value.to_string(),
                important,
            }),
        }
    }

    /// Value of a property, or `""` when it is not set.
    pub fn get_property_value(&self, name: &str) -> &str {
        self.find(name).map(|d| d.value.as_str()).unwrap_or("")
    }

    /// `"important"` or `""`.
    pub fn get_property_priority(&self, name: &str) -> &str {
        match self.find(name) {
            Some(d) if d.important => "important",
            _ => "",
        }
    }

    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        let index = self.declarations.iter().position(|d| d.name == name)?;
        Some(self.declarations.remove(index).value)
    }

    fn find(&self, name: &str) -> Option<&Declaration> {
        let name = name.trim();
        self.declarations
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Serialized form: `name: value; other: value !important;`.
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.name, d.value)
                } else {
                    format!("{}: {};", d.name, d.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace every declaration with those parsed from `css`.
    pub fn set_css_text(&mut self, css: &str) {
        self.declarations.clear();
        self.apply_css_text(css);
    }

    /// Re-parse the current text with `css` appended. A property declared again
    /// takes the later value.
    pub fn append_css_text(&mut self, css: &str) {
        let combined = format!("{} {}", self.css_text(), css);
        self.set_css_text(&combined);
    }

    fn apply_css_text(&mut self, css: &str) {
        for declaration in split_declarations(css) {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            let mut parts = declaration.splitn(2, ':');
            let property = match parts.next() {
                Some(p) => p.trim(),
                None => continue,
            };
            let raw_value = match parts.next() {
                Some(v) => v.trim(),
                None => continue,
            };
            if property.is_empty() {
                continue;
            }
            let (value, priority) = match strip_important(raw_value) {
                Some(v) => (v, "important"),
                None => (raw_value, ""),
            };
            self.set_property(property, value, priority);
        }
    }
}

fn strip_important(value: &str) -> Option<&str> {
    let lower = value.to_ascii_lowercase();
    let idx = lower.rfind("!important")?;
    if lower[idx + "!important".len()..].trim().is_empty() {
        Some(value[..idx].trim_end())
    } else {
        None
    }
}

/// Split on `;` outside quotes and parentheses, so `url(data:...;base64,...)`
/// and `content: ';'` survive.
fn split_declarations(css: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in css.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&css[start..]);
    out
}
