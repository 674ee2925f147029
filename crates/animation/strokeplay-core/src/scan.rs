//! Text-level scanning of SVG markup.
//!
//! The animator never builds a DOM from the markup. Start tags are located
//! with regular expressions and their attributes are kept as raw text, so a
//! tag can be found again by byte offset when rewriting the document.
//! Tags inside comments or CDATA sections are not distinguished from real
//! ones.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::shape::ShapeKind;

static DRAWABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(path|line|polyline|polygon|rect|circle|ellipse)(\s[^>]*)?/?>")
        .expect("drawable tag pattern")
});

static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(g)(\s[^>]*)?/?>").expect("group tag pattern"));

static SVG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(svg)(\s[^>]*)?/?>").expect("svg tag pattern"));

static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern")
});

/// One `name="value"` pair, value kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    /// Quote character used in the source, reused when the tag is rewritten.
    pub quote: char,
}

/// A start tag located in the markup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Byte offset of the opening `<`.
    pub offset: usize,
    /// Byte offset one past the closing `>`.
    pub end: usize,
    pub self_closing: bool,
    pub attributes: Vec<Attribute>,
}

impl Tag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of one declaration inside the inline `style` attribute.
    pub fn style_property(&self, property: &str) -> Option<&str> {
        let style = self.attr("style")?;
        style_declarations(style)
            .into_iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    /// Paint for `property`; inline style wins over the presentation attribute.
    pub fn paint(&self, property: &str) -> Option<&str> {
        self.style_property(property)
            .or_else(|| self.attr(property))
            .map(str::trim)
    }

    /// Render the tag with `extra` merged into its inline style.
    pub fn render_with_style(&self, extra: &[(String, String)]) -> String {
        let mut declarations: Vec<(String, String)> = self
            .attr("style")
            .map(|s| {
                style_declarations(s)
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        for (name, value) in extra {
            match declarations.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.clone(),
                None => declarations.push((name.clone(), value.clone())),
            }
        }

        let mut out = format!("<{}", self.name);
        for attr in self.attributes.iter().filter(|a| a.name != "style") {
            push_attribute(&mut out, &attr.name, &attr.value, attr.quote);
        }
        if !declarations.is_empty() {
            let style = declarations
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            let quote = if style.contains('"') { '\'' } else { '"' };
            push_attribute(&mut out, "style", &style, quote);
        }
        out.push_str(if self.self_closing { "/>" } else { ">" });
        out
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str, quote: char) {
    out.push(' ');
    out.push_str(name);
    out.push('=');
    out.push(quote);
    out.push_str(value);
    out.push(quote);
}

/// Split an inline style into `(property, value)` pairs.
pub fn style_declarations(style: &str) -> Vec<(&str, &str)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim()))
        })
        .collect()
}

/// A drawable start tag and its shape kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawableTag {
    pub kind: ShapeKind,
    pub tag: Tag,
}

fn parse_attributes(raw: &str) -> Vec<Attribute> {
    ATTRIBUTE_RE
        .captures_iter(raw)
        .map(|c| {
            let (value, quote) = match (c.get(2), c.get(3)) {
                (Some(v), _) => (v.as_str(), '"'),
                (None, Some(v)) => (v.as_str(), '\''),
                (None, None) => ("", '"'),
            };
            Attribute {
                name: c[1].to_string(),
                value: value.to_string(),
                quote,
            }
        })
        .collect()
}

fn tag_from_captures(c: &Captures<'_>) -> Tag {
    let whole = c.get(0).expect("group 0 always matches");
    let raw = c.get(2).map(|m| m.as_str()).unwrap_or("");
    Tag {
        name: c[1].to_string(),
        offset: whole.start(),
        end: whole.end(),
        self_closing: whole.as_str().ends_with("/>"),
        attributes: parse_attributes(raw),
    }
}

/// Every drawable start tag, in document order.
pub fn scan_drawables(text: &str) -> Vec<DrawableTag> {
    DRAWABLE_RE
        .captures_iter(text)
        .filter_map(|c| {
            let kind = ShapeKind::from_tag_name(&c[1])?;
            Some(DrawableTag {
                kind,
                tag: tag_from_captures(&c),
            })
        })
        .collect()
}

/// Every `<g>` start tag, in document order.
pub fn scan_groups(text: &str) -> Vec<Tag> {
    GROUP_RE
        .captures_iter(text)
        .map(|c| tag_from_captures(&c))
        .collect()
}

/// The first `<svg>` start tag.
pub fn scan_svg_root(text: &str) -> Option<Tag> {
    SVG_RE.captures(text).map(|c| tag_from_captures(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_drawables_in_order() {
        let text = r#"<svg><g><rect width="1" height="2"/><path d="M0 0 L1 1"></path></g><circle r='3' /></svg>"#;
        let tags = scan_drawables(text);
        let kinds: Vec<ShapeKind> = tags.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![ShapeKind::Rect, ShapeKind::Path, ShapeKind::Circle]
        );
        assert!(tags[0].tag.self_closing);
        assert!(!tags[1].tag.self_closing);
        assert!(tags[2].tag.self_closing);
        assert_eq!(tags[2].tag.attr("r"), Some("3"));
        assert_eq!(tags[2].tag.attributes[0].quote, '\'');
        assert_eq!(&text[tags[0].tag.offset..tags[0].tag.end], r#"<rect width="1" height="2"/>"#);
    }

    #[test]
    fn ignores_tags_sharing_a_prefix() {
        let text = r#"<svg><linearGradient id="a"/><lines/><pathway/><line x2="1"/></svg>"#;
        let tags = scan_drawables(text);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].kind, ShapeKind::Line);
    }

    #[test]
    fn closing_tags_are_not_drawables() {
        let tags = scan_drawables("<svg><path d=\"M0 0\"></path></svg>");
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn finds_root_and_groups() {
        let text = r##"<?xml version="1.0"?><svg width="10" viewBox="0 0 10 10"><g fill="#000"><g/></g></svg>"##;
        let root = scan_svg_root(text).unwrap();
        assert_eq!(root.attr("width"), Some("10"));
        assert_eq!(root.attr("viewBox"), Some("0 0 10 10"));
        assert_eq!(scan_groups(text).len(), 2);
    }

    #[test]
    fn inline_style_beats_presentation_attribute() {
        let text = r#"<path stroke="red" style="fill: none; stroke:#000" d="M0 0"/>"#;
        let tag = &scan_drawables(text)[0].tag;
        assert_eq!(tag.paint("stroke"), Some("#000"));
        assert_eq!(tag.paint("fill"), Some("none"));
        assert_eq!(tag.paint("opacity"), None);
    }

    #[test]
    fn rewriting_merges_style() {
        let text = r#"<path d="M0 0 L5 0" style="stroke: red; stroke-dashoffset: 9"/>"#;
        let tag = &scan_drawables(text)[0].tag;
        let out = tag.render_with_style(&[
            ("stroke-dashoffset".to_string(), "0".to_string()),
            ("stroke-dasharray".to_string(), "5 5".to_string()),
        ]);
        assert_eq!(
            out,
            r#"<path d="M0 0 L5 0" style="stroke: red; stroke-dashoffset: 0; stroke-dasharray: 5 5"/>"#
        );
    }
}
