//! Grayscale colour inversion for drawings shown on dark backgrounds.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scan::Tag;

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").expect("rgb() pattern")
});

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Difference between the strongest and weakest channel.
    #[inline]
    pub fn spread(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }

    #[inline]
    pub fn is_grayscale(&self, threshold: u8) -> bool {
        self.spread() < threshold
    }

    #[inline]
    pub fn inverted(&self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Parse `rgb(r, g, b)`, `#rgb`, `#rrggbb`, `black` or `white`.
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(c) = RGB_RE.captures(value) {
            return Some(Self::new(
                c[1].parse().ok()?,
                c[2].parse().ok()?,
                c[3].parse().ok()?,
            ));
        }
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        match value.to_ascii_lowercase().as_str() {
            "black" => Some(Self::new(0, 0, 0)),
            "white" => Some(Self::new(255, 255, 255)),
            _ => None,
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Inverted colour when `color` looks grayscale, `None` otherwise.
pub fn invert_if_grayscale(color: Rgb, threshold: u8) -> Option<Rgb> {
    color.is_grayscale(threshold).then(|| color.inverted())
}

/// Same as [`invert_if_grayscale`] for a CSS colour string.
///
/// `none`, `transparent` and unrecognised values are never inverted.
pub fn invert_css_color(value: &str, threshold: u8) -> Option<Rgb> {
    let value = value.trim();
    if value.is_empty() || value == "none" || value == "transparent" {
        return None;
    }
    invert_if_grayscale(Rgb::parse_css(value)?, threshold)
}

/// Paint properties considered for inversion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorProperty {
    Stroke,
    Fill,
}

impl ColorProperty {
    pub const ALL: [ColorProperty; 2] = [Self::Stroke, Self::Fill];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stroke => "stroke",
            Self::Fill => "fill",
        }
    }
}

/// A colour override for one tag of the markup.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorChange {
    /// Byte offset of the tag.
    pub offset: usize,
    pub property: ColorProperty,
    pub color: Rgb,
}

/// Inversions for the paints written directly on `tags`.
///
/// Inherited paint is not resolved; only the tag's own style and
/// presentation attributes are read.
pub fn markup_color_changes<'a, I>(tags: I, threshold: u8) -> Vec<ColorChange>
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut changes = Vec::new();
    for tag in tags {
        for property in ColorProperty::ALL {
            let inverted = tag
                .paint(property.as_str())
                .and_then(|paint| invert_css_color(paint, threshold));
            if let Some(color) = inverted {
                changes.push(ColorChange {
                    offset: tag.offset,
                    property,
                    color,
                });
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan_drawables;

    #[test]
    fn parses_css_forms() {
        assert_eq!(Rgb::parse_css("rgb(1, 2, 3)"), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::parse_css("rgb(10,20,30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse_css("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::parse_css("#1a2B3c"), Some(Rgb::new(0x1a, 0x2b, 0x3c)));
        assert_eq!(Rgb::parse_css("Black"), Some(Rgb::new(0, 0, 0)));
        assert_eq!(Rgb::parse_css("rgb(300, 0, 0)"), None);
        assert_eq!(Rgb::parse_css("rgba(0, 0, 0, 0.5)"), None);
        assert_eq!(Rgb::parse_css("#12345"), None);
        assert_eq!(Rgb::parse_css("red"), None);
    }

    #[test]
    fn grayscale_threshold_is_exclusive() {
        // spread 29 inverts, spread 30 does not
        assert_eq!(
            invert_if_grayscale(Rgb::new(100, 129, 110), 30),
            Some(Rgb::new(155, 126, 145))
        );
        assert_eq!(invert_if_grayscale(Rgb::new(100, 130, 110), 30), None);
    }

    #[test]
    fn every_low_spread_colour_inverts_channelwise() {
        for base in (0u8..=225).step_by(15) {
            for delta in 0u8..30 {
                let c = Rgb::new(base, base.saturating_add(delta), base);
                let inv = invert_if_grayscale(c, 30).expect("grayscale");
                assert_eq!(inv, Rgb::new(255 - c.r, 255 - c.g, 255 - c.b));
            }
        }
    }

    #[test]
    fn css_none_and_transparent_are_left_alone() {
        assert_eq!(invert_css_color("none", 30), None);
        assert_eq!(invert_css_color("transparent", 30), None);
        assert_eq!(invert_css_color("", 30), None);
        assert_eq!(
            invert_css_color("rgb(0, 0, 0)", 30).map(|c| c.to_string()),
            Some("rgb(255, 255, 255)".to_string())
        );
    }

    #[test]
    fn markup_changes_cover_stroke_and_fill() {
        let text = r##"<path stroke="#000" fill="#ff0000" d="M0 0"/><circle style="fill: #eee" r="1"/>"##;
        let drawables = scan_drawables(text);
        let changes = markup_color_changes(drawables.iter().map(|d| &d.tag), 30);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].property, ColorProperty::Stroke);
        assert_eq!(changes[0].color, Rgb::new(255, 255, 255));
        assert_eq!(changes[1].offset, drawables[1].tag.offset);
        assert_eq!(changes[1].property, ColorProperty::Fill);
        assert_eq!(changes[1].color, Rgb::new(0x11, 0x11, 0x11));
    }
}
