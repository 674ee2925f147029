//! Parsed SVG markup ready for measurement and playback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::color::{markup_color_changes, ColorChange};
use crate::error::StrokeError;
use crate::measure::PathTable;
use crate::pause::{derive_pause_points, scan_pause_markers, PauseMarker, PausePoint};
use crate::scan::{scan_drawables, scan_groups, scan_svg_root, DrawableTag, Tag};
use crate::shape::GeometryMeasurer;
use crate::Result;

/// Size used for a missing or non-numeric root width/height.
pub const DEFAULT_VIEWPORT_SIZE: f64 = 100.0;

static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number pattern")
});

/// Numeric prefix of an attribute value such as `"240px"` or `"50%"`.
fn leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER_RE
        .find(value)
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// The root `<svg>` element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SvgRoot {
    pub offset: usize,
    pub width: f64,
    pub height: f64,
    pub view_box: Option<String>,
    pub tag: Tag,
}

impl SvgRoot {
    pub fn from_tag(tag: Tag) -> Self {
        let size = |name: &str| {
            tag.attr(name)
                .and_then(leading_number)
                .unwrap_or(DEFAULT_VIEWPORT_SIZE)
        };
        let width = size("width");
        let height = size("height");
        let view_box = tag
            .attr("viewBox")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self {
            offset: tag.offset,
            width,
            height,
            view_box,
            tag,
        }
    }

    /// The declared `viewBox`, or one spanning the declared size.
    pub fn effective_view_box(&self) -> String {
        self.view_box
            .clone()
            .unwrap_or_else(|| format!("0 0 {} {}", self.width, self.height))
    }
}

/// SVG markup with its drawables and pause markers located.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeDocument {
    text: String,
    root: SvgRoot,
    drawables: Vec<DrawableTag>,
    groups: Vec<Tag>,
    markers: Vec<PauseMarker>,
}

impl StrokeDocument {
    /// Scan `text`. Fails only when there is no `<svg>` element.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let root = scan_svg_root(&text).ok_or(StrokeError::MissingSvgRoot)?;
        let drawables = scan_drawables(&text);
        let groups = scan_groups(&text);
        let markers = scan_pause_markers(&text);
        log::debug!(
            "parsed svg: {} drawables, {} groups, {} pause markers",
            drawables.len(),
            groups.len(),
            markers.len()
        );
        Ok(Self {
            root: SvgRoot::from_tag(root),
            text,
            drawables,
            groups,
            markers,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &SvgRoot {
        &self.root
    }

    pub fn drawables(&self) -> &[DrawableTag] {
        &self.drawables
    }

    pub fn groups(&self) -> &[Tag] {
        &self.groups
    }

    pub fn markers(&self) -> &[PauseMarker] {
        &self.markers
    }

    #[inline]
    pub fn has_pause_markers(&self) -> bool {
        !self.markers.is_empty()
    }

    /// Documents with pause markers always autoplay.
    #[inline]
    pub fn should_autoplay(&self, requested: bool) -> bool {
        requested || self.has_pause_markers()
    }

    /// Measurer computing lengths from the markup geometry.
    pub fn geometry_measurer(&self, accuracy: f64) -> GeometryMeasurer<'_> {
        GeometryMeasurer::new(&self.drawables, accuracy)
    }

    pub fn pause_points(&self, table: &PathTable) -> Vec<PausePoint> {
        derive_pause_points(&self.markers, &self.drawables, table)
    }

    /// Inversions for every drawable and group, in document order.
    pub fn color_changes(&self, threshold: u8) -> Vec<ColorChange> {
        let mut tags: Vec<&Tag> = self
            .drawables
            .iter()
            .map(|d| &d.tag)
            .chain(self.groups.iter())
            .collect();
        tags.sort_by_key(|t| t.offset);
        markup_color_changes(tags, threshold)
    }
}
