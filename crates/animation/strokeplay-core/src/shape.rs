//! Drawable shape kinds and their stroke lengths computed from markup.

use kurbo::{BezPath, Circle, Ellipse, Point, Shape};
use serde::{Deserialize, Serialize};

use crate::error::StrokeError;
use crate::measure::PathMeasurer;
use crate::scan::DrawableTag;
use crate::Result;

/// CSS selector matching every drawable element, in the same order as
/// [`ShapeKind::ALL`].
pub const DRAWABLE_SELECTOR: &str = "path, line, polyline, polygon, rect, circle, ellipse";

/// SVG elements whose outline can be stroke-animated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Path,
    Line,
    Polyline,
    Polygon,
    Rect,
    Circle,
    Ellipse,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        Self::Path,
        Self::Line,
        Self::Polyline,
        Self::Polygon,
        Self::Rect,
        Self::Circle,
        Self::Ellipse,
    ];

    #[inline]
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Line => "line",
            Self::Polyline => "polyline",
            Self::Polygon => "polygon",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
        }
    }

    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag_name() == name)
    }
}

fn invalid(kind: ShapeKind, reason: impl Into<String>) -> StrokeError {
    StrokeError::InvalidGeometry {
        tag: kind.tag_name().to_string(),
        reason: reason.into(),
    }
}

/// Parse a user-space length; plain numbers and `px` only.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn length_attr(shape: &DrawableTag, name: &str) -> Result<Option<f64>> {
    match shape.tag.attr(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() || raw.trim() == "auto" => Ok(None),
        Some(raw) => parse_length(raw)
            .map(Some)
            .ok_or_else(|| invalid(shape.kind, format!("{name}=\"{raw}\""))),
    }
}

fn coord(shape: &DrawableTag, name: &str) -> Result<f64> {
    Ok(length_attr(shape, name)?.unwrap_or(0.0))
}

/// Parse a `points` list. A trailing unpaired number is dropped.
fn parse_points(kind: ShapeKind, raw: &str) -> Result<Vec<Point>> {
    let numbers = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| invalid(kind, format!("bad point coordinate '{s}'")))
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(numbers
        .chunks_exact(2)
        .map(|xy| Point::new(xy[0], xy[1]))
        .collect())
}

fn polyline_length(points: &[Point], closed: bool) -> f64 {
    let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 1 => open + last.distance(*first),
        _ => open,
    }
}

fn rect_length(shape: &DrawableTag, accuracy: f64) -> Result<f64> {
    let width = coord(shape, "width")?;
    let height = coord(shape, "height")?;
    if width <= 0.0 || height <= 0.0 {
        return Ok(0.0);
    }
    // A missing radius takes the other one; both are clamped to half the side.
    let (rx, ry) = match (length_attr(shape, "rx")?, length_attr(shape, "ry")?) {
        (None, None) => (0.0, 0.0),
        (Some(rx), None) => (rx, rx),
        (None, Some(ry)) => (ry, ry),
        (Some(rx), Some(ry)) => (rx, ry),
    };
    let rx = rx.max(0.0).min(width / 2.0);
    let ry = ry.max(0.0).min(height / 2.0);
    let straight = 2.0 * (width - 2.0 * rx) + 2.0 * (height - 2.0 * ry);
    if rx == 0.0 || ry == 0.0 {
        return Ok(2.0 * (width + height));
    }
    let corners = Ellipse::new(Point::ORIGIN, (rx, ry), 0.0).perimeter(accuracy);
    Ok(straight + corners)
}

/// Stroke length of one drawable, as `getTotalLength` would report it.
pub fn shape_length(shape: &DrawableTag, accuracy: f64) -> Result<f64> {
    let kind = shape.kind;
    let length = match kind {
        ShapeKind::Path => {
            let data = shape.tag.attr("d").unwrap_or("");
            let path = BezPath::from_svg(data).map_err(|e| invalid(kind, e.to_string()))?;
            path.perimeter(accuracy)
        }
        ShapeKind::Line => {
            let p0 = Point::new(coord(shape, "x1")?, coord(shape, "y1")?);
            let p1 = Point::new(coord(shape, "x2")?, coord(shape, "y2")?);
            p0.distance(p1)
        }
        ShapeKind::Polyline | ShapeKind::Polygon => {
            let points = parse_points(kind, shape.tag.attr("points").unwrap_or(""))?;
            polyline_length(&points, kind == ShapeKind::Polygon)
        }
        ShapeKind::Rect => rect_length(shape, accuracy)?,
        ShapeKind::Circle => {
            let r = coord(shape, "r")?;
            if r <= 0.0 {
                0.0
            } else {
                let center = Point::new(coord(shape, "cx")?, coord(shape, "cy")?);
                Circle::new(center, r).perimeter(accuracy)
            }
        }
        ShapeKind::Ellipse => {
            let rx = coord(shape, "rx")?;
            let ry = coord(shape, "ry")?;
            if rx <= 0.0 || ry <= 0.0 {
                0.0
            } else {
                let center = Point::new(coord(shape, "cx")?, coord(shape, "cy")?);
                Ellipse::new(center, (rx, ry), 0.0).perimeter(accuracy)
            }
        }
    };
    Ok(length)
}

/// Measures drawables straight from their markup geometry.
///
/// Markup is always "laid out", so this measurer never asks for a retry.
/// Shapes whose geometry cannot be parsed are skipped.
#[derive(Debug)]
pub struct GeometryMeasurer<'a> {
    shapes: &'a [DrawableTag],
    accuracy: f64,
}

impl<'a> GeometryMeasurer<'a> {
    pub fn new(shapes: &'a [DrawableTag], accuracy: f64) -> Self {
        Self { shapes, accuracy }
    }
}

impl PathMeasurer for GeometryMeasurer<'_> {
    fn ensure_layout(&mut self) -> Result<()> {
        Ok(())
    }

    fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn measure(&mut self, index: usize) -> Option<f64> {
        let shape = self.shapes.get(index)?;
        match shape_length(shape, self.accuracy) {
            Ok(length) => Some(length),
            Err(err) => {
                log::debug!("skipping shape {index}: {err}");
                None
            }
        }
    }
}
