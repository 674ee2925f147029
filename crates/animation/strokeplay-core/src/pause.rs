//! Pause markers embedded in SVG comments and the pause points derived
//! from them.
//!
//! `<!--Pause:UntilPlay-->` holds playback until the viewer resumes it;
//! `<!--Pause:N-->` holds it for `N` seconds. A marker takes effect at the
//! stroke boundary after the last drawable that precedes it in the text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::measure::PathTable;
use crate::scan::DrawableTag;

static MANUAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--Pause:UntilPlay-->").expect("manual pause pattern"));

static TIMED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--Pause:(\d+)-->").expect("timed pause pattern"));

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseKind {
    /// Waits for an explicit resume.
    Manual,
    /// Resumes by itself after the marker's duration.
    Timed,
}

/// A pause comment found in the markup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PauseMarker {
    /// Byte offset of the comment.
    pub offset: usize,
    pub kind: PauseKind,
    pub duration_ms: f64,
}

/// A pause point on the normalized timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PausePoint {
    pub progress: f64,
    pub kind: PauseKind,
    pub duration_ms: f64,
}

/// Find every pause marker, ordered by position in the text.
pub fn scan_pause_markers(text: &str) -> Vec<PauseMarker> {
    let manual = MANUAL_RE.find_iter(text).map(|m| PauseMarker {
        offset: m.start(),
        kind: PauseKind::Manual,
        duration_ms: 0.0,
    });
    let timed = TIMED_RE.captures_iter(text).filter_map(|c| {
        let whole = c.get(0)?;
        let seconds: f64 = c[1].parse().ok()?;
        Some(PauseMarker {
            offset: whole.start(),
            kind: PauseKind::Timed,
            duration_ms: seconds * 1000.0,
        })
    });
    let mut markers: Vec<PauseMarker> = manual.chain(timed).collect();
    markers.sort_by_key(|m| m.offset);
    markers
}

/// Map markers onto the measured timeline.
///
/// Each marker counts the drawables that start before it in the text and
/// pauses where the last measured one of those ends.
pub fn derive_pause_points(
    markers: &[PauseMarker],
    drawables: &[DrawableTag],
    table: &PathTable,
) -> Vec<PausePoint> {
    let points: Vec<PausePoint> = markers
        .iter()
        .map(|marker| {
            let preceding = drawables
                .iter()
                .take_while(|d| d.tag.offset < marker.offset)
                .count();
            PausePoint {
                progress: table.progress_before(preceding),
                kind: marker.kind,
                duration_ms: marker.duration_ms,
            }
        })
        .collect();
    if !points.is_empty() {
        log::debug!("derived pause points: {points:?}");
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan_drawables;

    #[test]
    fn markers_are_merged_in_document_order() {
        let text = "<svg><!--Pause:3--><path/><!--Pause:UntilPlay--><!--Pause:0--></svg>";
        let markers = scan_pause_markers(text);
        let kinds: Vec<PauseKind> = markers.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![PauseKind::Timed, PauseKind::Manual, PauseKind::Timed]
        );
        assert_eq!(markers[0].duration_ms, 3000.0);
        assert_eq!(markers[1].duration_ms, 0.0);
        assert_eq!(markers[2].duration_ms, 0.0);
        assert!(markers.windows(2).all(|w| w[0].offset < w[1].offset));
    }

    #[test]
    fn malformed_markers_are_ignored() {
        let text = "<!-- Pause:3 --><!--Pause:1.5--><!--pause:untilplay--><!--Pause:-->";
        assert!(scan_pause_markers(text).is_empty());
    }

    #[test]
    fn markers_map_to_path_boundaries() {
        let text = concat!(
            "<svg>",
            "<!--Pause:1-->",
            r#"<line x2="10"/>"#,
            "<!--Pause:UntilPlay-->",
            r#"<line x2="30"/>"#,
            r#"<line x2="60"/>"#,
            "<!--Pause:2-->",
            "</svg>"
        );
        let drawables = scan_drawables(text);
        let table = PathTable::from_lengths(vec![(0, 10.0), (1, 30.0), (2, 60.0)]);
        let points = derive_pause_points(&scan_pause_markers(text), &drawables, &table);
        let progress: Vec<f64> = points.iter().map(|p| p.progress).collect();
        assert_eq!(progress, vec![0.0, 0.1, 1.0]);
        assert_eq!(points[0].kind, PauseKind::Timed);
        assert_eq!(points[0].duration_ms, 1000.0);
        assert_eq!(points[1].kind, PauseKind::Manual);
    }

    #[test]
    fn nothing_measured_pauses_at_start() {
        let text = r#"<svg><path d="M0 0"/><!--Pause:UntilPlay--></svg>"#;
        let points = derive_pause_points(
            &scan_pause_markers(text),
            &scan_drawables(text),
            &PathTable::default(),
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].progress, 0.0);
    }
}
