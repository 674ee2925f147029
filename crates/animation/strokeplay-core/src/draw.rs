//! Per-frame stroke-dash computation and the surface it is applied to.

use serde::{Deserialize, Serialize};

use crate::measure::{PathRecord, PathTable};

/// Dash settings for one shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeDash {
    pub element: usize,
    /// Dash and gap length, both equal to the shape length.
    pub dash_array: f64,
    /// `dash_array` while undrawn, 0 once fully drawn.
    pub dash_offset: f64,
}

impl StrokeDash {
    pub fn for_record(record: &PathRecord, current_length: f64) -> Self {
        Self {
            element: record.element,
            dash_array: record.length,
            dash_offset: record.length - record.drawn_length(current_length),
        }
    }

    /// Visible part of the shape.
    #[inline]
    pub fn drawn(&self) -> f64 {
        self.dash_array - self.dash_offset
    }

    /// CSS value for `stroke-dasharray`.
    pub fn dash_array_css(&self) -> String {
        format!("{} {}", self.dash_array, self.dash_array)
    }

    /// CSS value for `stroke-dashoffset`.
    pub fn dash_offset_css(&self) -> String {
        self.dash_offset.to_string()
    }
}

/// Complete draw state at one point of the timeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub progress: f64,
    /// Terminal state: the surface shows fills.
    pub finished: bool,
    pub strokes: Vec<StrokeDash>,
}

impl Frame {
    /// Dash state of every measured shape at `progress` (clamped to [0, 1]).
    pub fn at(table: &PathTable, progress: f64, finished: bool) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let current = table.current_length(progress);
        Self {
            progress,
            finished,
            strokes: table
                .records
                .iter()
                .map(|r| StrokeDash::for_record(r, current))
                .collect(),
        }
    }

    /// Total visible stroke length.
    pub fn drawn_length(&self) -> f64 {
        self.strokes.iter().map(StrokeDash::drawn).sum()
    }
}

/// Target that displays frames.
pub trait StrokeSurface {
    fn apply_dash(&mut self, dash: &StrokeDash);

    /// Toggle the terminal "finished" look (fills shown).
    fn set_finished(&mut self, finished: bool);

    fn apply_frame(&mut self, frame: &Frame) {
        for dash in &frame.strokes {
            self.apply_dash(dash);
        }
        self.set_finished(frame.finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PathTable {
        PathTable::from_lengths(vec![(0, 10.0), (1, 30.0), (3, 60.0)])
    }

    #[test]
    fn start_and_end_states() {
        let t = table();
        let start = Frame::at(&t, 0.0, false);
        assert!(start.strokes.iter().all(|s| s.dash_offset == s.dash_array));
        let end = Frame::at(&t, 1.0, true);
        assert!(end.strokes.iter().all(|s| s.dash_offset == 0.0));
        assert!(end.finished);
    }

    #[test]
    fn partially_drawn_segment() {
        let frame = Frame::at(&table(), 0.25, false);
        let offsets: Vec<f64> = frame.strokes.iter().map(|s| s.dash_offset).collect();
        assert_eq!(offsets, vec![0.0, 15.0, 60.0]);
        assert_eq!(frame.strokes[2].element, 3);
    }

    #[test]
    fn progress_is_clamped() {
        let t = table();
        assert_eq!(Frame::at(&t, -0.5, false).progress, 0.0);
        assert_eq!(Frame::at(&t, 1.5, false).drawn_length(), 100.0);
        assert_eq!(Frame::at(&t, f64::NAN, false).drawn_length(), 0.0);
    }

    #[test]
    fn css_values() {
        let dash = StrokeDash {
            element: 0,
            dash_array: 12.5,
            dash_offset: 2.0,
        };
        assert_eq!(dash.dash_array_css(), "12.5 12.5");
        assert_eq!(dash.dash_offset_css(), "2");
    }

    #[derive(Default)]
    struct Recorder {
        dashes: Vec<StrokeDash>,
        finished: Option<bool>,
    }

    impl StrokeSurface for Recorder {
        fn apply_dash(&mut self, dash: &StrokeDash) {
            self.dashes.push(*dash);
        }
        fn set_finished(&mut self, finished: bool) {
            self.finished = Some(finished);
        }
    }

    #[test]
    fn apply_frame_visits_every_stroke() {
        let mut surface = Recorder::default();
        surface.apply_frame(&Frame::at(&table(), 0.5, false));
        assert_eq!(surface.dashes.len(), 3);
        assert_eq!(surface.finished, Some(false));
    }
}
