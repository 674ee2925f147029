//! Path measurement: cumulative stroke positions of every drawable shape.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Position of one measured shape within the total stroke length.
///
/// `start_at..end_at` is the shape's segment of the cumulative length;
/// segments are contiguous in document order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Index of the shape among all drawables, in document order.
    pub element: usize,
    pub length: f64,
    pub start_at: f64,
    pub end_at: f64,
}

impl PathRecord {
    /// Portion of this shape drawn once `current` units of the total stroke
    /// are visible.
    #[inline]
    pub fn drawn_length(&self, current: f64) -> f64 {
        if current >= self.end_at {
            self.length
        } else {
            (current - self.start_at).clamp(0.0, self.length)
        }
    }
}

/// All measured shapes of one document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathTable {
    pub records: Vec<PathRecord>,
    pub total_length: f64,
}

impl PathTable {
    /// Build from `(element, length)` pairs, dropping zero-length and
    /// non-finite entries.
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut records = Vec::new();
        let mut total = 0.0;
        for (element, length) in lengths {
            if !(length.is_finite() && length > 0.0) {
                continue;
            }
            records.push(PathRecord {
                element,
                length,
                start_at: total,
                end_at: total + length,
            });
            total += length;
        }
        Self {
            records,
            total_length: total,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Fraction of the total length covered by every shape whose element
    /// index is below `element_count`.
    ///
    /// Returns 0 when nothing precedes the boundary or nothing was measured.
    pub fn progress_before(&self, element_count: usize) -> f64 {
        if self.total_length <= 0.0 {
            return 0.0;
        }
        let covered = self
            .records
            .iter()
            .take_while(|r| r.element < element_count)
            .last()
            .map_or(0.0, |r| r.end_at);
        (covered / self.total_length).clamp(0.0, 1.0)
    }

    /// Total length visible at `progress`.
    #[inline]
    pub fn current_length(&self, progress: f64) -> f64 {
        self.total_length * progress.clamp(0.0, 1.0)
    }
}

/// Source of shape lengths.
///
/// Implemented over live browser elements by the wasm adapter and over the
/// markup itself by [`GeometryMeasurer`](crate::shape::GeometryMeasurer).
pub trait PathMeasurer {
    /// Fails with a recoverable error while the drawing has no layout yet.
    fn ensure_layout(&mut self) -> Result<()>;

    /// Number of drawable shapes, including ones that will be skipped.
    fn shape_count(&self) -> usize;

    /// Length of one shape, or `None` when it cannot be measured.
    fn measure(&mut self, index: usize) -> Option<f64>;
}

/// Lengths already known to the caller, e.g. collected by script.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnownLengths(pub Vec<f64>);

impl PathMeasurer for KnownLengths {
    fn ensure_layout(&mut self) -> Result<()> {
        Ok(())
    }

    fn shape_count(&self) -> usize {
        self.0.len()
    }

    fn measure(&mut self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

/// Measure every shape and build the cumulative table.
///
/// Nothing is kept from a failed attempt; the caller either gets a complete
/// table or an error.
pub fn measure_paths(measurer: &mut dyn PathMeasurer) -> Result<PathTable> {
    measurer.ensure_layout()?;
    let count = measurer.shape_count();
    let mut lengths = Vec::with_capacity(count);
    for index in 0..count {
        if let Some(length) = measurer.measure(index) {
            lengths.push((index, length));
        }
    }
    let table = PathTable::from_lengths(lengths);
    log::info!(
        "measured {} of {} shapes, total length {:.2}",
        table.len(),
        count,
        table.total_length
    );
    Ok(table)
}
