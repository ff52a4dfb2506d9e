//! Range slicing over sorted sample buffers.
//!
//! A cut is resolved into a half-open index range `start..end` that can be
//! used to borrow both the x and y columns of a series without copying.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// First index whose value is `>= lower`.
#[inline]
pub fn find_start(x: &[f64], lower: f64) -> usize {
    x.partition_point(|&v| v < lower)
}

/// First index whose value is `>= upper`; everything before it is `< upper`.
#[inline]
pub fn find_end(x: &[f64], upper: f64) -> usize {
    x.partition_point(|&v| v < upper)
}

/// Indices of all samples with `lower <= x[i] < upper`.
///
/// `x` must be non-decreasing. Inverted or NaN bounds yield an empty range.
pub fn slice_by_value(x: &[f64], lower: f64, upper: f64) -> Range<usize> {
    if lower.is_nan() || upper.is_nan() {
        return 0..0;
    }
    let start = find_start(x, lower);
    let end = find_end(x, upper).max(start);
    start..end
}

/// Clamp `start..end` (sample indices, possibly fractional or negative) into `0..len`.
pub fn slice_by_index(len: usize, start: f64, end: f64) -> Range<usize> {
    let clamp = |v: f64| -> usize {
        if v.is_nan() || v <= 0.0 {
            0
        } else if v >= len as f64 {
            len
        } else {
            v.floor() as usize
        }
    };
    let s = clamp(start);
    let e = clamp(end).max(s);
    s..e
}

/// Whether cut bounds are sample indices or x (time) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    #[default]
    Index,
    Time,
}

/// A user-selected sub-range of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRange {
    pub start: f64,
    pub end: f64,
    pub enabled: bool,
}

impl Default for CutRange {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            enabled: false,
        }
    }
}

impl CutRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            enabled: true,
        }
    }

    /// Index range of `x` selected by this cut. A disabled cut selects everything.
    pub fn resolve(&self, x: &[f64], mode: CutMode) -> Range<usize> {
        if !self.enabled {
            return 0..x.len();
        }
        match mode {
            CutMode::Index => slice_by_index(x.len(), self.start, self.end),
            CutMode::Time => slice_by_value(x, self.start, self.end),
        }
    }

    /// The cut as a time window, when enabled.
    pub fn span(&self) -> Option<(f64, f64)> {
        self.enabled.then_some((self.start, self.end))
    }
}
