//! Visible x-range, manual-shift control bounds and reference lines.

use egui::Color32;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::series::{x_extent, Domain};

/// Constants used to derive manual-shift step and limits from the visible range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftBoundsConfig {
    /// Step as a fraction of the range length for index-domain data.
    pub index_step_fraction: f64,
    /// Step as a fraction of the range length for time-domain data.
    pub time_step_fraction: f64,
    /// Lower bound for the step so a zero-length range never yields 0.
    pub minimum_step: f64,
    /// Smallest limit offered to shift controls.
    pub base_limit: f64,
}

impl Default for ShiftBoundsConfig {
    fn default() -> Self {
        Self {
            index_step_fraction: 0.01,
            time_step_fraction: 0.001,
            minimum_step: 1.0,
            base_limit: 100.0,
        }
    }
}

/// Step and symmetric limit for a manual-shift control.
///
/// These are usability bounds; stored offsets may exceed them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftBounds {
    pub step: f64,
    pub limit: f64,
}

impl ShiftBounds {
    pub fn range(&self) -> std::ops::RangeInclusive<f64> {
        -self.limit..=self.limit
    }
}

/// A relayout notification from the plot surface, parsed once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelayoutEvent {
    RangeChanged { lo: f64, hi: f64 },
    AutoRangeReset,
    ShapeMoved { index: usize, x: f64 },
}

impl RelayoutEvent {
    /// Parse a Plotly-style relayout payload.
    ///
    /// Recognised shapes are `{"xaxis.autorange": true}`,
    /// `{"xaxis.range[0]": lo, "xaxis.range[1]": hi}` (or `"xaxis.range": [lo, hi]`)
    /// and `{"shapes[i].x0": x}`. Anything else yields `None`.
    pub fn parse(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;

        if obj.get("xaxis.autorange").and_then(Value::as_bool) == Some(true) {
            return Some(RelayoutEvent::AutoRangeReset);
        }

        let pair = match (obj.get("xaxis.range[0]"), obj.get("xaxis.range[1]")) {
            (Some(lo), Some(hi)) => lo.as_f64().zip(hi.as_f64()),
            _ => obj
                .get("xaxis.range")
                .and_then(Value::as_array)
                .filter(|a| a.len() == 2)
                .and_then(|a| a[0].as_f64().zip(a[1].as_f64())),
        };
        if let Some((a, b)) = pair {
            return Self::range(a, b);
        }

        obj.iter().find_map(|(key, value)| {
            let index = key
                .strip_prefix("shapes[")?
                .strip_suffix("].x0")?
                .parse::<usize>()
                .ok()?;
            let x = value.as_f64().filter(|x| x.is_finite())?;
            Some(RelayoutEvent::ShapeMoved { index, x })
        })
    }

    /// Range event with ordered, finite, non-degenerate bounds.
    pub fn range(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() || a == b {
            return None;
        }
        Some(RelayoutEvent::RangeChanged {
            lo: a.min(b),
            hi: a.max(b),
        })
    }
}

/// A draggable vertical marker, independent of any series.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub id: u32,
    pub x: f64,
    pub color: Color32,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceLines {
    lines: Vec<ReferenceLine>,
    next_id: u32,
}

impl ReferenceLines {
    const COLORS: [Color32; 4] = [
        Color32::from_rgb(220, 50, 47),
        Color32::from_rgb(38, 139, 210),
        Color32::from_rgb(133, 153, 0),
        Color32::from_rgb(211, 54, 130),
    ];

    pub fn add(&mut self, x: f64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let color = Self::COLORS[id as usize % Self::COLORS.len()];
        self.lines.push(ReferenceLine { id, x, color });
        id
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() != before
    }

    /// Move the line at position `index` (shape order, not id).
    pub fn move_to(&mut self, index: usize, x: f64) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.x = x;
                true
            }
            None => false,
        }
    }

    pub fn lines(&self) -> &[ReferenceLine] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Tracks the visible x-range and the extent of the selected series.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    visible_range: Option<(f64, f64)>,
    data_range: Option<(f64, f64)>,
    domain: Domain,
    bounds: ShiftBoundsConfig,
    reference_lines: ReferenceLines,
}

impl ViewportController {
    pub fn new(bounds: ShiftBoundsConfig) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    /// Recompute the cached extent and domain from the selected series.
    ///
    /// Call only when the selection (or the selected buffer) changes; this
    /// scans the whole buffer.
    pub fn select(&mut self, x: Option<&[f64]>) {
        self.data_range = x.and_then(x_extent);
        self.domain = x.map(Domain::detect).unwrap_or_default();
    }

    /// Take a known extent instead of scanning a buffer. Used for channels
    /// that are only ever held as downsampled windows.
    pub fn select_extent(&mut self, range: Option<(f64, f64)>, domain: Domain) {
        self.data_range = range.filter(|(lo, hi)| lo.is_finite() && hi.is_finite() && lo <= hi);
        self.domain = domain;
    }

    pub fn visible_range(&self) -> Option<(f64, f64)> {
        self.visible_range
    }

    pub fn data_range(&self) -> Option<(f64, f64)> {
        self.data_range
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The explicit zoom window, or the selected series' full extent under autorange.
    pub fn effective_range(&self) -> Option<(f64, f64)> {
        self.visible_range.or(self.data_range)
    }

    pub fn set_visible_range(&mut self, range: Option<(f64, f64)>) {
        self.visible_range = range;
    }

    pub fn shift_bounds(&self) -> ShiftBounds {
        let length = self
            .effective_range()
            .map(|(lo, hi)| (hi - lo).abs())
            .unwrap_or(0.0);
        let fraction = match self.domain {
            Domain::Index => self.bounds.index_step_fraction,
            Domain::Time => self.bounds.time_step_fraction,
        };
        ShiftBounds {
            step: self.bounds.minimum_step.max((length * fraction).ceil()),
            limit: self.bounds.base_limit.max(length * 1.5),
        }
    }

    /// Apply a parsed relayout event. Returns `true` when state changed.
    pub fn apply(&mut self, event: RelayoutEvent) -> bool {
        match event {
            RelayoutEvent::RangeChanged { lo, hi } => {
                let changed = self.visible_range != Some((lo, hi));
                self.visible_range = Some((lo, hi));
                changed
            }
            RelayoutEvent::AutoRangeReset => self.visible_range.take().is_some(),
            RelayoutEvent::ShapeMoved { index, x } => self.reference_lines.move_to(index, x),
        }
    }

    pub fn reference_lines(&self) -> &ReferenceLines {
        &self.reference_lines
    }

    pub fn reference_lines_mut(&mut self) -> &mut ReferenceLines {
        &mut self.reference_lines
    }

    pub fn reset(&mut self) {
        self.visible_range = None;
        self.data_range = None;
        self.domain = Domain::default();
        self.reference_lines.clear();
    }
}
