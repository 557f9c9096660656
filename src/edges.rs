//! Snap-edge index for keyboard/pointer move and resize.
//!
//! For a window being moved, collects the lines it could snap to on each
//! axis: its work-area bounds, the screen bounds, monitor seams inside the
//! screen, and the near/far edges of other windows that share a band with
//! it on the perpendicular axis.

use std::collections::BTreeSet;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorLayout;
use crate::types::{Axis, Rect};
use crate::window::WindowRef;

/// Direction of travel along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards larger coordinates (right / down)
    Increasing,
    /// Towards smaller coordinates (left / up)
    Decreasing,
}

/// Sorted candidate edges for one window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeIndex {
    /// X positions of vertical lines
    vertical: BTreeSet<i32>,
    /// Y positions of horizontal lines
    horizontal: BTreeSet<i32>,
}

impl EdgeIndex {
    /// Build the index for `window`. `others` are the windows visible on
    /// its workspace; the window itself is skipped if present.
    pub fn build(
        window: &WindowRef,
        others: &[&WindowRef],
        work_area: Rect,
        monitors: &MonitorLayout,
    ) -> Self {
        let screen = monitors.screen_rect();
        let rect = window.outer_rect;

        let mut index = EdgeIndex::default();
        for axis in [Axis::X, Axis::Y] {
            let set = index.edges_mut(axis);

            set.insert(work_area.start(axis));
            set.insert(work_area.end(axis));
            set.insert(screen.start(axis));
            set.insert(screen.end(axis));
            set.extend(monitors.interior_edges(axis));

            for other in others {
                if other.id == window.id {
                    continue;
                }
                let o = other.outer_rect;
                if o.overlaps_on(&rect, axis.other()) {
                    set.insert(o.start(axis));
                    set.insert(o.end(axis));
                }
            }
        }

        index
    }

    fn edges_mut(&mut self, axis: Axis) -> &mut BTreeSet<i32> {
        match axis {
            Axis::X => &mut self.vertical,
            Axis::Y => &mut self.horizontal,
        }
    }

    /// Candidate lines on `axis`: vertical lines for X, horizontal for Y
    pub fn edges(&self, axis: Axis) -> &BTreeSet<i32> {
        match axis {
            Axis::X => &self.vertical,
            Axis::Y => &self.horizontal,
        }
    }

    pub fn vertical_edges(&self) -> &BTreeSet<i32> {
        &self.vertical
    }

    pub fn horizontal_edges(&self) -> &BTreeSet<i32> {
        &self.horizontal
    }

    /// New near-corner coordinate that puts the leading edge of `rect`
    /// on the next line in `direction`, or the current coordinate if
    /// there is none.
    pub fn find_next_edge(&self, rect: Rect, axis: Axis, direction: Direction) -> i32 {
        let edges = self.edges(axis);
        let start = rect.start(axis);

        match direction {
            Direction::Increasing => {
                let far = rect.end(axis);
                edges
                    .range((Bound::Excluded(far), Bound::Unbounded))
                    .next()
                    .map_or(start, |&edge| edge - rect.size(axis))
            }
            Direction::Decreasing => edges.range(..start).next_back().copied().unwrap_or(start),
        }
    }

    /// Near-corner coordinate closest to `reference` that aligns either
    /// edge of `rect` with a candidate line. Ties go to the lowest line,
    /// near-edge alignment first.
    pub fn find_nearest_edge(&self, rect: Rect, axis: Axis, reference: i32) -> i32 {
        let size = rect.size(axis);
        let mut best: Option<(i32, i64)> = None;

        for &edge in self.edges(axis) {
            for candidate in [edge, edge - size] {
                let dist = (candidate as i64 - reference as i64).abs();
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((candidate, dist));
                }
            }
        }

        best.map_or(rect.start(axis), |(pos, _)| pos)
    }
}

/// Sorted X positions `window` can snap to
pub fn vertical_edges(
    window: &WindowRef,
    others: &[&WindowRef],
    work_area: Rect,
    monitors: &MonitorLayout,
) -> BTreeSet<i32> {
    EdgeIndex::build(window, others, work_area, monitors).vertical
}

/// Sorted Y positions `window` can snap to
pub fn horizontal_edges(
    window: &WindowRef,
    others: &[&WindowRef],
    work_area: Rect,
    monitors: &MonitorLayout,
) -> BTreeSet<i32> {
    EdgeIndex::build(window, others, work_area, monitors).horizontal
}
