//! Monitor layout snapshot.
//!
//! Monitors are kept in their natural order (leftmost first, then topmost),
//! which is the order first-fit placement walks them in. Indices into a
//! `MonitorLayout` always refer to that order.

use serde::{Deserialize, Serialize};

use crate::types::{Axis, Rect};

/// A physical monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    /// Caller-assigned identifier (e.g. RandR monitor number)
    pub id: u32,
    /// Output name (e.g., "DP-1", "HDMI-0")
    pub name: String,
    /// Whether this is the primary monitor
    #[serde(default)]
    pub primary: bool,
    /// Position and size on the root window
    pub geometry: Rect,
}

impl Monitor {
    pub fn new(id: u32, name: impl Into<String>, geometry: Rect, primary: bool) -> Self {
        Self {
            id,
            name: name.into(),
            primary,
            geometry,
        }
    }
}

/// Ordered set of monitors making up the screen
#[derive(Debug, Clone)]
pub struct MonitorLayout {
    monitors: Vec<Monitor>,
    /// Index of the monitor new windows go to by default
    current: usize,
}

impl MonitorLayout {
    /// Build a layout, sorting monitors into natural order.
    /// The current monitor starts on the primary, or the first one.
    pub fn new(mut monitors: Vec<Monitor>) -> Self {
        if monitors.is_empty() {
            log::warn!("No monitors supplied, creating empty fallback monitor");
            monitors.push(Monitor::new(0, "default", Rect::default(), true));
        }

        monitors.sort_by_key(|m| (m.geometry.x, m.geometry.y, m.id));

        let mut layout = Self { monitors, current: 0 };
        layout.current = layout.primary().unwrap_or(0);
        layout
    }

    /// Build a layout from (name, geometry, is_primary) tuples
    pub fn from_geometries(configs: &[(&str, Rect, bool)]) -> Self {
        let monitors = configs
            .iter()
            .enumerate()
            .map(|(i, (name, geometry, primary))| Monitor::new(i as u32, *name, *geometry, *primary))
            .collect();
        Self::new(monitors)
    }

    pub fn get(&self, index: usize) -> Option<&Monitor> {
        self.monitors.get(index)
    }

    /// The monitor new windows are centered on
    pub fn current(&self) -> &Monitor {
        &self.monitors[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Set the current monitor
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.monitors.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> usize {
        self.monitors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.iter()
    }

    pub fn geometries(&self) -> Vec<Rect> {
        self.monitors.iter().map(|m| m.geometry).collect()
    }

    /// Find the primary monitor
    pub fn primary(&self) -> Option<usize> {
        self.monitors.iter().position(|m| m.primary)
    }

    /// Find a monitor by name
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.monitors.iter().position(|m| m.name == name)
    }

    /// Find the monitor containing a point
    pub fn monitor_at(&self, x: i32, y: i32) -> Option<usize> {
        self.monitors
            .iter()
            .position(|m| m.geometry.contains_point(x, y))
    }

    /// The monitor a rectangle mostly lies on. Falls back to the
    /// monitor under its center, then to the current monitor.
    pub fn monitor_for_rect(&self, rect: &Rect) -> usize {
        let mut best: Option<(usize, u64)> = None;

        for (i, monitor) in self.monitors.iter().enumerate() {
            if let Some(overlap) = monitor.geometry.intersection(rect) {
                let area = overlap.area();
                if best.map_or(true, |(_, a)| area > a) {
                    best = Some((i, area));
                }
            }
        }

        best.map(|(i, _)| i)
            .or_else(|| self.monitor_at(rect.center_x(), rect.center_y()))
            .unwrap_or(self.current)
    }

    /// Bounding rectangle of all monitors
    pub fn screen_rect(&self) -> Rect {
        self.monitors
            .iter()
            .map(|m| m.geometry)
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default()
    }

    /// Monitor boundaries on `axis` that lie strictly inside the screen
    pub fn interior_edges(&self, axis: Axis) -> Vec<i32> {
        let screen = self.screen_rect();
        let (lo, hi) = (screen.start(axis), screen.end(axis));

        let mut edges: Vec<i32> = self
            .monitors
            .iter()
            .flat_map(|m| [m.geometry.start(axis), m.geometry.end(axis)])
            .filter(|&e| e > lo && e < hi)
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Index pairs of monitors whose rectangles overlap
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.monitors.len() {
            for j in (i + 1)..self.monitors.len() {
                if self.monitors[i].geometry.intersects(&self.monitors[j].geometry) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
