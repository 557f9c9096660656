//! Shared geometry types used across the placement engine.
//!
//! Rectangles use integer pixel coordinates with an exclusive far edge,
//! so `right() == x + width`. Touching rectangles do not intersect.

use serde::{Deserialize, Serialize};

/// A rectangle representing geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One of the two screen axes. `X` is horizontal, `Y` is vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The perpendicular axis
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Center X coordinate
    pub fn center_x(&self) -> i32 {
        self.x + (self.width as i32) / 2
    }

    /// Center Y coordinate
    pub fn center_y(&self) -> i32 {
        self.y + (self.height as i32) / 2
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Same size, moved to a new top-left corner
    pub fn with_origin(&self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, self.width, self.height)
    }

    /// Near edge on the given axis
    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Far (exclusive) edge on the given axis
    pub fn end(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.right(),
            Axis::Y => self.bottom(),
        }
    }

    /// Extent on the given axis
    pub fn size(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.width as i32,
            Axis::Y => self.height as i32,
        }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the projections of both rectangles onto `axis` overlap.
    /// Shared end points do not count.
    pub fn overlaps_on(&self, other: &Rect, axis: Axis) -> bool {
        self.size(axis) > 0
            && other.size(axis) > 0
            && self.start(axis) < other.end(axis)
            && other.start(axis) < self.end(axis)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.overlaps_on(other, Axis::X) && self.overlaps_on(other, Axis::Y)
    }

    /// True iff `inner` lies entirely within `self`
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

/// Axis-aligned overlap test; touching edges do not overlap.
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// True iff `inner` lies entirely within `outer`.
pub fn rect_contains(outer: &Rect, inner: &Rect) -> bool {
    outer.contains_rect(inner)
}

/// True if the projections of `a` and `b` onto `axis` overlap.
pub fn rects_overlap_on_axis(a: &Rect, b: &Rect, axis: Axis) -> bool {
    a.overlaps_on(b, axis)
}

/// Screen edge a strut is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
            Side::Top => 2,
            Side::Bottom => 3,
        }
    }
}

/// Screen space a window permanently reserves, one optional rectangle per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrutSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Rect>,
}

impl StrutSpec {
    pub fn get(&self, side: Side) -> Option<Rect> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, side: Side, rect: Option<Rect>) {
        match side {
            Side::Left => self.left = rect,
            Side::Right => self.right = rect,
            Side::Top => self.top = rect,
            Side::Bottom => self.bottom = rect,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Declared struts with their side, empty rectangles skipped
    pub fn iter(&self) -> impl Iterator<Item = (Side, Rect)> + '_ {
        Side::ALL
            .into_iter()
            .filter_map(move |side| self.get(side).map(|r| (side, r)))
            .filter(|(_, r)| !r.is_empty())
    }
}

/// EWMH strut partial - space reserved at screen edges by docks/panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrutPartial {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    // Extended fields for multi-monitor (start/end coords)
    pub left_start_y: u32,
    pub left_end_y: u32,
    pub right_start_y: u32,
    pub right_end_y: u32,
    pub top_start_x: u32,
    pub top_end_x: u32,
    pub bottom_start_x: u32,
    pub bottom_end_x: u32,
}

impl StrutPartial {
    /// Parse raw CARDINAL values: 12 for `_NET_WM_STRUT_PARTIAL`,
    /// 4 for the legacy `_NET_WM_STRUT`.
    pub fn from_cardinals(values: &[u32]) -> Option<StrutPartial> {
        if values.len() >= 12 {
            return Some(StrutPartial {
                left: values[0],
                right: values[1],
                top: values[2],
                bottom: values[3],
                left_start_y: values[4],
                left_end_y: values[5],
                right_start_y: values[6],
                right_end_y: values[7],
                top_start_x: values[8],
                top_end_x: values[9],
                bottom_start_x: values[10],
                bottom_end_x: values[11],
            });
        }

        if values.len() >= 4 {
            return Some(StrutPartial {
                left: values[0],
                right: values[1],
                top: values[2],
                bottom: values[3],
                ..Default::default()
            });
        }

        None
    }

    /// Convert to strut rectangles on `screen`. A zero start and end
    /// means the strut spans the whole screen edge.
    pub fn to_strut_spec(&self, screen: Rect) -> StrutSpec {
        // (start, length) of the span along the screen edge
        let span = |start: u32, end: u32, origin: i32, full: u32| -> (i32, u32) {
            if start == 0 && end == 0 {
                (origin, full)
            } else {
                (start as i32, end.saturating_sub(start) + 1)
            }
        };

        let mut spec = StrutSpec::default();

        if self.left > 0 {
            let (y, h) = span(self.left_start_y, self.left_end_y, screen.y, screen.height);
            spec.left = Some(Rect::new(screen.x, y, self.left, h));
        }
        if self.right > 0 {
            let (y, h) = span(self.right_start_y, self.right_end_y, screen.y, screen.height);
            spec.right = Some(Rect::new(screen.right() - self.right as i32, y, self.right, h));
        }
        if self.top > 0 {
            let (x, w) = span(self.top_start_x, self.top_end_x, screen.x, screen.width);
            spec.top = Some(Rect::new(x, screen.y, w, self.top));
        }
        if self.bottom > 0 {
            let (x, w) = span(self.bottom_start_x, self.bottom_end_x, screen.x, screen.width);
            spec.bottom = Some(Rect::new(x, screen.bottom() - self.bottom as i32, w, self.bottom));
        }

        spec
    }
}
