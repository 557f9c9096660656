//! Initial window placement.
//!
//! Placement runs an ordered table of rules; the first rule that yields a
//! candidate wins. The order is part of the contract:
//!
//! 1. unplaceable types (desktop, dock, toolbar, menu, utility) keep their position
//! 2. an explicit program position on a normal window is honoured (policy)
//! 3. dialogs with a resolvable transient parent are centered over it
//! 4. dialogs and splash screens are centered on the current monitor
//! 5. first fit: centered tile, below each window, right of each window
//! 6. maximizable windows go to the first monitor with nothing on it
//! 7. cascade from the current monitor's work-area origin
//!
//! Afterwards, windows at least as large as their work area are flagged
//! for maximizing, and windows mapped without focus are moved off the
//! focused window where possible. Rules 2 and 3 skip that pass; there,
//! only a modal dialog of the focused window's application that would
//! cover it is moved aside.

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorLayout;
use crate::types::{Rect, Side};
use crate::window::{WindowKind, WindowLookup, WindowRef};

/// Minimum cascade threshold, in pixels
pub const CASCADE_FUZZ: i32 = 15;

/// Space between top-left corners of successive cascades
pub const CASCADE_INTERVAL: i32 = 50;

/// Administrative placement preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPolicy {
    /// Honour USPosition on normal windows
    pub honor_program_position: bool,
    /// Center normal windows on the current monitor like dialogs
    pub center_new_windows: bool,
    pub cascade_fuzz: i32,
    pub cascade_interval: i32,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            honor_program_position: true,
            center_new_windows: false,
            cascade_fuzz: CASCADE_FUZZ,
            cascade_interval: CASCADE_INTERVAL,
        }
    }
}

/// Which rule decided a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRule {
    Unplaceable,
    ProgramPosition,
    TransientParent,
    CenterOnMonitor,
    FirstFit,
    EmptyMonitor,
    Cascade,
}

impl PlacementRule {
    /// Whether a window placed by this rule may be flagged for maximizing
    pub fn may_auto_maximize(self) -> bool {
        matches!(
            self,
            PlacementRule::FirstFit | PlacementRule::EmptyMonitor | PlacementRule::Cascade
        )
    }

    /// Whether the denied-focus avoidance pass runs after this rule
    pub fn avoids_focus(self) -> bool {
        matches!(
            self,
            PlacementRule::CenterOnMonitor
                | PlacementRule::FirstFit
                | PlacementRule::EmptyMonitor
                | PlacementRule::Cascade
        )
    }

    /// Whether a second modal dialog placed by this rule is kept from
    /// covering the focused window
    pub fn avoids_modal_stacking(self) -> bool {
        matches!(
            self,
            PlacementRule::ProgramPosition | PlacementRule::TransientParent
        )
    }
}

/// Result of placing a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Target top-left corner of the window frame
    pub x: i32,
    pub y: i32,
    /// Caller should maximize the window after mapping it
    pub auto_maximize: bool,
    pub rule: PlacementRule,
    /// Moved to keep clear of the focused window
    pub avoided_focus: bool,
    /// Natural-order index of the monitor the decision was made for
    pub monitor: usize,
}

/// Read-only snapshot the engine places against
pub struct PlacementContext<'a> {
    pub monitors: &'a MonitorLayout,
    /// Work area per monitor, in natural order
    pub work_areas: &'a [Rect],
    /// Resolves transient parents
    pub windows: &'a dyn WindowLookup,
    /// Currently focused window, if any
    pub focus_window: Option<&'a WindowRef>,
}

impl PlacementContext<'_> {
    /// Work area of a monitor, or its full geometry if none was supplied
    pub fn work_area(&self, monitor: usize) -> Rect {
        self.work_areas
            .get(monitor)
            .copied()
            .or_else(|| self.monitors.get(monitor).map(|m| m.geometry))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: i32,
    y: i32,
    monitor: usize,
}

struct Placer<'a> {
    window: &'a WindowRef,
    others: Vec<&'a WindowRef>,
    ctx: &'a PlacementContext<'a>,
    policy: &'a PlacementPolicy,
}

type RuleFn = fn(&Placer<'_>) -> Option<Candidate>;

const RULES: &[(PlacementRule, RuleFn)] = &[
    (PlacementRule::Unplaceable, keep_unplaceable),
    (PlacementRule::ProgramPosition, honor_program_position),
    (PlacementRule::TransientParent, center_over_parent),
    (PlacementRule::CenterOnMonitor, center_on_monitor),
    (PlacementRule::FirstFit, first_fit_all),
    (PlacementRule::EmptyMonitor, prefer_empty_monitor),
    (PlacementRule::Cascade, cascade),
];

/// Compute the initial position of `window`.
///
/// `visible` holds the other windows showing on the window's workspace;
/// the window itself is ignored if it appears there. Never fails: the
/// cascade rule always produces a coordinate.
pub fn place_window(
    window: &WindowRef,
    visible: &[&WindowRef],
    ctx: &PlacementContext<'_>,
    policy: &PlacementPolicy,
) -> Placement {
    log::debug!("Placing window {:?} ({:?})", window.id, window.kind);

    let placer = Placer {
        window,
        others: visible.iter().copied().filter(|w| w.id != window.id).collect(),
        ctx,
        policy,
    };

    let (rule, mut candidate) = RULES
        .iter()
        .find_map(|&(rule, apply)| apply(&placer).map(|c| (rule, c)))
        .unwrap_or_else(|| {
            let rect = window.outer_rect;
            (
                PlacementRule::Unplaceable,
                Candidate {
                    x: rect.x,
                    y: rect.y,
                    monitor: ctx.monitors.monitor_for_rect(&rect),
                },
            )
        });

    let auto_maximize = rule.may_auto_maximize() && placer.should_auto_maximize(&candidate);

    let moved = if rule.avoids_focus() {
        placer.avoid_focus_window(&candidate)
    } else if rule.avoids_modal_stacking() {
        placer.avoid_covering_focus_modal(&candidate)
    } else {
        None
    };
    let avoided_focus = moved.is_some();
    if let Some(moved) = moved {
        candidate = moved;
    }

    log::debug!(
        "Placed window {:?} at {},{} on monitor {} via {:?}{}{}",
        window.id,
        candidate.x,
        candidate.y,
        candidate.monitor,
        rule,
        if auto_maximize { " (auto-maximize)" } else { "" },
        if avoided_focus { " (avoiding focus window)" } else { "" }
    );

    Placement {
        x: candidate.x,
        y: candidate.y,
        auto_maximize,
        rule,
        avoided_focus,
        monitor: candidate.monitor,
    }
}

/// Clamp a span of `size` starting at `pos` into `[lo, lo + extent)`,
/// preferring the near edge when it cannot fit.
fn clamp_axis(pos: i32, size: i32, lo: i32, extent: i32) -> i32 {
    let hi = lo + extent - size;
    if hi < lo {
        lo
    } else {
        pos.clamp(lo, hi)
    }
}

/// Center horizontally, and a third of the way down, in `work_area`
fn center_tile(rect: Rect, work_area: Rect) -> Rect {
    let x = work_area.x + (work_area.width as i32 - rect.width as i32) / 2;
    let y = work_area.y + (work_area.height as i32 - rect.height as i32) / 3;
    rect.with_origin(x, y)
}

fn keep_unplaceable(p: &Placer<'_>) -> Option<Candidate> {
    if p.window.kind.is_placeable() {
        return None;
    }
    Some(p.current_position())
}

fn honor_program_position(p: &Placer<'_>) -> Option<Candidate> {
    if p.policy.honor_program_position
        && p.window.honor_program_position
        && p.window.kind == WindowKind::Normal
    {
        log::debug!("Honoring program position for {:?}", p.window.id);
        return Some(p.current_position());
    }
    None
}

fn center_over_parent(p: &Placer<'_>) -> Option<Candidate> {
    if !p.window.kind.is_dialog() {
        return None;
    }
    let parent_id = p.window.transient_parent?;
    let Some(parent) = p.ctx.windows.window(parent_id) else {
        log::debug!(
            "Transient parent {:?} of {:?} not found, placing as a plain dialog",
            parent_id,
            p.window.id
        );
        return None;
    };

    let parent_rect = parent.outer_rect;
    let (w, h) = (p.window.width(), p.window.height());

    let x = parent_rect.center_x() - w / 2;
    // Leave twice as much space below the dialog as above it
    let y = parent_rect.y
        + (parent_rect.height as i32 - h) / 3
        + p.window.client_offset.top as i32;

    let monitor = p.ctx.monitors.monitor_for_rect(&parent_rect);
    let wa = p.ctx.work_area(monitor);

    Some(Candidate {
        x: clamp_axis(x, w, wa.x, wa.width as i32),
        y: clamp_axis(y, h, wa.y, wa.height as i32),
        monitor,
    })
}

fn center_on_monitor(p: &Placer<'_>) -> Option<Candidate> {
    let centered = p.window.kind.is_centered()
        || (p.policy.center_new_windows && p.window.kind == WindowKind::Normal);
    if !centered {
        return None;
    }

    let monitor = p.ctx.monitors.current_index();
    let geometry = p.ctx.monitors.current().geometry;

    Some(Candidate {
        x: geometry.x + (geometry.width as i32 - p.window.width()) / 2,
        y: geometry.y + (geometry.height as i32 - p.window.height()) / 2,
        monitor,
    })
}

fn first_fit_all(p: &Placer<'_>) -> Option<Candidate> {
    let obstacles: Vec<&WindowRef> = p
        .others
        .iter()
        .copied()
        .filter(|w| w.kind.is_obstacle())
        .collect();
    p.first_fit(&obstacles, &p.others)
}

fn prefer_empty_monitor(p: &Placer<'_>) -> Option<Candidate> {
    if !p.window.wants_maximize() {
        return None;
    }

    (0..p.ctx.monitors.count()).find_map(|monitor| {
        let wa = p.ctx.work_area(monitor);
        let occupied = p
            .others
            .iter()
            .filter(|w| w.kind != WindowKind::Desktop)
            .any(|w| w.outer_rect.intersects(&wa));
        (!occupied).then_some(Candidate {
            x: wa.x,
            y: wa.y,
            monitor,
        })
    })
}

/// Fuzzy cascade: walk windows nearest the screen origin first, stepping
/// past every window already sitting on the current cascade point.
fn cascade(p: &Placer<'_>) -> Option<Candidate> {
    let monitor = p.ctx.monitors.current_index();
    let wa = p.ctx.work_area(monitor);
    let (width, height) = (p.window.width(), p.window.height());

    let fuzz = p.policy.cascade_fuzz.max(1);
    let interval = p.policy.cascade_interval.max(1);
    let (x_threshold, y_threshold) = if p.window.decorated {
        (
            (p.window.client_offset.left as i32).max(fuzz),
            (p.window.client_offset.top as i32).max(fuzz),
        )
    } else {
        (fuzz, fuzz)
    };

    let screen = p.ctx.monitors.screen_rect();
    let mut sorted = p.others.clone();
    sorted.sort_by_key(|w| {
        let dx = (w.outer_rect.x - screen.x) as i64;
        let dy = (w.outer_rect.y - screen.y) as i64;
        dx * dx + dy * dy
    });

    let (mut cascade_x, mut cascade_y) = (wa.x, wa.y);
    let mut stage = 0;
    let mut i = 0;

    while i < sorted.len() {
        let w = sorted[i];
        let frame = w.outer_rect;

        if frame.x.abs_diff(cascade_x) < x_threshold as u32
            && frame.y.abs_diff(cascade_y) < y_threshold as u32
        {
            // Go just past this window's frame origin, onto its client area
            let step_x = match w.client_offset.left as i32 {
                0 => x_threshold,
                inset => inset,
            };
            let step_y = match w.client_offset.top as i32 {
                0 => y_threshold,
                inset => inset,
            };
            cascade_x = frame.x.saturating_add(step_x);
            cascade_y = frame.y.saturating_add(step_y);

            if cascade_x.saturating_add(width) > wa.right()
                || cascade_y.saturating_add(height) > wa.bottom()
            {
                stage += 1;
                let offset = interval.saturating_mul(stage);
                cascade_x = wa.x.saturating_add(offset);
                cascade_y = wa.y.saturating_add(offset);

                if cascade_x.saturating_add(width) < wa.right()
                    && cascade_y.saturating_add(height) < wa.bottom()
                {
                    i = 0;
                    continue;
                }

                // Out of room for another cascade
                cascade_x = wa.x;
                cascade_y = wa.y;
                break;
            }
        }

        i += 1;
    }

    Some(Candidate {
        x: cascade_x,
        y: cascade_y,
        monitor,
    })
}

impl Placer<'_> {
    fn current_position(&self) -> Candidate {
        let rect = self.window.outer_rect;
        Candidate {
            x: rect.x,
            y: rect.y,
            monitor: self.ctx.monitors.monitor_for_rect(&rect),
        }
    }

    fn rect_at(&self, x: i32, y: i32) -> Rect {
        self.window.outer_rect.with_origin(x, y)
    }

    /// Try a centered tile, then below each anchor, then right of each
    /// anchor, on every monitor in natural order.
    fn first_fit(&self, obstacles: &[&WindowRef], anchors: &[&WindowRef]) -> Option<Candidate> {
        let mut below: Vec<Rect> = anchors.iter().map(|w| w.outer_rect).collect();
        below.sort_by_key(|r| (r.y, r.x));

        let mut right: Vec<Rect> = anchors.iter().map(|w| w.outer_rect).collect();
        right.sort_by_key(|r| (r.x, r.y));

        let fits = |rect: &Rect, wa: &Rect| {
            wa.contains_rect(rect) && !obstacles.iter().any(|o| o.outer_rect.intersects(rect))
        };

        for monitor in 0..self.ctx.monitors.count() {
            let wa = self.ctx.work_area(monitor);

            let candidates = std::iter::once(center_tile(self.window.outer_rect, wa))
                .chain(below.iter().map(|r| self.rect_at(r.x, r.bottom())))
                .chain(right.iter().map(|r| self.rect_at(r.right(), r.y)));

            for rect in candidates {
                if fits(&rect, &wa) {
                    return Some(Candidate {
                        x: rect.x,
                        y: rect.y,
                        monitor,
                    });
                }
            }
        }

        None
    }

    fn should_auto_maximize(&self, candidate: &Candidate) -> bool {
        if !self.window.wants_maximize() {
            return false;
        }
        let wa = self.ctx.work_area(candidate.monitor);
        self.window.outer_rect.width >= wa.width && self.window.outer_rect.height >= wa.height
    }

    /// Move a window mapped without focus off the focused window. Returns
    /// `None` when no move is needed or possible.
    fn avoid_focus_window(&self, candidate: &Candidate) -> Option<Candidate> {
        if !self.window.denied_focus_not_transient {
            return None;
        }
        let focus = self.ctx.focus_window.filter(|f| f.id != self.window.id)?;

        if !self.rect_at(candidate.x, candidate.y).intersects(&focus.outer_rect) {
            return None;
        }

        self.first_fit(&[focus], &[focus])
            .or_else(|| self.most_free_space(focus))
    }

    /// A modal dialog denied focus is likely modal to the focused window
    /// when both belong to one application. Keep it from covering that
    /// window even on paths that skip the refit.
    fn avoid_covering_focus_modal(&self, candidate: &Candidate) -> Option<Candidate> {
        if !self.window.denied_focus_not_transient || self.window.kind != WindowKind::ModalDialog {
            return None;
        }
        let focus = self.ctx.focus_window.filter(|f| f.id != self.window.id)?;

        if !self.window.same_application(focus)
            || !self.rect_at(candidate.x, candidate.y).intersects(&focus.outer_rect)
        {
            return None;
        }

        log::debug!(
            "Modal dialog {:?} was denied focus, moving it off focus window {:?}",
            self.window.id,
            focus.id
        );
        self.most_free_space(focus)
    }

    /// Put the window flush against whichever side of `focus` shows the
    /// most of it.
    fn most_free_space(&self, focus: &WindowRef) -> Option<Candidate> {
        let monitor = self.ctx.monitors.monitor_for_rect(&focus.outer_rect);
        let wa = self.ctx.work_area(monitor);
        let avoid = focus.outer_rect;
        let (w, h) = (self.window.width(), self.window.height());

        let max_width = (avoid.width as i32).min(w) as i64;
        let max_height = (avoid.height as i32).min(h) as i64;

        let left_space = avoid.x - wa.x;
        let right_space = wa.right() - avoid.right();
        let top_space = avoid.y - wa.y;
        let bottom_space = wa.bottom() - avoid.bottom();

        let visible = |space: i32, size: i32| space.min(size).max(0) as i64;
        let sides = [
            (Side::Left, visible(left_space, w) * max_height),
            (Side::Right, visible(right_space, w) * max_height),
            (Side::Top, visible(top_space, h) * max_width),
            (Side::Bottom, visible(bottom_space, h) * max_width),
        ];

        let mut best = sides[0];
        for side in &sides[1..] {
            if side.1 > best.1 {
                best = *side;
            }
        }

        // Nowhere to go, e.g. the focus window is maximized
        if best.1 == 0 {
            return None;
        }

        let (x, y) = match best.0 {
            Side::Left => {
                let x = if left_space > w { avoid.x - w } else { wa.x };
                (x, avoid.y)
            }
            Side::Right => {
                let x = if right_space > w { avoid.right() } else { wa.right() - w };
                (x, avoid.y)
            }
            Side::Top => {
                let y = if top_space > h { avoid.y - h } else { wa.y };
                (avoid.x, y)
            }
            Side::Bottom => {
                let y = if bottom_space > h { avoid.bottom() } else { wa.bottom() - h };
                (avoid.x, y)
            }
        };

        Some(Candidate {
            x: clamp_axis(x, w, wa.x, wa.width as i32),
            y: clamp_axis(y, h, wa.y, wa.height as i32),
            monitor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{FrameInsets, Windows};

    struct Fixture {
        windows: Windows,
        monitors: MonitorLayout,
        work_areas: Vec<Rect>,
        focus: Option<crate::window::WindowId>,
    }

    impl Fixture {
        fn new(monitors: &[(&str, Rect, bool)]) -> Self {
            let monitors = MonitorLayout::from_geometries(monitors);
            let work_areas = monitors.geometries();
            Self {
                windows: Windows::new(),
                monitors,
                work_areas,
                focus: None,
            }
        }

        fn single() -> Self {
            Self::new(&[("DP-1", Rect::new(0, 0, 1000, 800), true)])
        }

        fn add(&mut self, kind: WindowKind, rect: Rect) -> crate::window::WindowId {
            self.windows.insert(WindowRef::new(kind, rect))
        }

        fn place_with(&self, window: &WindowRef, policy: &PlacementPolicy) -> Placement {
            let visible: Vec<&WindowRef> = self.windows.iter().collect();
            let ctx = PlacementContext {
                monitors: &self.monitors,
                work_areas: &self.work_areas,
                windows: &self.windows,
                focus_window: self.focus.and_then(|id| self.windows.get(id)),
            };
            place_window(window, &visible, &ctx, policy)
        }

        fn place(&self, window: &WindowRef) -> Placement {
            self.place_with(window, &PlacementPolicy::default())
        }
    }

    #[test]
    fn test_unplaceable_keeps_position() {
        let fixture = Fixture::single();
        for kind in [
            WindowKind::Dock,
            WindowKind::Desktop,
            WindowKind::Toolbar,
            WindowKind::Menu,
            WindowKind::Utility,
        ] {
            let window = WindowRef::new(kind, Rect::new(13, 17, 1000, 30));
            let placement = fixture.place(&window);
            assert_eq!((placement.x, placement.y), (13, 17));
            assert_eq!(placement.rule, PlacementRule::Unplaceable);
            assert!(!placement.auto_maximize);
        }
    }

    #[test]
    fn test_program_position_honored_for_normal_windows() {
        let fixture = Fixture::single();
        let mut window = WindowRef::new(WindowKind::Normal, Rect::new(17, 23, 200, 150));
        window.honor_program_position = true;

        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (17, 23));
        assert_eq!(placement.rule, PlacementRule::ProgramPosition);

        let policy = PlacementPolicy {
            honor_program_position: false,
            ..Default::default()
        };
        let placement = fixture.place_with(&window, &policy);
        assert_eq!(placement.rule, PlacementRule::FirstFit);
    }

    #[test]
    fn test_program_position_ignored_for_dialogs() {
        let fixture = Fixture::single();
        let mut window = WindowRef::new(WindowKind::Dialog, Rect::new(17, 23, 300, 200));
        window.honor_program_position = true;

        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (350, 300));
        assert_eq!(placement.rule, PlacementRule::CenterOnMonitor);
    }

    #[test]
    fn test_transient_dialog_centered_over_parent() {
        let mut fixture = Fixture::single();
        let parent = fixture.add(WindowKind::Normal, Rect::new(100, 100, 600, 400));

        let mut dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 200, 100));
        dialog.transient_parent = Some(parent);
        dialog.client_offset = FrameInsets::new(0, 0, 20, 0);

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (300, 220));
        assert_eq!(placement.rule, PlacementRule::TransientParent);
    }

    #[test]
    fn test_transient_dialog_clamped_to_work_area() {
        let mut fixture = Fixture::single();
        let parent = fixture.add(WindowKind::Normal, Rect::new(850, 700, 100, 100));

        let mut dialog = WindowRef::new(WindowKind::ModalDialog, Rect::new(0, 0, 300, 200));
        dialog.transient_parent = Some(parent);

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (700, 600));
    }

    #[test]
    fn test_unresolved_parent_falls_back_to_centering() {
        let mut fixture = Fixture::single();
        let gone = fixture.add(WindowKind::Normal, Rect::new(0, 0, 10, 10));
        fixture.windows.remove(gone);

        let mut dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 200, 100));
        dialog.transient_parent = Some(gone);

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (400, 350));
        assert_eq!(placement.rule, PlacementRule::CenterOnMonitor);
    }

    #[test]
    fn test_dialog_centering_ignores_other_windows() {
        let mut fixture = Fixture::single();
        let dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 300, 200));
        let empty = fixture.place(&dialog);

        fixture.add(WindowKind::Normal, Rect::new(300, 250, 400, 300));
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 1000, 800));
        let crowded = fixture.place(&dialog);

        assert_eq!((empty.x, empty.y), (350, 300));
        assert_eq!((crowded.x, crowded.y), (350, 300));
    }

    #[test]
    fn test_splash_centered_on_current_monitor() {
        let mut fixture = Fixture::new(&[
            ("DP-1", Rect::new(0, 0, 1000, 800), true),
            ("HDMI-1", Rect::new(1000, 0, 1000, 800), false),
        ]);
        fixture.monitors.set_current(1);

        let splash = WindowRef::new(WindowKind::Splashscreen, Rect::new(0, 0, 300, 200));
        let placement = fixture.place(&splash);
        assert_eq!((placement.x, placement.y), (1350, 300));
        assert_eq!(placement.monitor, 1);
    }

    #[test]
    fn test_center_new_windows_policy() {
        let fixture = Fixture::single();
        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 200, 150));
        let policy = PlacementPolicy {
            center_new_windows: true,
            ..Default::default()
        };

        let placement = fixture.place_with(&window, &policy);
        assert_eq!((placement.x, placement.y), (400, 325));
        assert_eq!(placement.rule, PlacementRule::CenterOnMonitor);
    }

    #[test]
    fn test_first_fit_centered_tile() {
        let mut fixture = Fixture::single();
        fixture.work_areas = vec![Rect::new(0, 30, 1000, 770)];

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 200, 150));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (400, 236));
        assert_eq!(placement.rule, PlacementRule::FirstFit);
        assert!(!placement.auto_maximize);
    }

    #[test]
    fn test_first_fit_below_window() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 1000, 300));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 400, 300));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (0, 300));
        assert_eq!(placement.rule, PlacementRule::FirstFit);
    }

    #[test]
    fn test_first_fit_right_of_window() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 500, 800));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 400, 300));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (500, 0));
    }

    #[test]
    fn test_non_obstacles_do_not_block() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Desktop, Rect::new(0, 0, 1000, 800));
        fixture.add(WindowKind::ModalDialog, Rect::new(300, 150, 400, 400));
        fixture.add(WindowKind::Splashscreen, Rect::new(300, 150, 400, 400));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 400, 300));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (300, 166));
    }

    #[test]
    fn test_first_fit_result_never_overlaps_obstacles() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 400, 300));
        fixture.add(WindowKind::Dialog, Rect::new(350, 200, 300, 300));
        fixture.add(WindowKind::Toolbar, Rect::new(0, 500, 1000, 50));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 250, 200));
        let placement = fixture.place(&window);
        assert_eq!(placement.rule, PlacementRule::FirstFit);

        let rect = window.outer_rect.with_origin(placement.x, placement.y);
        for other in fixture.windows.iter() {
            assert!(!rect.intersects(&other.outer_rect), "{:?} overlaps {:?}", rect, other.outer_rect);
        }
    }

    #[test]
    fn test_cascade_steps_past_client_origin() {
        let mut fixture = Fixture::single();
        let id = fixture.add(WindowKind::Normal, Rect::new(0, 0, 900, 700));
        fixture.windows.get_mut(id).unwrap().client_offset = FrameInsets::new(4, 4, 24, 4);

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 900, 700));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (4, 24));
        assert_eq!(placement.rule, PlacementRule::Cascade);
        assert!(!placement.auto_maximize);
    }

    #[test]
    fn test_cascade_undecorated_neighbour_steps_by_threshold() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 900, 700));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 900, 700));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (15, 15));
    }

    fn cascade_chain(fixture: &mut Fixture, width: u32) {
        for i in 0..5 {
            let id = fixture.add(WindowKind::Normal, Rect::new(i * 4, i * 24, width, 700));
            fixture.windows.get_mut(id).unwrap().client_offset = FrameInsets::new(4, 4, 24, 4);
        }
    }

    #[test]
    fn test_cascade_starts_new_stage() {
        let mut fixture = Fixture::single();
        cascade_chain(&mut fixture, 900);

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 900, 700));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (50, 50));
        assert_eq!(placement.rule, PlacementRule::Cascade);
    }

    #[test]
    fn test_cascade_out_of_room_uses_origin() {
        let mut fixture = Fixture::single();
        cascade_chain(&mut fixture, 960);

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 960, 700));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (0, 0));
        assert_eq!(placement.rule, PlacementRule::Cascade);
    }

    #[test]
    fn test_cascade_terminates_with_many_windows() {
        let mut fixture = Fixture::single();
        for i in 0..200 {
            fixture.add(WindowKind::Normal, Rect::new((i % 40) * 15, (i % 40) * 15, 700, 500));
        }

        let policy = PlacementPolicy {
            cascade_interval: 0,
            ..Default::default()
        };
        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 700, 500));
        let placement = fixture.place_with(&window, &policy);
        assert_eq!(placement.rule, PlacementRule::Cascade);
        let wa = fixture.work_areas[0];
        assert!(placement.x >= wa.x && placement.x < wa.right());
        assert!(placement.y >= wa.y && placement.y < wa.bottom());
    }

    #[test]
    fn test_cascade_huge_policy_values_fall_back_to_origin() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 900, 700));

        let mut window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 990, 760));
        window.decorated = false;

        for policy in [
            PlacementPolicy {
                cascade_interval: i32::MAX,
                ..Default::default()
            },
            PlacementPolicy {
                cascade_fuzz: i32::MAX,
                cascade_interval: i32::MAX,
                ..Default::default()
            },
        ] {
            let placement = fixture.place_with(&window, &policy);
            assert_eq!(placement.rule, PlacementRule::Cascade);
            assert_eq!((placement.x, placement.y), (0, 0));
        }
    }

    #[test]
    fn test_empty_monitor_preferred_for_maximizable_windows() {
        let mut fixture = Fixture::new(&[
            ("DP-1", Rect::new(0, 0, 1000, 800), true),
            ("HDMI-1", Rect::new(1000, 0, 1000, 800), false),
        ]);
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 600, 500));
        fixture.add(WindowKind::Normal, Rect::new(300, 200, 600, 500));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 1200, 900));
        let placement = fixture.place(&window);
        assert_eq!((placement.x, placement.y), (1000, 0));
        assert_eq!(placement.rule, PlacementRule::EmptyMonitor);
        assert_eq!(placement.monitor, 1);
        assert!(placement.auto_maximize);
    }

    #[test]
    fn test_undecorated_window_skips_empty_monitor() {
        let mut fixture = Fixture::new(&[
            ("DP-1", Rect::new(0, 0, 1000, 800), true),
            ("HDMI-1", Rect::new(1000, 0, 1000, 800), false),
        ]);
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 600, 500));

        let mut window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 1200, 900));
        window.decorated = false;
        let placement = fixture.place(&window);
        assert_eq!(placement.rule, PlacementRule::Cascade);
        assert_eq!((placement.x, placement.y), (0, 0));
        assert!(!placement.auto_maximize);
    }

    #[test]
    fn test_denied_focus_refits_around_focus_window() {
        let mut fixture = Fixture::single();
        let focus = fixture.add(WindowKind::Normal, Rect::new(0, 0, 500, 800));
        fixture.focus = Some(focus);

        let mut dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 400, 300));
        dialog.denied_focus_not_transient = true;

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (500, 0));
        assert_eq!(placement.rule, PlacementRule::CenterOnMonitor);
        assert!(placement.avoided_focus);
    }

    #[test]
    fn test_denied_focus_most_free_space() {
        let mut fixture = Fixture::single();
        let focus = fixture.add(WindowKind::Normal, Rect::new(100, 100, 800, 600));
        fixture.focus = Some(focus);

        let mut dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 400, 300));
        dialog.denied_focus_not_transient = true;

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (100, 0));
        assert!(placement.avoided_focus);
    }

    #[test]
    fn test_denied_focus_without_overlap_is_untouched() {
        let mut fixture = Fixture::single();
        let focus = fixture.add(WindowKind::Normal, Rect::new(0, 0, 100, 100));
        fixture.focus = Some(focus);

        let mut dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 300, 200));
        dialog.denied_focus_not_transient = true;

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (350, 300));
        assert!(!placement.avoided_focus);
    }

    fn stacked_modal(fixture: &mut Fixture, app_group: Option<u64>) -> WindowRef {
        let parent = fixture.add(WindowKind::Normal, Rect::new(100, 100, 600, 400));
        fixture.windows.get_mut(parent).unwrap().app_group = Some(3);

        // First modal dialog already sits centered over the parent, focused
        let first = fixture.add(WindowKind::ModalDialog, Rect::new(300, 200, 200, 100));
        fixture.windows.get_mut(first).unwrap().app_group = Some(3);
        fixture.focus = Some(first);

        let mut second = WindowRef::new(WindowKind::ModalDialog, Rect::new(0, 0, 200, 100));
        second.transient_parent = Some(parent);
        second.denied_focus_not_transient = true;
        second.app_group = app_group;
        second
    }

    #[test]
    fn test_second_modal_dialog_moves_off_focused_dialog() {
        let mut fixture = Fixture::single();
        let second = stacked_modal(&mut fixture, Some(3));

        let placement = fixture.place(&second);
        assert_eq!(placement.rule, PlacementRule::TransientParent);
        // Every side shows the whole dialog; left wins the tie
        assert_eq!((placement.x, placement.y), (100, 200));
        assert!(placement.avoided_focus);
    }

    #[test]
    fn test_modal_dialog_of_other_application_stays_centered() {
        let mut fixture = Fixture::single();
        let second = stacked_modal(&mut fixture, Some(4));

        let placement = fixture.place(&second);
        assert_eq!(placement.rule, PlacementRule::TransientParent);
        assert_eq!((placement.x, placement.y), (300, 200));
        assert!(!placement.avoided_focus);

        let mut fixture = Fixture::single();
        let mut plain = stacked_modal(&mut fixture, Some(3));
        plain.kind = WindowKind::Dialog;
        let placement = fixture.place(&plain);
        assert_eq!((placement.x, placement.y), (300, 200));
        assert!(!placement.avoided_focus);
    }

    #[test]
    fn test_denied_focus_with_no_free_space_is_untouched() {
        let mut fixture = Fixture::single();
        let focus = fixture.add(WindowKind::Normal, Rect::new(0, 0, 1000, 800));
        fixture.focus = Some(focus);

        let mut dialog = WindowRef::new(WindowKind::Dialog, Rect::new(0, 0, 300, 200));
        dialog.denied_focus_not_transient = true;

        let placement = fixture.place(&dialog);
        assert_eq!((placement.x, placement.y), (350, 300));
        assert_eq!(placement.rule, PlacementRule::CenterOnMonitor);
        assert!(!placement.avoided_focus);
    }

    #[test]
    fn test_first_fit_auto_maximizes_full_size_window() {
        let fixture = Fixture::single();
        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 1000, 800));

        let placement = fixture.place(&window);
        assert_eq!(placement.rule, PlacementRule::FirstFit);
        assert_eq!((placement.x, placement.y), (0, 0));
        assert!(placement.auto_maximize);
    }

    #[test]
    fn test_cascade_auto_maximizes_oversized_window() {
        let mut fixture = Fixture::single();
        fixture.add(WindowKind::Normal, Rect::new(0, 0, 500, 500));

        let window = WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 1000, 800));
        let placement = fixture.place(&window);
        assert_eq!(placement.rule, PlacementRule::Cascade);
        assert_eq!((placement.x, placement.y), (0, 0));
        assert!(placement.auto_maximize);
    }

    #[test]
    fn test_clamp_axis() {
        assert_eq!(clamp_axis(50, 100, 0, 1000), 50);
        assert_eq!(clamp_axis(-10, 100, 0, 1000), 0);
        assert_eq!(clamp_axis(950, 100, 0, 1000), 900);
        assert_eq!(clamp_axis(950, 2000, 0, 1000), 0);
    }
}
