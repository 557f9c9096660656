//! Workspace (virtual desktop) management.
//!
//! Each workspace owns a lazily computed work-area cache: one rectangle
//! per monitor, a screen-wide rectangle, and the strut rectangles on the
//! first monitor per side. The cache is either entirely valid or entirely
//! absent. It is dropped by `invalidate()` and rebuilt on the next read;
//! a change in monitor geometry also forces a rebuild. The manager reports
//! every cache it drops together with an `InvalidationReason`.

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorLayout;
use crate::place::{place_window, Placement, PlacementContext, PlacementPolicy};
use crate::types::{Rect, Side, StrutSpec};
use crate::window::{WindowId, WindowLookup, WindowRef};
use crate::workarea::{compute_work_area, MIN_SANE_AREA};

/// Default number of workspaces (virtual desktops)
pub const DEFAULT_NUM_WORKSPACES: usize = 4;

/// Why a workspace dropped its cached work areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// A window reserving space became a member
    StrutWindowJoined,
    /// A window reserving space stopped being a member
    StrutWindowLeft,
    /// A member changed its strut declaration
    StrutsChanged,
    MonitorsChanged,
}

impl InvalidationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidationReason::StrutWindowJoined => "strut_window_joined",
            InvalidationReason::StrutWindowLeft => "strut_window_left",
            InvalidationReason::StrutsChanged => "struts_changed",
            InvalidationReason::MonitorsChanged => "monitors_changed",
        }
    }
}

/// A workspace whose cache was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    pub workspace: usize,
    pub reason: InvalidationReason,
}

/// Derived work-area data for one workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAreaCache {
    /// Monitor geometries this cache was computed against
    monitors: Vec<Rect>,
    monitor_areas: Vec<Rect>,
    screen_area: Rect,
    /// Strut rectangles on the first monitor, indexed by `Side::index()`
    struts: [Vec<Rect>; 4],
}

impl WorkAreaCache {
    fn compute(struts: &[&StrutSpec], monitors: &MonitorLayout, min_sane: u32) -> Self {
        let monitor_areas = monitors
            .iter()
            .map(|m| compute_work_area(m.geometry, struts.iter().copied(), min_sane))
            .collect();

        // The screen-wide area only honours struts on the first monitor
        let first = monitors.get(0).map(|m| m.geometry).unwrap_or_default();
        let mut first_struts: Vec<StrutSpec> = Vec::new();
        let mut lists: [Vec<Rect>; 4] = Default::default();

        for spec in struts {
            let mut kept = StrutSpec::default();
            for (side, rect) in spec.iter() {
                if rect.intersects(&first) {
                    kept.set(side, Some(rect));
                    lists[side.index()].push(rect);
                }
            }
            if !kept.is_empty() {
                first_struts.push(kept);
            }
        }

        let screen_area = compute_work_area(monitors.screen_rect(), &first_struts, min_sane);

        Self {
            monitors: monitors.geometries(),
            monitor_areas,
            screen_area,
            struts: lists,
        }
    }

    /// Whether this cache was computed against the given monitor geometry
    pub fn is_for(&self, monitors: &MonitorLayout) -> bool {
        self.monitors.len() == monitors.count()
            && self.monitors.iter().zip(monitors.iter()).all(|(r, m)| *r == m.geometry)
    }

    pub fn monitor_area(&self, index: usize) -> Option<Rect> {
        self.monitor_areas.get(index).copied()
    }

    pub fn monitor_areas(&self) -> &[Rect] {
        &self.monitor_areas
    }

    pub fn screen_area(&self) -> Rect {
        self.screen_area
    }

    pub fn struts(&self, side: Side) -> &[Rect] {
        &self.struts[side.index()]
    }
}

/// A workspace (virtual desktop)
#[derive(Debug)]
pub struct Workspace {
    /// Position among all workspaces (0-based)
    pub index: usize,
    /// Member windows, most recently added last
    members: Vec<WindowId>,
    cache: Option<WorkAreaCache>,
    min_sane_size: u32,
}

impl Workspace {
    /// Create a new, empty workspace
    pub fn new(index: usize) -> Self {
        Self::with_min_sane_size(index, MIN_SANE_AREA)
    }

    pub fn with_min_sane_size(index: usize, min_sane_size: u32) -> Self {
        Self {
            index,
            members: Vec::new(),
            cache: None,
            min_sane_size,
        }
    }

    pub fn members(&self) -> &[WindowId] {
        &self.members
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.members.contains(&id)
    }

    /// Add a member. Invalidates the cache if the window reserves space.
    pub fn add_window(&mut self, window: &WindowRef) {
        if self.contains(window.id) {
            return;
        }
        self.members.push(window.id);

        if window.has_struts() {
            log::debug!(
                "Invalidating work area of workspace {} since {:?} with struts joined",
                self.index,
                window.id
            );
            self.invalidate();
        }
    }

    /// Remove a member. Invalidates the cache if the window reserved space.
    pub fn remove_window(&mut self, window: &WindowRef) -> bool {
        let Some(pos) = self.members.iter().position(|&id| id == window.id) else {
            return false;
        };
        self.members.remove(pos);

        if window.has_struts() {
            log::debug!(
                "Invalidating work area of workspace {} since {:?} with struts left",
                self.index,
                window.id
            );
            self.invalidate();
        }
        true
    }

    /// A member's strut declaration changed
    pub fn struts_changed(&mut self, id: WindowId) {
        if self.contains(id) {
            self.invalidate();
        }
    }

    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            log::debug!("Invalidated work area for workspace {}", self.index);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.cache.is_some()
    }

    /// Run `change` and report whether it dropped a valid cache
    fn tracked(
        &mut self,
        reason: InvalidationReason,
        change: impl FnOnce(&mut Self),
    ) -> Option<Invalidation> {
        let was_valid = self.is_valid();
        change(self);
        (was_valid && !self.is_valid()).then_some(Invalidation {
            workspace: self.index,
            reason,
        })
    }

    /// Compute work areas from the current members without touching
    /// the cache.
    pub fn compute_cache(&self, windows: &impl WindowLookup, monitors: &MonitorLayout) -> WorkAreaCache {
        let struts: Vec<&StrutSpec> = self
            .members
            .iter()
            .filter_map(|&id| windows.window(id))
            .filter_map(|w| w.struts.as_ref())
            .collect();

        WorkAreaCache::compute(&struts, monitors, self.min_sane_size)
    }

    /// The cache as it stands, if valid
    pub fn cached(&self) -> Option<&WorkAreaCache> {
        self.cache.as_ref()
    }

    pub fn min_sane_size(&self) -> u32 {
        self.min_sane_size
    }

    /// Return the cache, rebuilding it if it was invalidated or the
    /// monitor layout changed since it was built.
    pub fn ensure_valid(
        &mut self,
        windows: &impl WindowLookup,
        monitors: &MonitorLayout,
    ) -> &WorkAreaCache {
        let cache = match self.cache.take() {
            Some(cache) if cache.is_for(monitors) => cache,
            _ => {
                let cache = self.compute_cache(windows, monitors);
                for (i, area) in cache.monitor_areas.iter().enumerate() {
                    log::debug!(
                        "Computed work area for workspace {} monitor {}: {},{} {}x{}",
                        self.index,
                        i,
                        area.x,
                        area.y,
                        area.width,
                        area.height
                    );
                }
                cache
            }
        };

        self.cache.insert(cache)
    }

    /// Usable area of one monitor (natural-order index). An unknown
    /// index yields the screen-wide work area.
    pub fn work_area(
        &mut self,
        monitor_index: usize,
        windows: &impl WindowLookup,
        monitors: &MonitorLayout,
    ) -> Rect {
        let index = self.index;
        let cache = self.ensure_valid(windows, monitors);
        cache.monitor_area(monitor_index).unwrap_or_else(|| {
            log::warn!(
                "Work area requested for unknown monitor {} on workspace {}",
                monitor_index,
                index
            );
            cache.screen_area()
        })
    }

    /// Work areas of every monitor, in natural order
    pub fn work_areas(&mut self, windows: &impl WindowLookup, monitors: &MonitorLayout) -> Vec<Rect> {
        self.ensure_valid(windows, monitors).monitor_areas().to_vec()
    }

    /// Work area over all monitors, for the legacy single-rectangle hint
    pub fn screen_work_area(&mut self, windows: &impl WindowLookup, monitors: &MonitorLayout) -> Rect {
        self.ensure_valid(windows, monitors).screen_area()
    }

    /// Strut rectangles on `side` that touch the first monitor
    pub fn struts(
        &mut self,
        side: Side,
        windows: &impl WindowLookup,
        monitors: &MonitorLayout,
    ) -> Vec<Rect> {
        self.ensure_valid(windows, monitors).struts(side).to_vec()
    }

    /// Resolve the members through `windows`, skipping unknown ids
    pub fn visible_windows<'a, L: WindowLookup>(&self, windows: &'a L) -> Vec<&'a WindowRef> {
        self.members
            .iter()
            .filter_map(|&id| windows.window(id))
            .collect()
    }

    /// Compute the initial position of `window` on this workspace
    pub fn place<L: WindowLookup>(
        &mut self,
        window: &WindowRef,
        windows: &L,
        monitors: &MonitorLayout,
        focus: Option<WindowId>,
        policy: &PlacementPolicy,
    ) -> Placement {
        let work_areas = self.work_areas(windows, monitors);
        let visible: Vec<&WindowRef> = self
            .visible_windows(windows)
            .into_iter()
            .filter(|w| w.id != window.id)
            .collect();

        let ctx = PlacementContext {
            monitors,
            work_areas: &work_areas,
            windows,
            focus_window: focus.and_then(|id| windows.window(id)),
        };

        place_window(window, &visible, &ctx, policy)
    }
}

/// Manages multiple workspaces (virtual desktops)
#[derive(Debug)]
pub struct WorkspaceManager {
    pub workspaces: Vec<Workspace>,
    /// Index of the current workspace
    current: usize,
}

impl WorkspaceManager {
    /// Create `count` workspaces (at least one)
    pub fn new(count: usize, min_sane_size: u32) -> Self {
        Self {
            workspaces: (0..count.max(1))
                .map(|i| Workspace::with_min_sane_size(i, min_sane_size))
                .collect(),
            current: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.workspaces.len()
    }

    pub fn get(&self, index: usize) -> Option<&Workspace> {
        self.workspaces.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Workspace> {
        self.workspaces.get_mut(index)
    }

    /// Get a reference to the current workspace
    pub fn current(&self) -> &Workspace {
        &self.workspaces[self.current]
    }

    /// Get a mutable reference to the current workspace
    pub fn current_mut(&mut self) -> &mut Workspace {
        &mut self.workspaces[self.current]
    }

    /// Get the index of the current workspace (0-based)
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Switch to a specific workspace (0-indexed)
    /// Returns the old workspace index if switch was successful
    pub fn switch_to(&mut self, target: usize) -> Option<usize> {
        if target >= self.workspaces.len() || target == self.current {
            return None;
        }
        let old = self.current;
        self.current = target;
        Some(old)
    }

    /// Add a window to every workspace it is a member of
    pub fn window_added(&mut self, window: &WindowRef) -> Vec<Invalidation> {
        self.workspaces
            .iter_mut()
            .filter(|ws| window.workspaces.contains(ws.index))
            .filter_map(|ws| {
                ws.tracked(InvalidationReason::StrutWindowJoined, |ws| ws.add_window(window))
            })
            .collect()
    }

    /// Remove a window from every workspace holding it
    pub fn window_removed(&mut self, window: &WindowRef) -> Vec<Invalidation> {
        self.workspaces
            .iter_mut()
            .filter_map(|ws| {
                ws.tracked(InvalidationReason::StrutWindowLeft, |ws| {
                    ws.remove_window(window);
                })
            })
            .collect()
    }

    /// Re-sync a window whose membership changed
    pub fn membership_changed(&mut self, window: &WindowRef) -> Vec<Invalidation> {
        self.workspaces
            .iter_mut()
            .filter_map(|ws| {
                if window.workspaces.contains(ws.index) {
                    ws.tracked(InvalidationReason::StrutWindowJoined, |ws| ws.add_window(window))
                } else {
                    ws.tracked(InvalidationReason::StrutWindowLeft, |ws| {
                        ws.remove_window(window);
                    })
                }
            })
            .collect()
    }

    /// A window's strut declaration changed
    pub fn struts_changed(&mut self, id: WindowId) -> Vec<Invalidation> {
        self.workspaces
            .iter_mut()
            .filter_map(|ws| ws.tracked(InvalidationReason::StrutsChanged, |ws| ws.struts_changed(id)))
            .collect()
    }

    /// Drop every cache after a monitor hotplug
    pub fn monitors_changed(&mut self) -> Vec<Invalidation> {
        self.workspaces
            .iter_mut()
            .filter_map(|ws| ws.tracked(InvalidationReason::MonitorsChanged, Workspace::invalidate))
            .collect()
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_WORKSPACES, MIN_SANE_AREA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{Membership, WindowKind, Windows};

    fn single_monitor() -> MonitorLayout {
        MonitorLayout::from_geometries(&[("DP-1", Rect::new(0, 0, 1000, 800), true)])
    }

    fn dock(rect: Rect, side: Side) -> WindowRef {
        let mut w = WindowRef::new(WindowKind::Dock, rect);
        let mut struts = StrutSpec::default();
        struts.set(side, Some(rect));
        w.struts = Some(struts);
        w.workspaces = Membership::All;
        w
    }

    #[test]
    fn test_empty_workspace_work_area_is_monitor() {
        let windows = Windows::new();
        let monitors = single_monitor();
        let mut ws = Workspace::new(0);

        assert!(!ws.is_valid());
        assert_eq!(ws.work_area(0, &windows, &monitors), Rect::new(0, 0, 1000, 800));
        assert!(ws.is_valid());
    }

    #[test]
    fn test_dock_joining_invalidates() {
        let mut windows = Windows::new();
        let monitors = single_monitor();
        let mut ws = Workspace::new(0);

        ws.work_area(0, &windows, &monitors);
        assert!(ws.is_valid());

        let id = windows.insert(dock(Rect::new(0, 0, 1000, 30), Side::Top));
        ws.add_window(windows.get(id).unwrap());
        assert!(!ws.is_valid());
        assert_eq!(ws.work_area(0, &windows, &monitors), Rect::new(0, 30, 1000, 770));

        let removed = windows.remove(id).unwrap();
        assert!(ws.remove_window(&removed));
        assert!(!ws.is_valid());
        assert_eq!(ws.work_area(0, &windows, &monitors), Rect::new(0, 0, 1000, 800));
    }

    #[test]
    fn test_plain_window_keeps_cache() {
        let mut windows = Windows::new();
        let monitors = single_monitor();
        let mut ws = Workspace::new(0);
        ws.work_area(0, &windows, &monitors);

        let id = windows.insert(WindowRef::new(WindowKind::Normal, Rect::new(10, 10, 100, 100)));
        ws.add_window(windows.get(id).unwrap());
        assert!(ws.is_valid());
    }

    #[test]
    fn test_strut_change_invalidates() {
        let mut windows = Windows::new();
        let monitors = single_monitor();
        let mut ws = Workspace::new(0);

        let id = windows.insert(dock(Rect::new(0, 0, 1000, 30), Side::Top));
        ws.add_window(windows.get(id).unwrap());
        assert_eq!(ws.work_area(0, &windows, &monitors).y, 30);

        windows.get_mut(id).unwrap().struts = Some(StrutSpec {
            top: Some(Rect::new(0, 0, 1000, 50)),
            ..Default::default()
        });
        ws.struts_changed(id);
        assert!(!ws.is_valid());
        assert_eq!(ws.work_area(0, &windows, &monitors), Rect::new(0, 50, 1000, 750));
    }

    #[test]
    fn test_monitor_change_forces_recompute() {
        let windows = Windows::new();
        let mut ws = Workspace::new(0);

        assert_eq!(ws.work_area(0, &windows, &single_monitor()).width, 1000);

        let wider = MonitorLayout::from_geometries(&[("DP-1", Rect::new(0, 0, 1920, 1080), true)]);
        assert_eq!(ws.work_area(0, &windows, &wider), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_unknown_monitor_falls_back_to_screen_area() {
        let windows = Windows::new();
        let mut ws = Workspace::new(0);
        assert_eq!(ws.work_area(9, &windows, &single_monitor()), Rect::new(0, 0, 1000, 800));
    }

    #[test]
    fn test_screen_area_only_uses_first_monitor_struts() {
        let mut windows = Windows::new();
        let monitors = MonitorLayout::from_geometries(&[
            ("DP-1", Rect::new(0, 0, 1000, 800), true),
            ("HDMI-1", Rect::new(1000, 0, 1000, 800), false),
        ]);
        let mut ws = Workspace::new(0);

        let top = windows.insert(dock(Rect::new(0, 0, 1000, 30), Side::Top));
        let bottom = windows.insert(dock(Rect::new(1000, 760, 1000, 40), Side::Bottom));
        ws.add_window(windows.get(top).unwrap());
        ws.add_window(windows.get(bottom).unwrap());

        assert_eq!(ws.work_area(0, &windows, &monitors), Rect::new(0, 30, 1000, 770));
        assert_eq!(ws.work_area(1, &windows, &monitors), Rect::new(1000, 0, 1000, 760));
        assert_eq!(ws.screen_work_area(&windows, &monitors), Rect::new(0, 30, 2000, 770));

        assert_eq!(ws.struts(Side::Top, &windows, &monitors), vec![Rect::new(0, 0, 1000, 30)]);
        assert!(ws.struts(Side::Bottom, &windows, &monitors).is_empty());
    }

    #[test]
    fn test_manager_routes_membership() {
        let mut windows = Windows::new();
        let monitors = single_monitor();
        let mut manager = WorkspaceManager::default();

        for ws in &mut manager.workspaces {
            ws.work_area(0, &windows, &monitors);
        }

        let id = windows.insert(dock(Rect::new(0, 0, 1000, 30), Side::Top));
        manager.window_added(windows.get(id).unwrap());

        for ws in &mut manager.workspaces {
            assert!(ws.contains(id));
            assert!(!ws.is_valid());
            assert_eq!(ws.work_area(0, &windows, &monitors).y, 30);
        }

        windows.get_mut(id).unwrap().workspaces = Membership::single(2);
        manager.membership_changed(windows.get(id).unwrap());
        assert!(manager.get(2).unwrap().contains(id));
        assert!(!manager.get(0).unwrap().contains(id));
        assert_eq!(manager.get_mut(0).unwrap().work_area(0, &windows, &monitors).y, 0);
    }

    #[test]
    fn test_manager_reports_invalidations() {
        let mut windows = Windows::new();
        let monitors = single_monitor();
        let mut manager = WorkspaceManager::new(2, MIN_SANE_AREA);
        manager.get_mut(0).unwrap().work_area(0, &windows, &monitors);

        // Only the workspace holding a valid cache reports a drop
        let id = windows.insert(dock(Rect::new(0, 0, 1000, 30), Side::Top));
        let dropped = manager.window_added(windows.get(id).unwrap());
        assert_eq!(
            dropped,
            vec![Invalidation {
                workspace: 0,
                reason: InvalidationReason::StrutWindowJoined,
            }]
        );

        for ws in &mut manager.workspaces {
            ws.work_area(0, &windows, &monitors);
        }
        let dropped = manager.struts_changed(id);
        assert_eq!(dropped.len(), 2);
        assert!(dropped.iter().all(|i| i.reason == InvalidationReason::StrutsChanged));

        // Nothing cached, nothing to report
        assert!(manager.struts_changed(id).is_empty());

        manager.get_mut(1).unwrap().work_area(0, &windows, &monitors);
        windows.get_mut(id).unwrap().workspaces = Membership::single(0);
        let dropped = manager.membership_changed(windows.get(id).unwrap());
        assert_eq!(
            dropped,
            vec![Invalidation {
                workspace: 1,
                reason: InvalidationReason::StrutWindowLeft,
            }]
        );

        let plain = windows.insert(WindowRef::new(WindowKind::Normal, Rect::new(0, 0, 10, 10)));
        manager.get_mut(0).unwrap().work_area(0, &windows, &monitors);
        assert!(manager.window_added(windows.get(plain).unwrap()).is_empty());
        assert!(manager.window_removed(windows.get(plain).unwrap()).is_empty());

        let dropped = manager.monitors_changed();
        assert_eq!(
            dropped,
            vec![Invalidation {
                workspace: 0,
                reason: InvalidationReason::MonitorsChanged,
            }]
        );
        assert!(!manager.get(0).unwrap().is_valid());
    }

    #[test]
    fn test_switch_to() {
        let mut manager = WorkspaceManager::new(3, MIN_SANE_AREA);
        assert_eq!(manager.current_index(), 0);
        assert_eq!(manager.switch_to(2), Some(0));
        assert_eq!(manager.current().index, 2);
        assert_eq!(manager.switch_to(2), None);
        assert_eq!(manager.switch_to(3), None);
        assert_eq!(WorkspaceManager::new(0, MIN_SANE_AREA).count(), 1);
    }
}
