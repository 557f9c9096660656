//! JSON scenario snapshots.
//!
//! A scenario describes monitors and named windows the way a window
//! manager would see them at one instant. Loading one yields a `Session`
//! that owns the window arena, monitor layout and workspaces, and answers
//! placement, work-area and edge queries against them.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::edges::EdgeIndex;
use crate::monitor::{Monitor, MonitorLayout};
use crate::place::{Placement, PlacementPolicy};
use crate::state::{validate, StateViolation};
use crate::tracing::{PlacementTracer, TraceEvent};
use crate::types::{Rect, Side, StrutPartial, StrutSpec};
use crate::window::{FrameInsets, Membership, WindowId, WindowKind, WindowRef, Windows};
use crate::workspaces::{Invalidation, WorkspaceManager};

/// Top-level scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub monitors: Vec<Monitor>,
    /// Name of the monitor new windows are centered on (default: primary)
    #[serde(default)]
    pub current_monitor: Option<String>,
    /// Number of workspaces (default: from config)
    #[serde(default)]
    pub workspaces: Option<usize>,
    #[serde(default)]
    pub current_workspace: usize,
    /// Name of the focused window
    #[serde(default)]
    pub focused: Option<String>,
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
}

/// One named window in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSpec {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: WindowKind,
    /// Frame-inclusive geometry
    pub rect: Rect,
    #[serde(default)]
    pub client_offset: FrameInsets,
    #[serde(default)]
    pub workspaces: Membership,
    /// Name of the window this one is transient for
    #[serde(default)]
    pub transient_for: Option<String>,
    #[serde(default)]
    pub struts: Option<StrutSpec>,
    /// Raw `_NET_WM_STRUT_PARTIAL` (12) or `_NET_WM_STRUT` (4) cardinals
    #[serde(default)]
    pub strut_partial: Option<Vec<u32>>,
    #[serde(default = "default_true")]
    pub decorated: bool,
    #[serde(default = "default_true")]
    pub maximizable: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub program_position: bool,
    #[serde(default)]
    pub denied_focus: bool,
    /// Client group leader, shared by windows of one application
    #[serde(default)]
    pub app_group: Option<u64>,
}

fn default_kind() -> WindowKind {
    WindowKind::Normal
}

fn default_true() -> bool {
    true
}

impl Scenario {
    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("Failed to load scenario {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid scenario JSON")
    }

    /// Build a session, resolving names into window ids
    pub fn into_session(self, config: &Config) -> Result<Session> {
        let mut monitors = MonitorLayout::new(self.monitors);
        if let Some(name) = &self.current_monitor {
            let Some(index) = monitors.find_by_name(name) else {
                bail!("Unknown current monitor: {}", name);
            };
            monitors.set_current(index);
        }

        let screen = monitors.screen_rect();
        let mut windows = Windows::new();
        let mut names: HashMap<String, WindowId> = HashMap::new();
        let mut parents: Vec<(WindowId, String)> = Vec::new();

        for spec in self.windows {
            if names.contains_key(&spec.name) {
                bail!("Duplicate window name: {}", spec.name);
            }

            let struts = match &spec.strut_partial {
                Some(values) => {
                    let Some(partial) = StrutPartial::from_cardinals(values) else {
                        bail!(
                            "Window {} has {} strut cardinals, expected 4 or 12",
                            spec.name,
                            values.len()
                        );
                    };
                    Some(partial.to_strut_spec(screen))
                }
                None => spec.struts,
            };

            let mut window = WindowRef::new(spec.kind, spec.rect);
            window.client_offset = spec.client_offset;
            window.workspaces = spec.workspaces;
            window.struts = struts;
            window.decorated = spec.decorated;
            window.has_maximize_capability = spec.maximizable;
            window.is_fullscreen = spec.fullscreen;
            window.honor_program_position = spec.program_position;
            window.denied_focus_not_transient = spec.denied_focus;
            window.app_group = spec.app_group;

            let id = windows.insert(window);
            if let Some(parent) = spec.transient_for {
                parents.push((id, parent));
            }
            names.insert(spec.name, id);
        }

        for (id, parent) in parents {
            let Some(&parent_id) = names.get(&parent) else {
                bail!("Unknown transient parent: {}", parent);
            };
            if let Some(window) = windows.get_mut(id) {
                window.transient_parent = Some(parent_id);
            }
        }

        let focus = match &self.focused {
            Some(name) => match names.get(name) {
                Some(&id) => Some(id),
                None => bail!("Unknown focused window: {}", name),
            },
            None => None,
        };

        let count = self.workspaces.unwrap_or_else(|| config.workspace_count());
        let mut workspaces = WorkspaceManager::new(count, config.min_sane_size());
        if self.current_workspace >= workspaces.count() {
            bail!(
                "Current workspace {} out of range (have {})",
                self.current_workspace,
                workspaces.count()
            );
        }
        workspaces.switch_to(self.current_workspace);
        for window in windows.iter() {
            workspaces.window_added(window);
        }

        log::info!(
            "Loaded scenario: {} monitor(s), {} window(s), {} workspace(s)",
            monitors.count(),
            windows.len(),
            workspaces.count()
        );

        Ok(Session {
            windows,
            monitors,
            workspaces,
            policy: config.policy(),
            focus,
            names,
            tracer: PlacementTracer::new(),
        })
    }
}

/// Work areas of one workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkAreaReport {
    pub workspace: usize,
    pub monitors: Vec<MonitorWorkArea>,
    pub screen_work_area: Rect,
    /// Strut rectangles touching the first monitor, per side
    pub struts: HashMap<Side, Vec<Rect>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorWorkArea {
    pub name: String,
    pub geometry: Rect,
    pub work_area: Rect,
}

/// Snap candidates for one window on one axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeReport {
    pub window: String,
    pub edges: Vec<i32>,
    /// Resulting near-corner coordinate, if a query was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// Live state built from a scenario
pub struct Session {
    pub windows: Windows,
    pub monitors: MonitorLayout,
    pub workspaces: WorkspaceManager,
    pub policy: PlacementPolicy,
    pub focus: Option<WindowId>,
    names: HashMap<String, WindowId>,
    pub tracer: PlacementTracer,
}

impl Session {
    pub fn window_id(&self, name: &str) -> Option<WindowId> {
        self.names.get(name).copied()
    }

    fn lookup(&self, name: &str) -> Result<(WindowId, &WindowRef)> {
        self.window_id(name)
            .and_then(|id| self.windows.get(id).map(|w| (id, w)))
            .with_context(|| format!("Unknown window: {}", name))
    }

    /// Workspace a window is considered on: the current one if it is a
    /// member there, else its lowest member workspace.
    fn workspace_of(&self, window: &WindowRef) -> usize {
        let current = self.workspaces.current_index();
        if window.workspaces.contains(current) {
            return current;
        }
        (0..self.workspaces.count())
            .find(|&i| window.workspaces.contains(i))
            .unwrap_or(current)
    }

    fn trace_invalidations(&mut self, dropped: Vec<Invalidation>) {
        for invalidation in &dropped {
            self.tracer.trace_invalidation(invalidation);
        }
    }

    /// Add a named window and route it to its workspaces
    pub fn add_window(&mut self, name: &str, window: WindowRef) -> Result<WindowId> {
        if self.names.contains_key(name) {
            bail!("Duplicate window name: {}", name);
        }
        let id = self.windows.insert(window);
        self.names.insert(name.to_string(), id);

        let window = self
            .windows
            .get(id)
            .with_context(|| format!("Window {} vanished after insertion", name))?;
        let dropped = self.workspaces.window_added(window);
        self.trace_invalidations(dropped);
        Ok(id)
    }

    /// Remove a named window from the arena and every workspace
    pub fn remove_window(&mut self, name: &str) -> Result<WindowRef> {
        let (id, _) = self.lookup(name)?;
        let window = self
            .windows
            .remove(id)
            .with_context(|| format!("Unknown window: {}", name))?;
        self.names.remove(name);
        if self.focus == Some(id) {
            self.focus = None;
        }

        let dropped = self.workspaces.window_removed(&window);
        self.trace_invalidations(dropped);
        Ok(window)
    }

    /// Replace a window's strut declaration
    pub fn set_struts(&mut self, name: &str, struts: Option<StrutSpec>) -> Result<()> {
        let (id, _) = self.lookup(name)?;
        if let Some(window) = self.windows.get_mut(id) {
            window.struts = struts;
        }
        let dropped = self.workspaces.struts_changed(id);
        self.trace_invalidations(dropped);
        Ok(())
    }

    /// Move a window to a different set of workspaces
    pub fn set_workspaces(&mut self, name: &str, workspaces: Membership) -> Result<()> {
        let (id, _) = self.lookup(name)?;
        let window = self
            .windows
            .get_mut(id)
            .with_context(|| format!("Unknown window: {}", name))?;
        window.workspaces = workspaces;

        let dropped = self.workspaces.membership_changed(window);
        self.trace_invalidations(dropped);
        Ok(())
    }

    /// Swap in a new monitor configuration, keeping the current monitor
    /// by name when it still exists
    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        let current = self.monitors.current().name.clone();
        self.monitors = MonitorLayout::new(monitors);
        if let Some(index) = self.monitors.find_by_name(&current) {
            self.monitors.set_current(index);
        }

        let dropped = self.workspaces.monitors_changed();
        self.trace_invalidations(dropped);
    }

    fn trace_recompute(&mut self, workspace: usize) {
        let Some(ws) = self.workspaces.get_mut(workspace) else {
            return;
        };
        if ws.cached().is_some_and(|c| c.is_for(&self.monitors)) {
            return;
        }
        let cache = ws.ensure_valid(&self.windows, &self.monitors);
        self.tracer.trace(&TraceEvent::WorkAreaComputed {
            workspace,
            monitor_areas: cache.monitor_areas().to_vec(),
            screen_area: cache.screen_area(),
        });
    }

    /// Initial placement of a named window
    pub fn place(&mut self, name: &str) -> Result<Placement> {
        let (id, window) = self.lookup(name)?;
        let window = window.clone();
        let workspace = self.workspace_of(&window);
        self.trace_recompute(workspace);

        let ws = self
            .workspaces
            .get_mut(workspace)
            .with_context(|| format!("No workspace {}", workspace))?;
        let placement = ws.place(&window, &self.windows, &self.monitors, self.focus, &self.policy);

        self.tracer.trace_placement(id, &placement);
        Ok(placement)
    }

    /// Work areas of a workspace (default: the current one)
    pub fn work_area(&mut self, workspace: Option<usize>) -> Result<WorkAreaReport> {
        let index = workspace.unwrap_or_else(|| self.workspaces.current_index());
        if index >= self.workspaces.count() {
            bail!("No workspace {} (have {})", index, self.workspaces.count());
        }
        self.trace_recompute(index);

        let ws = self
            .workspaces
            .get_mut(index)
            .with_context(|| format!("No workspace {}", index))?;
        let cache = ws.ensure_valid(&self.windows, &self.monitors);

        let monitors = self
            .monitors
            .iter()
            .enumerate()
            .map(|(i, m)| MonitorWorkArea {
                name: m.name.clone(),
                geometry: m.geometry,
                work_area: cache.monitor_area(i).unwrap_or(m.geometry),
            })
            .collect();
        let struts = Side::ALL
            .iter()
            .map(|&side| (side, cache.struts(side).to_vec()))
            .collect();

        Ok(WorkAreaReport {
            workspace: index,
            monitors,
            screen_work_area: cache.screen_area(),
            struts,
        })
    }

    /// Snap-edge index for a named window, against the work area of the
    /// monitor it mostly lies on.
    pub fn edge_index(&mut self, name: &str) -> Result<EdgeIndex> {
        let (_, window) = self.lookup(name)?;
        let window = window.clone();
        let workspace = self.workspace_of(&window);
        let monitor = self.monitors.monitor_for_rect(&window.outer_rect);
        self.trace_recompute(workspace);

        let ws = self
            .workspaces
            .get_mut(workspace)
            .with_context(|| format!("No workspace {}", workspace))?;
        let work_area = ws.work_area(monitor, &self.windows, &self.monitors);
        let others = ws.visible_windows(&self.windows);

        Ok(EdgeIndex::build(&window, &others, work_area, &self.monitors))
    }

    /// Rectangle of a named window
    pub fn rect(&self, name: &str) -> Result<Rect> {
        self.lookup(name).map(|(_, w)| w.outer_rect)
    }

    pub fn validate(&self) -> Vec<StateViolation> {
        validate(&self.workspaces, &self.windows, &self.monitors)
    }
}
