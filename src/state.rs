//! Invariant checking for placement state.
//!
//! The validator inspects a snapshot of windows, monitors and workspaces
//! and reports everything that should never happen: work areas escaping
//! their monitor, struts eating a monitor whole, workspace membership out
//! of sync with the windows, stale caches and broken transient chains.

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorLayout;
use crate::window::{WindowId, WindowLookup, Windows};
use crate::workspaces::WorkspaceManager;

/// State violations that can be detected
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StateViolation {
    pub kind: ViolationKind,
    pub description: String,
}

/// Types of state violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Two monitors cover the same pixels
    OverlappingMonitors,
    /// A monitor's work area is not inside the monitor
    WorkAreaOutsideMonitor,
    /// A work area is smaller than the sanity minimum allows
    WorkAreaTooSmall,
    /// A valid cache disagrees with a fresh computation
    StaleWorkArea,
    /// Workspace member that no longer exists
    GhostMember,
    /// Window missing from a workspace it belongs to
    MissingMember,
    /// Window listed on a workspace it does not belong to
    StrayMember,
    /// Transient parent that does not resolve
    DanglingTransientParent,
    /// Transient chain that leads back to the window
    TransientLoop,
}

impl StateViolation {
    fn new(kind: ViolationKind, description: String) -> Self {
        Self { kind, description }
    }
}

/// Check every invariant, returning all violations found
pub fn validate(
    workspaces: &WorkspaceManager,
    windows: &Windows,
    monitors: &MonitorLayout,
) -> Vec<StateViolation> {
    let mut violations = Vec::new();

    check_monitors(monitors, &mut violations);
    check_work_areas(workspaces, windows, monitors, &mut violations);
    check_membership(workspaces, windows, &mut violations);
    check_transients(windows, &mut violations);

    if violations.is_empty() {
        log::debug!("State validation passed");
    } else {
        log::warn!("State validation found {} violation(s)", violations.len());
    }
    violations
}

fn check_monitors(monitors: &MonitorLayout, violations: &mut Vec<StateViolation>) {
    for (a, b) in monitors.overlapping_pairs() {
        let (ma, mb) = (monitors.get(a), monitors.get(b));
        violations.push(StateViolation::new(
            ViolationKind::OverlappingMonitors,
            format!(
                "Monitors {} and {} overlap",
                ma.map_or("?", |m| m.name.as_str()),
                mb.map_or("?", |m| m.name.as_str())
            ),
        ));
    }
}

fn check_work_areas(
    workspaces: &WorkspaceManager,
    windows: &Windows,
    monitors: &MonitorLayout,
    violations: &mut Vec<StateViolation>,
) {
    for ws in &workspaces.workspaces {
        let fresh = ws.compute_cache(windows, monitors);

        for (i, monitor) in monitors.iter().enumerate() {
            let Some(area) = fresh.monitor_area(i) else {
                continue;
            };
            let geometry = monitor.geometry;

            if !geometry.contains_rect(&area) {
                violations.push(StateViolation::new(
                    ViolationKind::WorkAreaOutsideMonitor,
                    format!(
                        "Workspace {} work area {:?} escapes monitor {} {:?}",
                        ws.index, area, monitor.name, geometry
                    ),
                ));
            }

            let min = ws.min_sane_size();
            if area.width < min.min(geometry.width) || area.height < min.min(geometry.height) {
                violations.push(StateViolation::new(
                    ViolationKind::WorkAreaTooSmall,
                    format!(
                        "Workspace {} work area {}x{} on monitor {} is below {}",
                        ws.index, area.width, area.height, monitor.name, min
                    ),
                ));
            }
        }

        if let Some(cached) = ws.cached() {
            if cached.is_for(monitors) && *cached != fresh {
                violations.push(StateViolation::new(
                    ViolationKind::StaleWorkArea,
                    format!(
                        "Workspace {} caches {:?} but members reserve {:?}",
                        ws.index,
                        cached.monitor_areas(),
                        fresh.monitor_areas()
                    ),
                ));
            }
        }
    }
}

fn check_membership(
    workspaces: &WorkspaceManager,
    windows: &Windows,
    violations: &mut Vec<StateViolation>,
) {
    for ws in &workspaces.workspaces {
        for &id in ws.members() {
            match windows.get(id) {
                None => violations.push(StateViolation::new(
                    ViolationKind::GhostMember,
                    format!("Workspace {} lists unknown window {:?}", ws.index, id),
                )),
                Some(w) if !w.workspaces.contains(ws.index) => {
                    violations.push(StateViolation::new(
                        ViolationKind::StrayMember,
                        format!("Window {:?} is listed on workspace {} but not a member", id, ws.index),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    for window in windows.iter() {
        for ws in &workspaces.workspaces {
            if window.workspaces.contains(ws.index) && !ws.contains(window.id) {
                violations.push(StateViolation::new(
                    ViolationKind::MissingMember,
                    format!("Window {:?} is missing from workspace {}", window.id, ws.index),
                ));
            }
        }
    }
}

fn check_transients(windows: &Windows, violations: &mut Vec<StateViolation>) {
    for window in windows.iter() {
        let Some(parent) = window.transient_parent else {
            continue;
        };

        if !windows.contains(parent) {
            violations.push(StateViolation::new(
                ViolationKind::DanglingTransientParent,
                format!("Window {:?} is transient for unknown {:?}", window.id, parent),
            ));
            continue;
        }

        if leads_back(windows, window.id, parent) {
            violations.push(StateViolation::new(
                ViolationKind::TransientLoop,
                format!("Transient chain of {:?} loops back to itself", window.id),
            ));
        }
    }
}

/// Follow transient parents from `start`, looking for `origin`
fn leads_back(windows: &Windows, origin: WindowId, start: WindowId) -> bool {
    let mut current = Some(start);
    for _ in 0..=windows.len() {
        match current {
            Some(id) if id == origin => return true,
            Some(id) => current = windows.window(id).and_then(|w| w.transient_parent),
            None => return false,
        }
    }
    false
}
