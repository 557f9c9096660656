//! Decision tracing for debugging placement.
//!
//! Keeps a ring buffer of recent placement and work-area decisions so a
//! caller can find out after the fact why a window landed where it did.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::place::Placement;
use crate::types::Rect;
use crate::window::WindowId;
use crate::workspaces::{Invalidation, InvalidationReason};

/// Maximum number of events to keep in the trace buffer
const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Decisions that can be traced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A window was given its initial position
    WindowPlaced {
        window: WindowId,
        placement: Placement,
    },
    /// A workspace recomputed its work areas
    WorkAreaComputed {
        workspace: usize,
        monitor_areas: Vec<Rect>,
        screen_area: Rect,
    },
    /// A workspace's cached work areas were dropped
    WorkAreaInvalidated {
        workspace: usize,
        reason: InvalidationReason,
    },
}

/// One entry in the trace buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub event_type: String,
    pub window: Option<WindowId>,
    pub details: String,
}

/// Decision tracer with ring buffer storage
pub struct PlacementTracer {
    entries: VecDeque<TraceEntry>,
    max_entries: usize,
    sequence: u64,
    start_time: Instant,
}

impl PlacementTracer {
    /// Create a new tracer with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create a new tracer with specified capacity
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries: max_entries.max(1),
            sequence: 0,
            start_time: Instant::now(),
        }
    }

    /// Milliseconds since tracer start
    fn timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    pub fn trace(&mut self, event: &TraceEvent) {
        let (event_type, window, details) = match event {
            TraceEvent::WindowPlaced { window, placement } => (
                "window_placed",
                Some(*window),
                format!(
                    "rule={:?} pos={},{} monitor={} auto_maximize={} avoided_focus={}",
                    placement.rule,
                    placement.x,
                    placement.y,
                    placement.monitor,
                    placement.auto_maximize,
                    placement.avoided_focus
                ),
            ),
            TraceEvent::WorkAreaComputed {
                workspace,
                monitor_areas,
                screen_area,
            } => (
                "work_area_computed",
                None,
                format!(
                    "workspace={} monitors={:?} screen={:?}",
                    workspace, monitor_areas, screen_area
                ),
            ),
            TraceEvent::WorkAreaInvalidated { workspace, reason } => (
                "work_area_invalidated",
                None,
                format!("workspace={} reason={}", workspace, reason.as_str()),
            ),
        };
        self.add_entry(event_type.to_string(), window, details);
    }

    /// Trace a placement result
    pub fn trace_placement(&mut self, window: WindowId, placement: &Placement) {
        self.trace(&TraceEvent::WindowPlaced {
            window,
            placement: *placement,
        });
    }

    /// Trace a dropped work-area cache
    pub fn trace_invalidation(&mut self, invalidation: &Invalidation) {
        self.trace(&TraceEvent::WorkAreaInvalidated {
            workspace: invalidation.workspace,
            reason: invalidation.reason,
        });
    }

    fn add_entry(&mut self, event_type: String, window: Option<WindowId>, details: String) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }

        self.sequence += 1;
        self.entries.push_back(TraceEntry {
            sequence: self.sequence,
            timestamp_ms: self.timestamp(),
            event_type,
            window,
            details,
        });
    }

    /// Get the last N entries
    pub fn get_last(&self, n: usize) -> Vec<TraceEntry> {
        let start = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(start).cloned().collect()
    }

    /// Get all entries
    pub fn get_all(&self) -> Vec<TraceEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Clear the trace buffer
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sequence = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PlacementTracer {
    fn default() -> Self {
        Self::new()
    }
}
