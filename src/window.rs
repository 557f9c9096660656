//! The engine's view of a managed window.
//!
//! Windows live in a slotmap arena owned by the caller. Parent/child
//! relationships are expressed as `WindowId`s resolved through
//! [`WindowLookup`], never as owning references.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::types::{Rect, StrutSpec};

new_key_type! {
    /// Unique identifier for a window in the arena
    pub struct WindowId;
}

/// EWMH window type, as far as placement cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Normal,
    Dialog,
    ModalDialog,
    Splashscreen,
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
}

impl WindowKind {
    /// Whether the placement algorithm runs at all for this type.
    /// The others keep whatever position the client asked for.
    pub fn is_placeable(self) -> bool {
        matches!(
            self,
            WindowKind::Normal | WindowKind::Dialog | WindowKind::ModalDialog | WindowKind::Splashscreen
        )
    }

    pub fn is_dialog(self) -> bool {
        matches!(self, WindowKind::Dialog | WindowKind::ModalDialog)
    }

    /// Types always centered on the current monitor
    pub fn is_centered(self) -> bool {
        matches!(
            self,
            WindowKind::Dialog | WindowKind::ModalDialog | WindowKind::Splashscreen
        )
    }

    /// Whether windows of this type block first-fit candidates
    pub fn is_obstacle(self) -> bool {
        matches!(
            self,
            WindowKind::Normal
                | WindowKind::Dialog
                | WindowKind::Utility
                | WindowKind::Toolbar
                | WindowKind::Menu
        )
    }
}

/// Frame decoration thickness around the client area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInsets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl FrameInsets {
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
}

/// Which workspaces a window appears on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// Sticky: present on every workspace
    All,
    Workspaces(BTreeSet<usize>),
}

impl Membership {
    pub fn single(index: usize) -> Self {
        Membership::Workspaces(BTreeSet::from([index]))
    }

    pub fn contains(&self, index: usize) -> bool {
        match self {
            Membership::All => true,
            Membership::Workspaces(set) => set.contains(&index),
        }
    }
}

impl Default for Membership {
    fn default() -> Self {
        Membership::single(0)
    }
}

/// Snapshot of a window's placement-relevant state
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRef {
    /// Arena key, assigned on insertion
    pub id: WindowId,
    /// Frame-inclusive bounds (also the requested position before placement)
    pub outer_rect: Rect,
    /// Decoration insets, zero for undecorated windows
    pub client_offset: FrameInsets,
    pub kind: WindowKind,
    pub workspaces: Membership,
    pub transient_parent: Option<WindowId>,
    pub decorated: bool,
    pub has_maximize_capability: bool,
    pub is_fullscreen: bool,
    pub struts: Option<StrutSpec>,
    /// The client asked for an explicit position (USPosition)
    pub honor_program_position: bool,
    /// Mapped without focus and not transient for the focused window
    pub denied_focus_not_transient: bool,
    /// Client group leader; windows sharing one belong to one application
    pub app_group: Option<u64>,
}

impl WindowRef {
    /// A decorated, maximizable window of the given type on workspace 0
    pub fn new(kind: WindowKind, outer_rect: Rect) -> Self {
        Self {
            id: WindowId::default(),
            outer_rect,
            client_offset: FrameInsets::default(),
            kind,
            workspaces: Membership::default(),
            transient_parent: None,
            decorated: true,
            has_maximize_capability: true,
            is_fullscreen: false,
            struts: None,
            honor_program_position: false,
            denied_focus_not_transient: false,
            app_group: None,
        }
    }

    pub fn has_struts(&self) -> bool {
        self.struts.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Window could sensibly be maximized after placement
    pub fn wants_maximize(&self) -> bool {
        self.decorated && self.has_maximize_capability && !self.is_fullscreen
    }

    pub fn width(&self) -> i32 {
        self.outer_rect.width as i32
    }

    pub fn height(&self) -> i32 {
        self.outer_rect.height as i32
    }

    /// Whether both windows belong to the same application. A window
    /// without a group leader is its own application.
    pub fn same_application(&self, other: &WindowRef) -> bool {
        match (self.app_group, other.app_group) {
            (Some(a), Some(b)) => a == b,
            _ => self.id == other.id,
        }
    }
}

/// Resolves window ids supplied by the caller
pub trait WindowLookup {
    fn window(&self, id: WindowId) -> Option<&WindowRef>;
}

/// Arena of all windows known to the caller
#[derive(Debug, Default)]
pub struct Windows {
    windows: SlotMap<WindowId, WindowRef>,
}

impl Windows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a window, stamping it with its new id
    pub fn insert(&mut self, window: WindowRef) -> WindowId {
        self.windows.insert_with_key(|id| WindowRef { id, ..window })
    }

    pub fn remove(&mut self, id: WindowId) -> Option<WindowRef> {
        self.windows.remove(id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowRef> {
        self.windows.get(id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRef> {
        self.windows.get_mut(id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowRef> {
        self.windows.values()
    }
}

impl WindowLookup for Windows {
    fn window(&self, id: WindowId) -> Option<&WindowRef> {
        self.windows.get(id)
    }
}
