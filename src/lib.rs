//! ttwm-place - window placement and work-area engine
//!
//! Decides where new windows go, how much of each monitor remains usable
//! once panels and docks reserve their struts, and which edges a window
//! can snap to while being moved. Everything operates on caller-supplied
//! snapshots; there is no X connection in here.

pub mod config;
pub mod edges;
pub mod monitor;
pub mod place;
pub mod scenario;
pub mod state;
pub mod tracing;
pub mod types;
pub mod window;
pub mod workarea;
pub mod workspaces;

pub use edges::{Direction, EdgeIndex};
pub use monitor::{Monitor, MonitorLayout};
pub use place::{place_window, Placement, PlacementContext, PlacementPolicy, PlacementRule};
pub use types::{Axis, Rect, Side, StrutPartial, StrutSpec};
pub use window::{FrameInsets, Membership, WindowId, WindowKind, WindowLookup, WindowRef, Windows};
pub use workarea::compute_work_area;
pub use workspaces::{Invalidation, InvalidationReason, Workspace, WorkspaceManager};
