//! Configuration file support for ttwm-place.
//!
//! Loads settings from ~/.config/ttwm-place/config.toml if it exists,
//! otherwise uses sensible defaults.

use serde::Deserialize;
use std::path::PathBuf;

use crate::place::{PlacementPolicy, CASCADE_FUZZ, CASCADE_INTERVAL};
use crate::workarea::MIN_SANE_AREA;
use crate::workspaces::DEFAULT_NUM_WORKSPACES;

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub placement: PlacementConfig,
    pub work_area: WorkAreaConfig,
    pub workspaces: WorkspacesConfig,
}

/// Placement policy settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Honour positions requested by normal windows
    pub honor_program_position: bool,
    /// Center new normal windows on the current monitor
    pub center_new_windows: bool,
    pub cascade_fuzz: i32,
    pub cascade_interval: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            honor_program_position: true,
            center_new_windows: false,
            cascade_fuzz: CASCADE_FUZZ,
            cascade_interval: CASCADE_INTERVAL,
        }
    }
}

/// Work-area settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WorkAreaConfig {
    /// Smallest width/height struts may shrink a work area to
    pub min_sane_size: u32,
}

impl Default for WorkAreaConfig {
    fn default() -> Self {
        Self {
            min_sane_size: MIN_SANE_AREA,
        }
    }
}

/// Workspace settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WorkspacesConfig {
    pub count: usize,
}

impl Default for WorkspacesConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_NUM_WORKSPACES,
        }
    }
}

impl Config {
    /// Load config from default path (~/.config/ttwm-place/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ttwm-place")
            .join("config.toml")
    }

    /// Load config from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Placement policy derived from the `[placement]` section
    pub fn policy(&self) -> PlacementPolicy {
        PlacementPolicy {
            honor_program_position: self.placement.honor_program_position,
            center_new_windows: self.placement.center_new_windows,
            cascade_fuzz: self.placement.cascade_fuzz,
            cascade_interval: self.placement.cascade_interval,
        }
    }

    pub fn min_sane_size(&self) -> u32 {
        self.work_area.min_sane_size
    }

    /// Number of workspaces, at least one
    pub fn workspace_count(&self) -> usize {
        self.workspaces.count.max(1)
    }
}
