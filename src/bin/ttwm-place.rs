//! ttwm-place - inspect placement decisions for a scenario snapshot
//!
//! Loads a JSON scenario (monitors plus named windows) and answers the
//! questions a window manager would ask the placement engine.
//!
//! # Examples
//!
//! ```bash
//! # Where would the window named "terminal" go?
//! ttwm-place scenario.json place terminal
//!
//! # Work areas of workspace 2
//! ttwm-place scenario.json work-area --workspace 2
//!
//! # Next snap edge to the right of "terminal"
//! ttwm-place scenario.json edges terminal --axis x --direction increasing
//!
//! # Check invariants
//! ttwm-place scenario.json validate
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use ttwm_place::config::Config;
use ttwm_place::scenario::{EdgeReport, Scenario, WorkAreaReport};
use ttwm_place::state::StateViolation;
use ttwm_place::tracing::TraceEntry;
use ttwm_place::{Axis, Direction, Placement};

/// ttwm-place - window placement and work-area engine
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario file (JSON)
    scenario: PathBuf,

    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/ttwm-place/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output raw JSON without pretty-printing
    #[arg(long, global = true)]
    raw: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the initial position of a window
    Place {
        /// Window name in the scenario
        window: String,
    },

    /// Show per-monitor and screen-wide work areas
    WorkArea {
        /// Workspace index (0-based, default: current)
        #[arg(long)]
        workspace: Option<usize>,
    },

    /// List snap edges for a window, or find the next/nearest one
    Edges {
        /// Window name in the scenario
        window: String,
        #[arg(long, value_enum)]
        axis: AxisArg,
        #[arg(long, value_enum, conflicts_with = "nearest")]
        direction: Option<DirectionArg>,
        /// Reference coordinate for a nearest-edge query
        #[arg(long)]
        nearest: Option<i32>,
    },

    /// Validate state invariants
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum AxisArg {
    X,
    Y,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Increasing,
    Decreasing,
}

impl From<DirectionArg> for Direction {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Increasing => Direction::Increasing,
            DirectionArg::Decreasing => Direction::Decreasing,
        }
    }
}

/// Command output
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Response {
    Placement {
        data: Placement,
        trace: Vec<TraceEntry>,
    },
    WorkArea {
        data: WorkAreaReport,
    },
    Edges {
        data: EdgeReport,
    },
    Validation {
        valid: bool,
        violations: Vec<StateViolation>,
    },
    Error {
        code: String,
        message: String,
    },
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let cli = Cli::parse();

    let response = run(&cli).unwrap_or_else(|e| {
        log::error!("{:#}", e);
        Response::Error {
            code: "failed".to_string(),
            message: format!("{:#}", e),
        }
    });
    let failed = matches!(
        response,
        Response::Error { .. } | Response::Validation { valid: false, .. }
    );

    if let Err(e) = print(&response, cli.raw) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if failed {
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<Response> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path.clone()),
        None => Config::load(),
    };

    let mut session = Scenario::load(&cli.scenario)?.into_session(&config)?;

    let response = match &cli.command {
        Commands::Place { window } => {
            let placement = session.place(window)?;
            Response::Placement {
                data: placement,
                trace: session.tracer.get_all(),
            }
        }
        Commands::WorkArea { workspace } => Response::WorkArea {
            data: session.work_area(*workspace)?,
        },
        Commands::Edges {
            window,
            axis,
            direction,
            nearest,
        } => {
            let axis = Axis::from(*axis);
            let rect = session.rect(window)?;
            let index = session.edge_index(window)?;

            let position = match (direction, nearest) {
                (Some(direction), _) => Some(index.find_next_edge(rect, axis, (*direction).into())),
                (None, Some(reference)) => Some(index.find_nearest_edge(rect, axis, *reference)),
                (None, None) => None,
            };

            Response::Edges {
                data: EdgeReport {
                    window: window.clone(),
                    edges: index.edges(axis).iter().copied().collect(),
                    position,
                },
            }
        }
        Commands::Validate => {
            let violations = session.validate();
            Response::Validation {
                valid: violations.is_empty(),
                violations,
            }
        }
    };

    Ok(response)
}

fn print(response: &Response, raw: bool) -> serde_json::Result<()> {
    let json = if raw {
        serde_json::to_string(response)?
    } else {
        serde_json::to_string_pretty(response)?
    };
    println!("{}", json);
    Ok(())
}
