#![forbid(unsafe_code)]

//! Test harness for autoview.
//!
//! - [`SimHost`]: deterministic in-memory host (panes, focus, documents,
//!   editor modes) that counts every toggle the control loop issues.
//! - [`Scenario`]: JSON script of host events, rule edits, and expectations,
//!   replayed against a [`ControlLoop`](autoview_runtime::ControlLoop).
//!
//! The `autoview-harness` binary replays scenario files from the command line.

pub mod scenario;
pub mod sim_host;

pub use scenario::{
    EXIT_EXPECTATION_FAILED, EXIT_INVALID_SCENARIO, Scenario, ScenarioError, ScenarioReport,
    ScenarioRunner, Step, StepOutcome,
};
pub use sim_host::{SPLIT_INITIAL_MODE, SimHost, SimPane, SimView};
