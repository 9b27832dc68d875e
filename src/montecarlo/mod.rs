//! Monte Carlo Orchestrator (spec component H).

pub mod orchestrator;

pub use orchestrator::{Orchestrator, SimulationResult};
