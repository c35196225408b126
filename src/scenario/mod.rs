//! Scenario definitions, fixtures and the sequential runner.

pub mod fixtures;
pub mod runner;
pub mod types;

pub use runner::ScenarioRunner;
pub use types::{RunReport, ScenarioKind, ScenarioOutcome, ScenarioStatus};
