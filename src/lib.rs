//! Bank UI Harness - browser-driven acceptance tests for a web banking application.
//!
//! This crate provides:
//! - A bounded wait engine polling page readiness predicates
//! - Element actions gated on readiness, with locator context on failure
//! - Numbered diagnostic screenshots written to directory or memory sinks
//! - Case-insensitive outcome assertions on rendered feedback text
//! - Login, registration, transfer and account-opening steps
//! - A sequential scenario runner that aborts on the first failure and
//!   always closes its session
//! - A WebDriver backend and an in-memory simulated bank
//!
//! # Example
//!
//! ```rust,no_run
//! use bank_ui_harness::capture::MemorySink;
//! use bank_ui_harness::page::SimulatedBank;
//! use bank_ui_harness::scenario::ScenarioRunner;
//!
//! let runner = ScenarioRunner::new("http://localhost/parabank/");
//! let report = runner.run(Box::new(SimulatedBank::new()), Box::new(MemorySink::new()));
//! println!("{}", report.summary());
//! ```

pub mod assertion;
pub mod capture;
pub mod config;
pub mod error;
pub mod harness;
pub mod page;
pub mod scenario;
pub mod session;
pub mod steps;
pub mod wait;

// Re-export error types
pub use error::{HarnessError, HarnessResult};

// Re-export the interaction context
pub use harness::{Action, ActionKind, Harness, RunEvent, RunState};

// Re-export page automation backends
pub use page::{
    Locator, PageAutomation, PageError, PageResult, Readiness, SimulatedBank, WebDriverConfig,
    WebDriverPage,
};

// Re-export capture
pub use capture::{ArtifactRecord, ArtifactSink, DiagnosticCapture, DirectorySink, MemorySink};

// Re-export scenario running
pub use scenario::{RunReport, ScenarioKind, ScenarioOutcome, ScenarioRunner, ScenarioStatus};

pub use assertion::OutcomeKind;
pub use session::Session;
pub use wait::{Predicate, WaitEngine, WaitSpec};
