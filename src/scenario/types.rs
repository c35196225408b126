//! Types for scenario run results.

use serde::{Deserialize, Serialize};

use crate::capture::ArtifactRecord;
use crate::harness::RunState;

/// The four journeys, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Login,
    Registration,
    TransferFunds,
    OpenAccount,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Login,
        ScenarioKind::Registration,
        ScenarioKind::TransferFunds,
        ScenarioKind::OpenAccount,
    ];

    /// Heading logged when the scenario starts
    pub fn heading(self) -> &'static str {
        match self {
            ScenarioKind::Login => "Testing Login Page Constraints",
            ScenarioKind::Registration => "Testing Registration Page Constraints",
            ScenarioKind::TransferFunds => "Testing Transfer Funds Constraints",
            ScenarioKind::OpenAccount => "Testing Open New Account Constraints",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioKind::Login => write!(f, "login"),
            ScenarioKind::Registration => write!(f, "registration"),
            ScenarioKind::TransferFunds => write!(f, "transfer"),
            ScenarioKind::OpenAccount => write!(f, "open_account"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    /// Not run because an earlier scenario aborted the run
    Skipped,
}

/// Result of a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: ScenarioKind,

    pub status: ScenarioStatus,

    /// Wall time spent in the scenario
    pub duration_ms: u64,

    /// Outcome assertions verified before it finished or failed
    pub assertions: usize,
}

impl ScenarioOutcome {
    pub fn skipped(scenario: ScenarioKind) -> Self {
        Self {
            scenario,
            status: ScenarioStatus::Skipped,
            duration_ms: 0,
            assertions: 0,
        }
    }
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Whether every scenario passed
    pub success: bool,

    /// Error message if the run aborted
    pub error: Option<String>,

    /// Error message followed by each underlying cause
    pub error_chain: Vec<String>,

    /// State the run ended in
    pub final_state: RunState,

    pub scenarios: Vec<ScenarioOutcome>,

    /// All screenshots taken, in sequence order
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunReport {
    /// Outcome for one scenario, if it was scheduled
    pub fn outcome(&self, scenario: ScenarioKind) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|o| o.scenario == scenario)
    }

    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|o| o.status == status).count()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        if self.success {
            format!(
                "All UI tests completed successfully! ({} scenarios, {} screenshots)",
                self.count(ScenarioStatus::Passed),
                self.artifacts.len()
            )
        } else {
            format!(
                "Run aborted: {} passed, {} failed, {} skipped",
                self.count(ScenarioStatus::Passed),
                self.count(ScenarioStatus::Failed),
                self.count(ScenarioStatus::Skipped)
            )
        }
    }
}
