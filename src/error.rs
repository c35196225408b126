//! Error taxonomy for harness operations.
//!
//! Expected validation messages are not errors: an assertion that finds the
//! message returns `Ok(())`. Everything here means the journey did not go as
//! scripted or the tooling itself broke.

use std::time::Duration;

use crate::assertion::OutcomeKind;
use crate::harness::ActionKind;
use crate::page::{Locator, PageError};
use crate::scenario::ScenarioKind;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Error types for harness operations
#[derive(Debug)]
pub enum HarnessError {
    /// A readiness or text predicate never became true within budget
    Timeout { predicate: String, timeout: Duration },

    /// An interaction on a ready element failed
    Action {
        locator: Locator,
        action: ActionKind,
        source: PageError,
    },

    /// Expected feedback text never appeared
    Assertion { expected: String, kind: OutcomeKind },

    /// Loading a URL failed
    Navigation { url: String, source: PageError },

    /// A scenario step failed
    Step {
        step: &'static str,
        source: Box<HarnessError>,
    },

    /// A scenario failed
    Scenario {
        scenario: ScenarioKind,
        source: Box<HarnessError>,
    },

    /// Page automation fault outside of an element interaction
    Page(PageError),

    /// The session was used after teardown
    SessionClosed,

    /// Invalid configuration
    Config(String),
}

impl HarnessError {
    /// Wrap an error with the name of the step that produced it
    pub fn in_step(step: &'static str, source: HarnessError) -> Self {
        HarnessError::Step {
            step,
            source: Box::new(source),
        }
    }

    /// Wrap an error with the scenario that produced it
    pub fn in_scenario(scenario: ScenarioKind, source: HarnessError) -> Self {
        HarnessError::Scenario {
            scenario,
            source: Box::new(source),
        }
    }

    /// Innermost harness error, skipping step and scenario context
    pub fn root(&self) -> &HarnessError {
        match self {
            HarnessError::Step { source, .. } | HarnessError::Scenario { source, .. } => {
                source.root()
            }
            other => other,
        }
    }

    /// Display text of this error and every source below it
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut current: Option<&(dyn std::error::Error + 'static)> =
            std::error::Error::source(self);
        while let Some(err) = current {
            chain.push(err.to_string());
            current = err.source();
        }
        chain
    }
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::Timeout { predicate, timeout } => {
                write!(f, "Timed out after {:?} waiting for {}", timeout, predicate)
            }
            HarnessError::Action {
                locator, action, ..
            } => write!(f, "Failed to {} {}", action, locator),
            HarnessError::Navigation { url, .. } => write!(f, "Failed to navigate to {}", url),
            HarnessError::Assertion { expected, kind } => {
                write!(f, "Expected {} message not found: '{}'", kind, expected)
            }
            HarnessError::Step { step, .. } => write!(f, "Step '{}' failed", step),
            HarnessError::Scenario { scenario, .. } => {
                write!(f, "Scenario '{}' failed", scenario)
            }
            HarnessError::Page(err) => write!(f, "Page error: {}", err),
            HarnessError::SessionClosed => write!(f, "Session is already closed"),
            HarnessError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Action { source, .. } | HarnessError::Navigation { source, .. } => {
                Some(source)
            }
            HarnessError::Step { source, .. } | HarnessError::Scenario { source, .. } => {
                Some(source.as_ref())
            }
            HarnessError::Page(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PageError> for HarnessError {
    fn from(err: PageError) -> Self {
        HarnessError::Page(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_walks_context() {
        let err = HarnessError::in_scenario(
            ScenarioKind::Login,
            HarnessError::in_step(
                "login",
                HarnessError::Timeout {
                    predicate: "title contains 'Accounts Overview'".to_string(),
                    timeout: Duration::from_secs(20),
                },
            ),
        );

        let chain = err.chain();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], "Scenario 'login' failed");
        assert_eq!(chain[1], "Step 'login' failed");
        assert!(chain[2].contains("Accounts Overview"));
        assert!(matches!(err.root(), HarnessError::Timeout { .. }));
    }

    #[test]
    fn test_assertion_display_names_text() {
        let err = HarnessError::Assertion {
            expected: "Invalid username".to_string(),
            kind: OutcomeKind::Error,
        };
        assert_eq!(
            err.to_string(),
            "Expected error message not found: 'Invalid username'"
        );
    }
}
