//! Sequential scenario execution with abort-on-first-failure.

use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use super::fixtures;
use super::types::{RunReport, ScenarioKind, ScenarioOutcome, ScenarioStatus};
use crate::assertion::OutcomeKind;
use crate::capture::{ArtifactSink, DiagnosticCapture};
use crate::config::Config;
use crate::error::{HarnessError, HarnessResult};
use crate::harness::{Harness, RunEvent, RunState};
use crate::page::PageAutomation;
use crate::session::Session;
use crate::wait::WaitEngine;

/// Runs the four journeys against one session.
///
/// Scenarios share the session and are run in a fixed order. The first
/// failure aborts the run: a `final_error_state` screenshot is taken, the
/// remaining scenarios are reported as skipped, and the session is closed.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl ScenarioRunner {
    /// Runner for `base_url` with the remaining settings from the global config
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut runner = Self::from_config(crate::config::get());
        runner.base_url = base_url.into();
        runner
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.target.base_url.clone(),
            username: config.target.username.clone(),
            password: config.target.password.clone(),
            timeout: config.timing.timeout(),
            poll_interval: config.timing.poll(),
        }
    }

    /// Credentials for the valid-login steps
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Default timeout for every wait and assertion
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run every scenario against `page`, writing screenshots to `sink`.
    ///
    /// Takes ownership of the backend; it is closed exactly once before this
    /// returns.
    pub fn run(&self, page: Box<dyn PageAutomation>, sink: Box<dyn ArtifactSink>) -> RunReport {
        let session = match Session::open(page, &self.base_url, self.timeout) {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to open session: {}", e);
                return RunReport {
                    success: false,
                    error: Some(e.to_string()),
                    error_chain: e.chain(),
                    final_state: RunState::Aborted,
                    scenarios: ScenarioKind::ALL
                        .into_iter()
                        .map(ScenarioOutcome::skipped)
                        .collect(),
                    artifacts: Vec::new(),
                };
            }
        };

        let mut harness = Harness::new(
            session,
            DiagnosticCapture::new(sink),
            WaitEngine::new(self.poll_interval),
        );
        harness.advance(RunEvent::SessionOpened);

        let mut outcomes = Vec::with_capacity(ScenarioKind::ALL.len());
        let mut failure: Option<HarnessError> = None;

        for scenario in ScenarioKind::ALL {
            if failure.is_some() {
                outcomes.push(ScenarioOutcome::skipped(scenario));
                continue;
            }

            info!("=== {} ===", scenario.heading());
            let started = Instant::now();
            let verified_before = harness.assertions_verified();

            let status = match self.run_scenario(&mut harness, scenario) {
                Ok(()) => ScenarioStatus::Passed,
                Err(e) => {
                    failure = Some(e);
                    ScenarioStatus::Failed
                }
            };

            outcomes.push(ScenarioOutcome {
                scenario,
                status,
                duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                assertions: harness.assertions_verified() - verified_before,
            });
        }

        match &failure {
            Some(e) => {
                harness.advance(RunEvent::Failed);
                error!("Test failed: {}", e);
                harness.capture("final_error_state");
            }
            None => {
                harness.advance(RunEvent::Completed);
                info!("All UI tests completed successfully!");
            }
        }

        if let Err(e) = harness.close() {
            warn!("Failed to close session: {}", e);
        }

        RunReport {
            success: failure.is_none(),
            error: failure.as_ref().map(|e| e.to_string()),
            error_chain: failure.as_ref().map(|e| e.chain()).unwrap_or_default(),
            final_state: harness.state(),
            scenarios: outcomes,
            artifacts: harness.artifacts().to_vec(),
        }
    }

    /// Run one scenario, capturing `<scenario>_test_failure` before
    /// returning its error
    fn run_scenario(&self, h: &mut Harness, scenario: ScenarioKind) -> HarnessResult<()> {
        let result = match scenario {
            ScenarioKind::Login => self.login_scenario(h),
            ScenarioKind::Registration => self.registration_scenario(h),
            ScenarioKind::TransferFunds => self.transfer_scenario(h),
            ScenarioKind::OpenAccount => self.open_account_scenario(h),
        };

        result.map_err(|cause| {
            h.capture(&format!("{}_test_failure", scenario));
            HarnessError::in_scenario(scenario, cause)
        })
    }

    fn login_scenario(&self, h: &mut Harness) -> HarnessResult<()> {
        h.navigate("")?;
        h.capture("login_page_loaded");

        h.login(&self.username, &self.password)?;
        h.capture("after_valid_login");
        h.logout()?;

        for attempt in &fixtures::REJECTED_LOGINS {
            h.attempt_login(attempt.username, attempt.password, attempt.expected)?;
        }
        Ok(())
    }

    fn registration_scenario(&self, h: &mut Harness) -> HarnessResult<()> {
        h.navigate("register.htm")?;
        h.capture("registration_page_loaded");

        h.register(&fixtures::valid_registration())?;
        h.assert_contains(fixtures::REGISTRATION_WELCOME, OutcomeKind::Success)?;
        h.advance(RunEvent::LoggedIn);
        h.capture("after_valid_registration");
        h.logout()?;

        for (form, expected) in fixtures::rejected_registrations() {
            h.register(&form)?;
            h.assert_contains(expected, OutcomeKind::Error)?;
        }
        Ok(())
    }

    fn transfer_scenario(&self, h: &mut Harness) -> HarnessResult<()> {
        h.login(&self.username, &self.password)?;
        h.advance(RunEvent::TransferStarted);

        h.transfer_funds(&fixtures::VALID_TRANSFER)?;
        h.assert_contains(fixtures::TRANSFER_COMPLETE, OutcomeKind::Success)?;
        h.capture("after_valid_transfer");

        for (transfer, expected) in &fixtures::REJECTED_TRANSFERS {
            h.transfer_funds(transfer)?;
            h.assert_contains(expected, OutcomeKind::Error)?;
        }

        h.logout()
    }

    fn open_account_scenario(&self, h: &mut Harness) -> HarnessResult<()> {
        h.login(&self.username, &self.password)?;
        h.advance(RunEvent::AccountsStarted);

        for (account_type, description) in fixtures::NEW_ACCOUNTS {
            h.open_account(Some(account_type), Some(fixtures::PRIMARY_ACCOUNT))?;
            h.assert_contains(fixtures::ACCOUNT_OPENED, OutcomeKind::Success)?;
            h.capture(description);
        }

        // Submitted with neither a type nor a funding account
        h.open_account(None, None)?;
        h.assert_contains(fixtures::ACCOUNT_TYPE_REQUIRED, OutcomeKind::Error)?;

        h.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MemorySink;
    use crate::page::{Locator, SimulatedBank};
    use std::sync::atomic::Ordering;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::from_config(&Config::defaults())
            .timeout(Duration::from_millis(300))
            .poll_interval(Duration::from_millis(10))
    }

    #[test]
    fn test_full_run_finishes() {
        let report = runner().run(
            Box::new(SimulatedBank::new().render_delay(1)),
            Box::new(MemorySink::new()),
        );

        assert!(report.success, "{:?}", report.error_chain);
        assert_eq!(report.final_state, RunState::Finished);
        assert_eq!(report.count(ScenarioStatus::Passed), 4);
        assert_eq!(
            report.outcome(ScenarioKind::Login).map(|o| o.assertions),
            Some(3)
        );
        assert_eq!(
            report.outcome(ScenarioKind::OpenAccount).map(|o| o.assertions),
            Some(3)
        );
    }

    #[test]
    fn test_wrong_credentials_abort_in_first_scenario() {
        let bank = SimulatedBank::new();
        let closes = bank.close_counter();
        let report = runner()
            .credentials("john", "not-the-password")
            .run(Box::new(bank), Box::new(MemorySink::new()));

        assert!(!report.success);
        assert_eq!(report.final_state, RunState::Aborted);
        assert_eq!(report.count(ScenarioStatus::Skipped), 3);
        assert_eq!(report.error_chain[0], "Scenario 'login' failed");
        assert_eq!(report.error_chain[1], "Step 'login' failed");
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let tail: Vec<&str> = report
            .artifacts
            .iter()
            .rev()
            .take(3)
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(tail, vec!["final_error_state", "login_test_failure", "login_failure"]);
    }

    #[test]
    fn test_late_failure_keeps_earlier_passes() {
        let report = runner().run(
            Box::new(SimulatedBank::new().hide(Locator::link("Open New Account"))),
            Box::new(MemorySink::new()),
        );

        assert_eq!(
            report.outcome(ScenarioKind::OpenAccount).map(|o| o.status),
            Some(ScenarioStatus::Failed)
        );
        assert_eq!(report.count(ScenarioStatus::Passed), 3);
    }
}
