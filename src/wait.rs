//! Bounded waits over page state.
//!
//! Every interaction in the harness blocks here and nowhere else: a predicate
//! is probed at a fixed interval until it holds or its timeout elapses.
//! Only the predicate check is repeated, never a state-changing action.

use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::assertion;
use crate::error::{HarnessError, HarnessResult};
use crate::page::{ElementHandle, Locator, PageAutomation, PageResult, Readiness};

/// Floor for the poll interval so waits never busy-spin
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Readiness predicate over page state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    ElementPresent(Locator),
    ElementVisible(Locator),
    ElementClickable(Locator),
    TitleContains(String),
    /// Case-insensitive substring of the rendered page text
    TextContains(String),
}

impl Predicate {
    /// Element predicate for the given readiness level
    pub fn element(locator: Locator, readiness: Readiness) -> Self {
        match readiness {
            Readiness::Present => Predicate::ElementPresent(locator),
            Readiness::Visible => Predicate::ElementVisible(locator),
            Readiness::Clickable => Predicate::ElementClickable(locator),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::ElementPresent(l) => write!(f, "{} to be present", l),
            Predicate::ElementVisible(l) => write!(f, "{} to be visible", l),
            Predicate::ElementClickable(l) => write!(f, "{} to be clickable", l),
            Predicate::TitleContains(s) => write!(f, "title to contain '{}'", s),
            Predicate::TextContains(s) => write!(f, "page text to contain '{}'", s),
        }
    }
}

/// A predicate plus its time budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    pub predicate: Predicate,
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(predicate: Predicate, timeout: Duration) -> Self {
        Self { predicate, timeout }
    }
}

/// What a satisfied predicate resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Element(ElementHandle),
    /// Full title that contained the substring
    Title(String),
    /// Rendered line that contained the text
    Text(String),
}

/// Polls predicates against a page until satisfied or timed out
#[derive(Debug, Clone, Copy)]
pub struct WaitEngine {
    poll_interval: Duration,
}

impl Default for WaitEngine {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl WaitEngine {
    /// Create an engine; intervals below `MIN_POLL_INTERVAL` are raised to it
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Block until `spec` holds, returning its first resolution
    pub fn until(&self, page: &mut dyn PageAutomation, spec: &WaitSpec) -> HarnessResult<Resolved> {
        poll_until(spec.timeout, self.poll_interval, &spec.predicate, || {
            probe(page, &spec.predicate)
        })
    }

    /// Block until the element reaches `readiness`
    pub fn element(
        &self,
        page: &mut dyn PageAutomation,
        locator: &Locator,
        readiness: Readiness,
        timeout: Duration,
    ) -> HarnessResult<ElementHandle> {
        let predicate = Predicate::element(locator.clone(), readiness);
        poll_until(timeout, self.poll_interval, &predicate, || {
            page.locate(locator, readiness)
        })
    }
}

/// Probe a predicate once
fn probe(page: &mut dyn PageAutomation, predicate: &Predicate) -> PageResult<Option<Resolved>> {
    match predicate {
        Predicate::ElementPresent(l) => {
            Ok(page.locate(l, Readiness::Present)?.map(Resolved::Element))
        }
        Predicate::ElementVisible(l) => {
            Ok(page.locate(l, Readiness::Visible)?.map(Resolved::Element))
        }
        Predicate::ElementClickable(l) => {
            Ok(page.locate(l, Readiness::Clickable)?.map(Resolved::Element))
        }
        Predicate::TitleContains(fragment) => {
            let title = page.current_title()?;
            Ok(title.contains(fragment.as_str()).then_some(Resolved::Title(title)))
        }
        Predicate::TextContains(expected) => {
            let text = page.current_visible_text()?;
            Ok(assertion::find_match(&text, expected).map(Resolved::Text))
        }
    }
}

/// Run `check` until it yields a value or `timeout` elapses.
///
/// The check always runs at least once, and once more after the final sleep.
/// Backend faults end the wait immediately.
pub fn poll_until<T, F>(
    timeout: Duration,
    interval: Duration,
    predicate: &Predicate,
    mut check: F,
) -> HarnessResult<T>
where
    F: FnMut() -> PageResult<Option<T>>,
{
    let interval = interval.max(MIN_POLL_INTERVAL);
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if let Some(value) = check()? {
            debug!(%predicate, attempts, elapsed = ?start.elapsed(), "wait satisfied");
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!(%predicate, attempts, "wait timed out");
            return Err(HarnessError::Timeout {
                predicate: predicate.to_string(),
                timeout,
            });
        }

        thread::sleep(interval.min(timeout - elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageError, SimulatedBank};

    fn page_at_home(delay: u32) -> SimulatedBank {
        let mut bank = SimulatedBank::new().render_delay(delay);
        bank.navigate("index.htm").unwrap();
        bank
    }

    #[test]
    fn test_interval_is_floored() {
        let engine = WaitEngine::new(Duration::from_millis(1));
        assert_eq!(engine.poll_interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn test_element_resolves_after_render_delay() {
        let mut bank = page_at_home(3);
        let engine = WaitEngine::new(Duration::from_millis(10));
        let handle = engine
            .element(
                &mut bank,
                &Locator::name("username"),
                Readiness::Clickable,
                Duration::from_secs(2),
            )
            .unwrap();
        assert!(handle.id().starts_with("sim-"));
    }

    #[test]
    fn test_timeout_names_predicate() {
        let mut bank = page_at_home(0);
        let engine = WaitEngine::new(Duration::from_millis(10));
        let spec = WaitSpec::new(
            Predicate::TitleContains("Accounts Overview".to_string()),
            Duration::from_millis(60),
        );

        let started = Instant::now();
        let err = engine.until(&mut bank, &spec).unwrap_err();
        assert!(started.elapsed() >= Duration::from_millis(60));
        match err {
            HarnessError::Timeout { predicate, timeout } => {
                assert_eq!(predicate, "title to contain 'Accounts Overview'");
                assert_eq!(timeout, Duration::from_millis(60));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_text_contains_is_case_insensitive() {
        let mut bank = page_at_home(0);
        let engine = WaitEngine::new(Duration::from_millis(10));
        let spec = WaitSpec::new(
            Predicate::TextContains("CUSTOMER login".to_string()),
            Duration::from_millis(100),
        );
        assert_eq!(
            engine.until(&mut bank, &spec).unwrap(),
            Resolved::Text("Customer Login".to_string())
        );
    }

    #[test]
    fn test_poll_until_counts_attempts_without_spinning() {
        let mut calls = 0;
        let predicate = Predicate::TextContains("never".to_string());
        let result: HarnessResult<()> = poll_until(
            Duration::from_millis(50),
            Duration::from_millis(20),
            &predicate,
            || {
                calls += 1;
                Ok(None)
            },
        );
        assert!(result.is_err());
        // 0ms, 20ms, 40ms, 50ms
        assert!((2..=5).contains(&calls), "unexpected probe count {}", calls);
    }

    #[test]
    fn test_backend_fault_ends_wait() {
        let predicate = Predicate::TitleContains("x".to_string());
        let result: HarnessResult<()> = poll_until(
            Duration::from_secs(5),
            Duration::from_millis(10),
            &predicate,
            || Err(PageError::Closed),
        );
        assert!(matches!(result, Err(HarnessError::Page(PageError::Closed))));
    }
}
