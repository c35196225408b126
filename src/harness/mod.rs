//! Per-run interaction context.
//!
//! `Harness` bundles the session, the diagnostic capture and the wait engine,
//! and provides the primitives every step is written in: navigation, element
//! actions gated on readiness, waits, screenshots and step wrapping.

pub mod types;

pub use types::{Action, ActionKind, RunEvent, RunState};

use std::time::Duration;
use tracing::{debug, warn};

use crate::capture::{ArtifactRecord, CaptureFailure, DiagnosticCapture};
use crate::error::{HarnessError, HarnessResult};
use crate::page::{ElementHandle, Locator, PageResult};
use crate::session::Session;
use crate::wait::{Predicate, Resolved, WaitEngine, WaitSpec};

pub struct Harness {
    session: Session,
    diagnostics: DiagnosticCapture,
    waiter: WaitEngine,
    state: RunState,
    assertions: usize,
}

impl Harness {
    pub fn new(session: Session, diagnostics: DiagnosticCapture, waiter: WaitEngine) -> Self {
        Self {
            session,
            diagnostics,
            waiter,
            state: RunState::NotStarted,
            assertions: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn default_timeout(&self) -> Duration {
        self.session.default_timeout()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Apply `event` to the run state. Undefined transitions leave it unchanged.
    pub fn advance(&mut self, event: RunEvent) -> RunState {
        match self.state.on(event) {
            Some(next) => {
                debug!(from = ?self.state, to = ?next, ?event, "run state");
                self.state = next;
            }
            None => warn!(state = ?self.state, ?event, "ignoring undefined run transition"),
        }
        self.state
    }

    /// Load a page relative to the application root
    pub fn navigate(&mut self, path: &str) -> HarnessResult<()> {
        let url = self.session.url(path);
        debug!(url = %url, "navigate");
        self.session
            .page()?
            .navigate(&url)
            .map_err(|source| HarnessError::Navigation { url, source })
    }

    /// Reload the current page
    pub fn refresh(&mut self) -> HarnessResult<()> {
        let url = String::from("<current page>");
        self.session
            .page()?
            .refresh()
            .map_err(|source| HarnessError::Navigation { url, source })
    }

    /// Wait for `locator` to be ready for `action`, then perform it.
    ///
    /// Only the readiness wait is retried; the action itself runs once.
    pub fn perform(
        &mut self,
        locator: &Locator,
        action: Action<'_>,
    ) -> HarnessResult<ElementHandle> {
        let timeout = self.default_timeout();
        let waiter = self.waiter;
        let page = self.session.page()?;

        let element = waiter.element(page, locator, action.readiness(), timeout)?;
        let outcome = match action {
            Action::Type(text) => page.send_text(&element, text),
            Action::Clear => page.clear(&element),
            Action::Click => page.click(&element),
        };
        outcome.map_err(|source| HarnessError::Action {
            locator: locator.clone(),
            action: action.kind(),
            source,
        })?;

        debug!(%locator, action = %action.kind(), "performed");
        Ok(element)
    }

    /// Type into a field
    pub fn type_into(&mut self, locator: &Locator, text: &str) -> HarnessResult<()> {
        self.perform(locator, Action::Type(text)).map(|_| ())
    }

    /// Click a link or button
    pub fn click(&mut self, locator: &Locator) -> HarnessResult<()> {
        self.perform(locator, Action::Click).map(|_| ())
    }

    /// Block until `spec` holds
    pub fn wait(&mut self, spec: &WaitSpec) -> HarnessResult<Resolved> {
        let waiter = self.waiter;
        waiter.until(self.session.page()?, spec)
    }

    /// Block until the title contains `fragment`, with the default timeout
    pub fn wait_for_title(&mut self, fragment: &str) -> HarnessResult<()> {
        let spec = WaitSpec::new(
            Predicate::TitleContains(fragment.to_string()),
            self.default_timeout(),
        );
        self.wait(&spec).map(|_| ())
    }

    /// Best-effort screenshot. Never fails the caller.
    pub fn capture(&mut self, description: &str) -> Option<ArtifactRecord> {
        match self.session.page() {
            Ok(page) => self.diagnostics.capture(page, description).ok(),
            Err(_) => {
                self.diagnostics
                    .failed(description, CaptureFailure::SessionClosed);
                None
            }
        }
    }

    /// Run `body` as the named step.
    ///
    /// On failure a `<name>_failure` screenshot is taken and the error is
    /// wrapped with the step name.
    pub fn step<T>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> HarnessResult<T>,
    ) -> HarnessResult<T> {
        debug!(step = name, "step started");
        match body(self) {
            Ok(value) => Ok(value),
            Err(cause) => {
                self.capture(&format!("{}_failure", name));
                Err(HarnessError::in_step(name, cause))
            }
        }
    }

    pub(crate) fn record_assertion(&mut self) {
        self.assertions += 1;
    }

    /// Number of assertions verified so far
    pub fn assertions_verified(&self) -> usize {
        self.assertions
    }

    /// Every artifact taken so far
    pub fn artifacts(&self) -> &[ArtifactRecord] {
        self.diagnostics.records()
    }

    /// Close the session. Later calls do nothing.
    pub fn close(&mut self) -> PageResult<()> {
        self.session.close()
    }
}
