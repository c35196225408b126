//! Session lifetime management for the automation target.
//!
//! A `Session` owns the page automation backend for one run:
//! - Opened once, navigating to the application root
//! - Closed exactly once, by an explicit `close()` or on drop
//! - Never reusable after closing

use std::time::Duration;
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::page::{PageAutomation, PageResult};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// One live connection to the automation target
pub struct Session {
    base_url: String,
    default_timeout: Duration,
    page: Box<dyn PageAutomation>,
    state: SessionState,
}

impl Session {
    /// Take ownership of `page` and load the application root
    pub fn open(
        mut page: Box<dyn PageAutomation>,
        base_url: &str,
        default_timeout: Duration,
    ) -> HarnessResult<Self> {
        let base_url = crate::config::normalize_base_url(base_url);
        info!(base_url = %base_url, source = page.source_type(), "Opening session");

        if let Err(e) = page.navigate(&base_url) {
            // Still release the backend; the session never became usable.
            if let Err(close_err) = page.close() {
                warn!("Failed to close backend after open error: {}", close_err);
            }
            return Err(HarnessError::Page(e));
        }

        Ok(Self {
            base_url,
            default_timeout,
            page,
            state: SessionState::Open,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a page relative to the application root
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Backend for an open session
    pub fn page(&mut self) -> HarnessResult<&mut dyn PageAutomation> {
        match self.state {
            SessionState::Open => Ok(self.page.as_mut()),
            SessionState::Closed => Err(HarnessError::SessionClosed),
        }
    }

    /// Close the backend. Only the first call reaches it.
    pub fn close(&mut self) -> PageResult<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        info!("Closing session");
        self.page.close()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                warn!("Failed to close session on drop: {}", e);
            }
        }
    }
}
