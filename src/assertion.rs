//! Outcome assertions against rendered feedback text.
//!
//! The target application's contract is prose, so matching is a
//! case-insensitive substring search over the visible page text. All
//! normalization lives in this module.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HarnessError, HarnessResult};
use crate::harness::Harness;
use crate::wait::{Predicate, Resolved, WaitSpec};

/// Whether the expected feedback signals success or a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Error,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Success => write!(f, "success"),
            OutcomeKind::Error => write!(f, "error"),
        }
    }
}

/// Common case used on both sides of a comparison
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Case-insensitive substring test
pub fn matches_text(haystack: &str, needle: &str) -> bool {
    normalize(haystack).contains(&normalize(needle))
}

/// First rendered line containing `needle`, or the whole text when the match
/// spans lines
pub fn find_match(text: &str, needle: &str) -> Option<String> {
    if !matches_text(text, needle) {
        return None;
    }
    let line = text
        .lines()
        .find(|line| matches_text(line, needle))
        .unwrap_or(text);
    Some(line.trim().to_string())
}

impl Harness {
    /// Wait for `expected` to appear on the page.
    ///
    /// Captures a diagnostic either way; on timeout fails with
    /// `HarnessError::Assertion` naming the missing text.
    pub fn assert_contains(&mut self, expected: &str, kind: OutcomeKind) -> HarnessResult<String> {
        let spec = WaitSpec::new(
            Predicate::TextContains(expected.to_string()),
            self.default_timeout(),
        );

        match self.wait(&spec) {
            Ok(resolved) => {
                let observed = match resolved {
                    Resolved::Text(line) | Resolved::Title(line) => line,
                    Resolved::Element(handle) => handle.0,
                };
                info!("Verified {}: {}", kind, observed);
                self.capture(&format!("{}_message_shown_{}", kind, expected));
                self.record_assertion();
                Ok(observed)
            }
            Err(HarnessError::Timeout { .. }) => {
                self.capture(&format!("{}_message_not_found", kind));
                Err(HarnessError::Assertion {
                    expected: expected.to_string(),
                    kind,
                })
            }
            Err(other) => {
                self.capture(&format!("{}_message_not_found", kind));
                Err(other)
            }
        }
    }
}
